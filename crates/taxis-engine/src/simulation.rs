//! The tick orchestrator.
//!
//! [`Simulation`] owns the clock, the bound box, every field, the
//! coupler, and every population. One tick runs, in order:
//!
//! 1. every population's `step_all` (agents move, secrete, grow, divide;
//!    children are admitted once the population finishes),
//! 2. the coupler, recomputing derived fields from current sources,
//! 3. diffusion and decay of every non-derived field, followed by a
//!    non-finite sentinel scan,
//! 4. the clock advance.
//!
//! Observers are notified by [`run`](Simulation::run) after the tick
//! completes, so they only ever see whole-tick snapshots.

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use taxis_agent::{ActContext, Agent, Population};
use taxis_core::{BoundBox, FieldId, PopulationId, StepError, TickId};
use taxis_field::{ChemicalField, FieldCoupler, FieldStore};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, SimulationConfig};
use crate::metrics::StepMetrics;
use crate::observer::Observer;
use crate::snapshot::FieldSnapshot;

/// Lifecycle state after setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationState {
    /// Ticks are permitted.
    Running,
    /// The clock reached the configured duration.
    Finished,
    /// A tick detected a contract violation; no further ticks run.
    ///
    /// The clock counts the failed tick, so `tick_id` and `time` agree
    /// with the post-tick fields and agents still readable.
    Halted,
}

/// Result of one successful tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    /// The tick just completed.
    pub tick: TickId,
    /// Simulated time after the tick.
    pub time: f64,
    /// Phase timings and bookkeeping.
    pub metrics: StepMetrics,
}

/// Outcome of a completed [`Simulation::run`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Ticks executed by this call.
    pub ticks: u64,
    /// Simulated time at the end of the run.
    pub time: f64,
    /// Live agents at the end of the run.
    pub agents: usize,
}

/// A single simulation advancing on one timeline.
///
/// # Examples
///
/// ```
/// use taxis_core::{BoundBox, DVec3, FieldId};
/// use taxis_engine::{FieldConfig, Simulation, SimulationConfig};
///
/// let config = SimulationConfig {
///     dt: 0.1,
///     duration: 1.0,
///     bound: BoundBox::solid(DVec3::splat(100.0)).unwrap(),
///     fields: vec![FieldConfig::new("signal", [10, 10, 10]).with_diffusivity(10.0)],
///     ..SimulationConfig::default()
/// };
/// let mut sim = Simulation::new(config).unwrap();
/// let summary = sim.run(&mut []).unwrap();
/// assert_eq!(summary.ticks, 10);
/// assert!(sim.is_finished());
/// ```
pub struct Simulation {
    dt: f64,
    duration: f64,
    bound: BoundBox,
    fields: FieldStore,
    coupler: FieldCoupler,
    populations: Vec<Population>,
    rng: ChaCha8Rng,
    tick: TickId,
    time: f64,
    state: SimulationState,
}

impl Simulation {
    /// Validate `config` and set the simulation up: build fields and
    /// couplings, place every population (each checked against all
    /// populations placed before it), then run the coupler once so derived
    /// fields agree with the initial concentrations.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`]; nothing is ticked.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        let prepared = config.prepare_fields()?;
        let mut fields = prepared.store;
        let mut coupler = prepared.coupler;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        let mut populations: Vec<Population> = Vec::with_capacity(config.species.len());
        for (i, sc) in config.species.into_iter().enumerate() {
            let mut pop = Population::new(PopulationId(i as u32), sc.profile);
            let others: Vec<&[Agent]> = populations.iter().map(|p| p.agents()).collect();
            pop.populate(
                sc.initial_count,
                &config.bound,
                &others,
                &mut rng,
                config.max_placement_attempts,
            )?;
            populations.push(pop);
        }

        coupler.apply(&mut fields);

        let state = if config.duration <= 0.0 {
            SimulationState::Finished
        } else {
            SimulationState::Running
        };
        let sim = Self {
            dt: config.dt,
            duration: config.duration,
            bound: config.bound,
            fields,
            coupler,
            populations,
            rng,
            tick: TickId::default(),
            time: 0.0,
            state,
        };
        info!(
            dt = sim.dt,
            duration = sim.duration,
            fields = sim.fields.len(),
            derived = sim.coupler.len(),
            populations = sim.populations.len(),
            agents = sim.agent_count(),
            seed = config.seed,
            "simulation set up"
        );
        Ok(sim)
    }

    /// Advance one fixed step.
    ///
    /// # Errors
    ///
    /// [`StepError::Finished`] once the clock has reached the duration (or
    /// after a halt), and [`StepError::NonFiniteConcentration`] if a field
    /// diverged during this tick, which also halts the simulation.
    pub fn tick(&mut self) -> Result<TickReport, StepError> {
        if self.state != SimulationState::Running {
            return Err(StepError::Finished);
        }
        let tick_start = Instant::now();
        let dt = self.dt;
        let mut metrics = StepMetrics::default();

        // 1. Agents act.
        let act_start = Instant::now();
        {
            let mut ctx = ActContext::new(&mut self.fields, &self.bound, &mut self.rng, dt);
            for pop in &mut self.populations {
                let step = pop.step_all(&mut ctx);
                metrics.children_admitted += step.admitted;
            }
            metrics.deposits_dropped = ctx.deposits_dropped();
        }
        metrics.act_us = act_start.elapsed().as_micros() as u64;

        // 2. Recompute derived fields from pre-update sources.
        let couple_start = Instant::now();
        metrics.cells_coupled = self.coupler.apply(&mut self.fields);
        metrics.couple_us = couple_start.elapsed().as_micros() as u64;

        // 3. Diffuse and decay source fields.
        let diffuse_start = Instant::now();
        for (id, field) in self.fields.iter_mut() {
            if !self.coupler.is_derived(id) {
                field.update(dt);
            }
        }
        metrics.diffuse_us = diffuse_start.elapsed().as_micros() as u64;

        // 4. Advance the clock, ahead of the non-finite check so a halt
        // reports the tick that produced the state left behind.
        self.tick = self.tick.next();
        self.time = self.tick.0 as f64 * dt;

        if let Some((field, name, cell)) = self
            .fields
            .iter()
            .find_map(|(id, f)| f.first_non_finite().map(|cell| (id, f.name(), cell)))
        {
            let err = StepError::NonFiniteConcentration {
                field,
                name: name.to_string(),
                cell,
            };
            warn!(tick = %self.tick, error = %err, "simulation halted");
            self.state = SimulationState::Halted;
            return Err(err);
        }

        if self.time + dt * 1e-9 >= self.duration {
            self.state = SimulationState::Finished;
        }

        metrics.agents = self.agent_count();
        metrics.total_us = tick_start.elapsed().as_micros() as u64;
        debug!(
            tick = %self.tick,
            time = self.time,
            agents = metrics.agents,
            children = metrics.children_admitted,
            dropped = metrics.deposits_dropped,
            act_us = metrics.act_us,
            couple_us = metrics.couple_us,
            diffuse_us = metrics.diffuse_us,
            "tick complete"
        );

        Ok(TickReport {
            tick: self.tick,
            time: self.time,
            metrics,
        })
    }

    /// Tick until the clock reaches the duration, notifying `observers`
    /// before the first tick, after every tick, and after the last.
    ///
    /// # Errors
    ///
    /// The first [`StepError`] from a tick, or [`StepError::Observer`] if
    /// an observer fails; either stops the run.
    pub fn run(&mut self, observers: &mut [&mut dyn Observer]) -> Result<RunSummary, StepError> {
        for obs in observers.iter_mut() {
            obs.before_run(self).map_err(|reason| observer_failed(&**obs, reason))?;
        }
        let mut ticks = 0;
        while self.state == SimulationState::Running {
            let report = self.tick()?;
            ticks += 1;
            for obs in observers.iter_mut() {
                obs.after_tick(self, &report)
                    .map_err(|reason| observer_failed(&**obs, reason))?;
            }
        }
        for obs in observers.iter_mut() {
            obs.after_run(self).map_err(|reason| observer_failed(&**obs, reason))?;
        }
        info!(ticks, time = self.time, agents = self.agent_count(), "run complete");
        Ok(RunSummary {
            ticks,
            time: self.time,
            agents: self.agent_count(),
        })
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// Simulated time elapsed.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Ticks completed so far.
    pub fn tick_id(&self) -> TickId {
        self.tick
    }

    /// Fixed step size.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Configured total duration.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Simulation volume.
    pub fn bound(&self) -> &BoundBox {
        &self.bound
    }

    /// Lifecycle state.
    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Whether no further ticks are permitted.
    pub fn is_finished(&self) -> bool {
        self.state != SimulationState::Running
    }

    /// Every field.
    pub fn fields(&self) -> &FieldStore {
        &self.fields
    }

    /// Mutable access to every field, for injecting sources between
    /// ticks. Derived fields are overwritten by the next coupling pass.
    pub fn fields_mut(&mut self) -> &mut FieldStore {
        &mut self.fields
    }

    /// One field by id.
    pub fn field(&self, id: FieldId) -> Option<&ChemicalField> {
        self.fields.get(id)
    }

    /// One field by name.
    pub fn field_by_name(&self, name: &str) -> Option<&ChemicalField> {
        self.fields.by_name(name)
    }

    /// Owned copy of one field for a rendering collaborator.
    pub fn snapshot(&self, id: FieldId) -> Option<FieldSnapshot> {
        self.fields.get(id).map(FieldSnapshot::from_field)
    }

    /// Derived-field rules.
    pub fn coupler(&self) -> &FieldCoupler {
        &self.coupler
    }

    /// Every population, in configuration order.
    pub fn populations(&self) -> &[Population] {
        &self.populations
    }

    /// One population by id.
    pub fn population(&self, id: PopulationId) -> Option<&Population> {
        self.populations.get(id.index())
    }

    /// Live agents across all populations.
    pub fn agent_count(&self) -> usize {
        self.populations.iter().map(Population::len).sum()
    }

    /// Simulated time with `precision` decimals.
    pub fn formatted_time(&self, precision: usize) -> String {
        format!("{:.*}", precision, self.time)
    }
}

fn observer_failed(obs: &dyn Observer, reason: String) -> StepError {
    let err = StepError::Observer {
        name: obs.name().to_string(),
        reason,
    };
    warn!(error = %err, "observer failed");
    err
}
