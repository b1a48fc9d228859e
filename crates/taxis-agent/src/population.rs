//! Per-species agent collections with a pending-children buffer.

use std::error::Error;
use std::fmt;

use glam::DVec3;
use rand::Rng;
use taxis_core::{BoundBox, PopulationId};
use tracing::debug;

use crate::agent::Agent;
use crate::context::ActContext;
use crate::species::{Species, SpeciesProfile};

/// Initial placement could not find a free position in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementError {
    /// The population being filled.
    pub population: PopulationId,
    /// Its species.
    pub species: Species,
    /// Agents placed before giving up.
    pub placed: usize,
    /// Agents requested.
    pub requested: usize,
    /// Consecutive rejected candidates for the next agent.
    pub attempts: usize,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "population {} (species {}): placed {} of {} agents, {} consecutive overlapping candidates",
            self.population, self.species, self.placed, self.requested, self.attempts
        )
    }
}

impl Error for PlacementError {}

/// What one [`Population::step_all`] call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PopulationStep {
    /// Agents that acted (the live count at tick start).
    pub acted: usize,
    /// Children merged into the live list afterwards.
    pub admitted: usize,
}

/// Live agents of one species plus the children they produced this tick.
///
/// An agent's index in [`agents`](Self::agents) is its stable identity:
/// agents are only ever appended.
#[derive(Clone, Debug)]
pub struct Population {
    id: PopulationId,
    profile: SpeciesProfile,
    live: Vec<Agent>,
    pending: Vec<Agent>,
}

impl Population {
    /// An empty population governed by `profile`.
    pub fn new(id: PopulationId, profile: SpeciesProfile) -> Self {
        Self {
            id,
            profile,
            live: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// This population's id.
    pub fn id(&self) -> PopulationId {
        self.id
    }

    /// The species every member belongs to.
    pub fn species(&self) -> Species {
        self.profile.species
    }

    /// The shared behaviour profile.
    pub fn profile(&self) -> &SpeciesProfile {
        &self.profile
    }

    /// Live members in admission order.
    pub fn agents(&self) -> &[Agent] {
        &self.live
    }

    /// Number of live members.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether the population has no live members.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Children waiting to be admitted.
    pub fn pending(&self) -> &[Agent] {
        &self.pending
    }

    /// Append an agent directly to the live list (setup only).
    pub fn push(&mut self, agent: Agent) {
        self.live.push(agent);
    }

    /// Place `count` agents uniformly at random inside `bound`.
    ///
    /// A candidate is rejected if it overlaps a member of this population
    /// or of any population in `others`. Placement fails once
    /// `max_attempts` consecutive candidates have been rejected for the
    /// same agent; agents placed so far are kept.
    ///
    /// # Errors
    ///
    /// [`PlacementError`] when the retry bound is exhausted.
    pub fn populate<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        bound: &BoundBox,
        others: &[&[Agent]],
        rng: &mut R,
        max_attempts: usize,
    ) -> Result<(), PlacementError> {
        let start = self.live.len();
        let extent = bound.extent();
        for placed in 0..count {
            let mut attempts = 0;
            loop {
                if attempts >= max_attempts {
                    return Err(PlacementError {
                        population: self.id,
                        species: self.profile.species,
                        placed,
                        requested: count,
                        attempts,
                    });
                }
                attempts += 1;
                let position = DVec3::new(
                    rng.random::<f64>() * extent.x,
                    rng.random::<f64>() * extent.y,
                    rng.random::<f64>() * extent.z,
                );
                let candidate = Agent::new(position, &self.profile, rng);
                let blocked = candidate.intersects(&self.live)
                    || others.iter().any(|o| candidate.intersects(*o));
                if !blocked {
                    self.live.push(candidate);
                    break;
                }
            }
        }
        debug!(
            population = %self.id,
            species = %self.profile.species,
            placed = self.live.len() - start,
            "population placed"
        );
        Ok(())
    }

    /// Run every agent that was live at call time, then admit the children
    /// they produced.
    ///
    /// Children never act in the tick that created them.
    pub fn step_all(&mut self, ctx: &mut ActContext<'_>) -> PopulationStep {
        let acted = self.live.len();
        for agent in &mut self.live[..acted] {
            agent.act(&self.profile, ctx, &mut self.pending);
        }
        let admitted = self.pending.len();
        self.live.append(&mut self.pending);
        PopulationStep { acted, admitted }
    }
}

/// Split `total` agents into `(first, second)` with `first` taking
/// `fraction` of the total (rounded down). `fraction` is clamped to
/// `[0, 1]`.
pub fn split_population(total: usize, fraction: f64) -> (usize, usize) {
    let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
    let first = ((total as f64) * fraction).floor() as usize;
    let first = first.min(total);
    (first, total - first)
}
