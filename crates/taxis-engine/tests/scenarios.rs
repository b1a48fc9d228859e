//! End-to-end scenarios driven through `Simulation`.

use taxis_agent::{Secretion, Species, SpeciesProfile, Taxis};
use taxis_core::{BoundBox, DVec3, FieldId, PopulationId, StepError, TickId};
use taxis_engine::{
    FieldConfig, Observer, Simulation, SimulationConfig, SimulationState, SpeciesConfig,
    TickReport,
};
use taxis_field::Combination;
use taxis_test_utils::fixtures::{still_profile, swimmer_profile};
use taxis_test_utils::{assert_cells_close, solid_cube};

// ── Helpers ─────────────────────────────────────────────────────────

/// Two species, each chasing the other's secretion through a copied goal
/// field: fields 0/1 are the A/B secretions, 2/3 the A/B goals.
fn cross_feeding(amount: f64, initial: f64, seed: u64) -> SimulationConfig {
    let signal = |name: &str| {
        FieldConfig::new(name, [10, 10, 10])
            .with_diffusivity(10.0)
            .with_initial_concentration(initial)
    };
    SimulationConfig {
        dt: 0.1,
        duration: 5.0,
        bound: solid_cube(100.0),
        seed,
        fields: vec![
            signal("a_signal"),
            signal("b_signal"),
            FieldConfig::new("a_goal", [10, 10, 10]),
            FieldConfig::new("b_goal", [10, 10, 10]),
        ],
        couplings: vec![
            (FieldId(2), Combination::Copy(FieldId(1))),
            (FieldId(3), Combination::Copy(FieldId(0))),
        ],
        species: vec![
            SpeciesConfig::new(swimmer_profile(Species::A, FieldId(2), FieldId(0), amount), 20),
            SpeciesConfig::new(swimmer_profile(Species::B, FieldId(3), FieldId(1), amount), 20),
        ],
        ..SimulationConfig::default()
    }
}

fn positions(sim: &Simulation) -> Vec<DVec3> {
    sim.populations()
        .iter()
        .flat_map(|p| p.agents().iter().map(|a| a.position()))
        .collect()
}

// ── Field scenarios ─────────────────────────────────────────────────

#[test]
fn centre_spike_decays_and_spreads() {
    let mut sim = Simulation::new(SimulationConfig {
        dt: 0.1,
        duration: 5.0,
        bound: solid_cube(100.0),
        fields: vec![FieldConfig::new("spike", [10, 10, 10])
            .with_diffusivity(10.0)
            .with_decay_rate(9.0)],
        ..SimulationConfig::default()
    })
    .unwrap();

    assert!(sim
        .fields_mut()
        .add_quantity(FieldId(0), DVec3::splat(55.0), 1.0e4));
    let field = sim.field(FieldId(0)).unwrap();
    let peak = field.conc(5, 5, 5).unwrap();
    assert!((peak - 10.0).abs() < 1e-12);

    let mut total = field.total_concentration();
    let mut ticks = 0;
    while !sim.is_finished() {
        sim.tick().unwrap();
        ticks += 1;
        let now = sim.field(FieldId(0)).unwrap().total_concentration();
        assert!(now < total, "tick {ticks}: total rose from {total} to {now}");
        total = now;
    }
    assert_eq!(ticks, 50);
    let centre = sim.field(FieldId(0)).unwrap().conc(5, 5, 5).unwrap();
    assert!(centre < 0.05 * peak, "centre {centre} vs peak {peak}");
}

#[test]
fn copied_goal_tracks_decaying_source_without_production() {
    let mut cfg = cross_feeding(0.0, 2.0, 1);
    cfg.fields[0].decay_rate = 0.5;
    cfg.fields[1].decay_rate = 0.5;
    let mut sim = Simulation::new(cfg).unwrap();
    assert!(sim
        .fields_mut()
        .add_quantity(FieldId(0), DVec3::new(25.0, 55.0, 55.0), 5.0e4));
    assert!(sim
        .fields_mut()
        .add_quantity(FieldId(1), DVec3::new(75.0, 45.0, 35.0), 5.0e4));

    let initial_a = sim.snapshot(FieldId(0)).unwrap();
    for _ in 0..20 {
        let a = sim.snapshot(FieldId(0)).unwrap();
        let b = sim.snapshot(FieldId(1)).unwrap();
        sim.tick().unwrap();
        let fields = sim.fields();
        assert_cells_close(fields.get(FieldId(3)).unwrap().concentrations(), a.values(), 1e-12);
        assert_cells_close(fields.get(FieldId(2)).unwrap().concentrations(), b.values(), 1e-12);
    }

    // The sources moved, so the goals followed something non-trivial.
    let now = sim.field(FieldId(0)).unwrap();
    assert!(now.total_concentration() < 0.5 * initial_a.values().iter().sum::<f64>());
    assert!(sim.field(FieldId(3)).unwrap().concentrations() != initial_a.values());
}

#[test]
fn goal_holds_pre_update_source_values() {
    let mut sim = Simulation::new(cross_feeding(0.0, 0.0, 2)).unwrap();
    sim.fields_mut()
        .add_quantity(FieldId(0), DVec3::new(35.0, 45.0, 55.0), 500.0);
    for _ in 0..5 {
        let before = sim.snapshot(FieldId(0)).unwrap();
        sim.tick().unwrap();
        let goal = sim.field_by_name("b_goal").unwrap();
        assert_eq!(goal.concentrations(), before.values());
        assert_ne!(sim.field(FieldId(0)).unwrap().concentrations(), before.values());
    }
}

#[test]
fn secretions_reach_the_partner_goal() {
    let mut sim = Simulation::new(cross_feeding(50.0, 0.0, 3)).unwrap();
    sim.tick().unwrap();
    let a_goal = sim.field_by_name("a_goal").unwrap();
    let b_goal = sim.field_by_name("b_goal").unwrap();
    // 20 deposits of 50 into 1000-volume cells.
    assert!((a_goal.total_concentration() - 1.0).abs() < 1e-9);
    assert!((b_goal.total_concentration() - 1.0).abs() < 1e-9);
}

// ── Agent scenarios ─────────────────────────────────────────────────

#[test]
fn same_seed_reproduces_the_run() {
    let mut a = Simulation::new(cross_feeding(10.0, 0.0, 42)).unwrap();
    let mut b = Simulation::new(cross_feeding(10.0, 0.0, 42)).unwrap();
    let mut c = Simulation::new(cross_feeding(10.0, 0.0, 43)).unwrap();
    a.run(&mut []).unwrap();
    b.run(&mut []).unwrap();
    c.run(&mut []).unwrap();
    assert_eq!(positions(&a), positions(&b));
    assert_ne!(positions(&a), positions(&c));
    for id in 0..4 {
        assert_eq!(
            a.field(FieldId(id)).unwrap().concentrations(),
            b.field(FieldId(id)).unwrap().concentrations()
        );
    }
}

#[test]
fn swimmers_stay_inside_solid_box() {
    let mut cfg = cross_feeding(10.0, 0.0, 7);
    cfg.bound = BoundBox::solid(DVec3::new(40.0, 10.0, 10.0)).unwrap();
    // Cells are now 4x1x1; slow diffusion keeps the step stable.
    cfg.fields[0].diffusivity = 0.1;
    cfg.fields[1].diffusivity = 0.1;
    for sc in &mut cfg.species {
        sc.profile = sc.profile.clone().with_speed(150.0).with_radii(0.2, 0.4);
    }
    let mut sim = Simulation::new(cfg).unwrap();
    while !sim.is_finished() {
        sim.tick().unwrap();
        for p in positions(&sim) {
            assert!(sim.bound().contains(p), "{p:?} escaped");
        }
    }
}

#[test]
fn division_grows_populations_one_tick_late() {
    let profile = still_profile(Species::C).with_growth_rate(40.0);
    let mut sim = Simulation::new(SimulationConfig {
        dt: 0.1,
        duration: 3.0,
        bound: solid_cube(200.0),
        seed: 5,
        species: vec![SpeciesConfig::new(profile, 10)],
        ..SimulationConfig::default()
    })
    .unwrap();

    let mut admitted = 0;
    let mut last = sim.agent_count();
    while !sim.is_finished() {
        let report = sim.tick().unwrap();
        assert_eq!(report.metrics.agents, last + report.metrics.children_admitted);
        admitted += report.metrics.children_admitted;
        last = report.metrics.agents;
    }
    assert!(admitted > 0);
    assert_eq!(sim.agent_count(), 10 + admitted);
    let pop = sim.population(PopulationId(0)).unwrap();
    assert!(pop.pending().is_empty());
    for a in pop.agents() {
        assert!(a.radius() < pop.profile().replication_radius);
    }
}

#[test]
fn overcrowded_setup_is_rejected() {
    let profile = SpeciesProfile::new(Species::D).with_radii(3.0, 4.0);
    let result = Simulation::new(SimulationConfig {
        bound: solid_cube(10.0),
        species: vec![SpeciesConfig::new(profile, 50)],
        max_placement_attempts: 200,
        ..SimulationConfig::default()
    });
    match result {
        Err(taxis_engine::ConfigError::Placement(e)) => {
            assert_eq!(e.population, PopulationId(0));
            assert!(e.placed < 50);
        }
        Err(other) => panic!("expected Placement, got {other}"),
        Ok(_) => panic!("expected Placement, got a simulation"),
    }
}

#[test]
fn unstable_field_is_rejected_at_setup() {
    let mut cfg = cross_feeding(0.0, 0.0, 0);
    cfg.dt = 2.0;
    let err = Simulation::new(cfg).err().unwrap();
    assert!(err.to_string().contains("a_signal"), "{err}");
}

// ── Observers ───────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    events: Vec<String>,
    fail_at: Option<u64>,
}

impl Observer for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn before_run(&mut self, sim: &Simulation) -> Result<(), String> {
        self.events.push(format!("start {}", sim.tick_id()));
        Ok(())
    }

    fn after_tick(&mut self, sim: &Simulation, report: &TickReport) -> Result<(), String> {
        assert_eq!(sim.tick_id(), report.tick);
        if self.fail_at == Some(report.tick.0) {
            return Err("disk full".into());
        }
        self.events.push(format!("tick {} {}", report.tick, sim.formatted_time(1)));
        Ok(())
    }

    fn after_run(&mut self, _sim: &Simulation) -> Result<(), String> {
        self.events.push("end".into());
        Ok(())
    }
}

#[test]
fn observers_see_every_completed_tick() {
    let mut sim = Simulation::new(SimulationConfig {
        duration: 0.3,
        bound: solid_cube(10.0),
        ..SimulationConfig::default()
    })
    .unwrap();
    let mut first = Recorder::default();
    let mut second = Recorder::default();
    let summary = sim
        .run(&mut [&mut first as &mut dyn Observer, &mut second as &mut dyn Observer])
        .unwrap();
    assert_eq!(summary.ticks, 3);
    assert_eq!(
        first.events,
        ["start 0", "tick 1 0.1", "tick 2 0.2", "tick 3 0.3", "end"]
    );
    assert_eq!(first.events, second.events);
    assert_eq!(sim.state(), SimulationState::Finished);
    assert_eq!(sim.tick(), Err(StepError::Finished));
}

#[test]
fn failing_observer_stops_the_run() {
    let mut sim = Simulation::new(SimulationConfig {
        duration: 10.0,
        bound: solid_cube(10.0),
        species: vec![SpeciesConfig::new(
            still_profile(Species::A)
                .with_taxis(Taxis::Unbiased)
                .with_secretion(Secretion::every_tick(FieldId(0), 1.0)),
            1,
        )],
        fields: vec![FieldConfig::new("trace", [2, 2, 2])],
        ..SimulationConfig::default()
    })
    .unwrap();
    let mut rec = Recorder {
        fail_at: Some(3),
        ..Recorder::default()
    };
    match sim.run(&mut [&mut rec as &mut dyn Observer]) {
        Err(StepError::Observer { name, reason }) => {
            assert_eq!(name, "recorder");
            assert_eq!(reason, "disk full");
        }
        other => panic!("expected Observer error, got {other:?}"),
    }
    assert_eq!(sim.tick_id(), TickId(3));
    assert!(!rec.events.contains(&"end".to_string()));
    // The simulation itself is still consistent and may continue.
    assert_eq!(sim.state(), SimulationState::Running);
    sim.tick().unwrap();
}

// ── Properties ──────────────────────────────────────────────────────

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn concentrations_stay_finite_and_non_negative(
            seed in any::<u64>(),
            amount in 0.0f64..1.0e4,
            initial in 0.0f64..5.0,
        ) {
            let mut sim = Simulation::new(cross_feeding(amount, initial, seed)).unwrap();
            for _ in 0..10 {
                sim.tick().unwrap();
                for (id, field) in sim.fields().iter() {
                    for &v in field.concentrations() {
                        prop_assert!(v.is_finite() && v >= 0.0, "field {id}: {v}");
                    }
                }
            }
        }

        #[test]
        fn clock_matches_tick_count(dt in 0.01f64..0.5, ticks in 1u64..40) {
            let mut sim = Simulation::new(SimulationConfig {
                dt,
                duration: dt * ticks as f64,
                bound: solid_cube(10.0),
                ..SimulationConfig::default()
            })
            .unwrap();
            let summary = sim.run(&mut []).unwrap();
            prop_assert_eq!(summary.ticks, ticks);
            prop_assert_eq!(sim.tick_id(), TickId(ticks));
            prop_assert!((sim.time() - dt * ticks as f64).abs() < 1e-9);
        }
    }
}
