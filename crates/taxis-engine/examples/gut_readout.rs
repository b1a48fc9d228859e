//! Gut readout: two bacterial species in an elongated solid channel.
//!
//! Species A secretes an attractant in random pulses; both species
//! chemotax toward it through derived goal fields that copy the
//! attractant each tick. Every 0.1 s of simulated time the position,
//! local attractant concentration, and species of each bacterium is
//! written to stdout as CSV.
//!
//! Run with:
//!   cargo run --example gut_readout > tracker.csv
//!   RUST_LOG=taxis_engine=debug cargo run --example gut_readout

use std::error::Error;
use std::io::BufWriter;

use taxis_agent::{split_population, Secretion, Species, SpeciesProfile, Taxis};
use taxis_core::{BoundBox, DVec3, FieldId};
use taxis_engine::{
    CsvTracker, FieldConfig, Observer, Simulation, SimulationConfig, SpeciesConfig, TrackerColumn,
};
use taxis_field::Combination;

// ─── Field IDs ──────────────────────────────────────────────────

const ATTRACTANT: FieldId = FieldId(0);
const GOAL_A: FieldId = FieldId(1);
const GOAL_B: FieldId = FieldId(2);

// ─── Parameters ─────────────────────────────────────────────────

const TOTAL_POPULATION: usize = 100;
const SPECIES_A_FRACTION: f64 = 0.5;
const PULSE: f64 = 12e5; // molecules
const DIFFUSIVITY: f64 = 890.0; // µm²/s
const DECAY_RATE: f64 = 0.9; // 1/s

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn config() -> Result<SimulationConfig, String> {
    let (count_a, count_b) = split_population(TOTAL_POPULATION, SPECIES_A_FRACTION);
    let swimmer = |species, goal| {
        SpeciesProfile::new(species)
            .with_goal(goal)
            .with_taxis(Taxis::RunAndTumble {
                tumble_rate: 1.0,
                bias: 0.8,
            })
    };
    let grid = [10, 10, 10];
    Ok(SimulationConfig {
        dt: 0.01,
        duration: 10.0,
        bound: BoundBox::solid(DVec3::new(400.0, 100.0, 100.0))?,
        seed: 2024,
        fields: vec![
            FieldConfig::new("attractant", grid)
                .with_diffusivity(DIFFUSIVITY)
                .with_decay_rate(DECAY_RATE),
            FieldConfig::new("goal_a", grid),
            FieldConfig::new("goal_b", grid),
        ],
        couplings: vec![
            (GOAL_A, Combination::Copy(ATTRACTANT)),
            (GOAL_B, Combination::Copy(ATTRACTANT)),
        ],
        species: vec![
            SpeciesConfig::new(
                swimmer(Species::A, GOAL_A)
                    .with_secretion(Secretion::stochastic(ATTRACTANT, PULSE, 1.0)),
                count_a,
            ),
            SpeciesConfig::new(swimmer(Species::B, GOAL_B), count_b),
        ],
        ..SimulationConfig::default()
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let mut sim = Simulation::new(config()?)?;

    let stdout = std::io::stdout();
    let mut tracker = CsvTracker::new(BufWriter::new(stdout.lock()))
        .with_interval(0.1)
        .with_precision(2)
        .with_columns(vec![
            TrackerColumn::Time,
            TrackerColumn::Position,
            TrackerColumn::LocalConcentration { field: ATTRACTANT },
            TrackerColumn::Species,
        ]);

    let summary = sim.run(&mut [&mut tracker as &mut dyn Observer])?;

    let attractant = sim.field(ATTRACTANT).ok_or("attractant field missing")?;
    eprintln!(
        "{} ticks, t = {}, {} bacteria, {} rows, attractant total {:.3e}",
        summary.ticks,
        sim.formatted_time(2),
        summary.agents,
        tracker.rows(),
        attractant.total_quantity(),
    );
    Ok(())
}
