//! Benchmark profiles for the Taxis simulation framework.
//!
//! Provides pre-built [`SimulationConfig`] profiles for benchmarking and
//! examples:
//!
//! - [`reference_profile`]: 400x100x100 channel, 10x10x10 fields, 100
//!   bacteria of two species
//! - [`stress_profile`]: same channel at 40x40x40 (64K cells per field)
//!   with 2000 bacteria

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use taxis_agent::{split_population, Secretion, Species, SpeciesProfile, Taxis};
use taxis_core::{BoundBox, DVec3, FieldId};
use taxis_engine::{FieldConfig, SimulationConfig, SpeciesConfig};
use taxis_field::Combination;

/// Field secreted by species A.
pub const SIGNAL_A: FieldId = FieldId(0);
/// Field secreted by species B.
pub const SIGNAL_B: FieldId = FieldId(1);
/// Species A goal: copy of [`SIGNAL_B`].
pub const GOAL_A: FieldId = FieldId(2);
/// Species B goal: [`SIGNAL_A`] minus [`SIGNAL_B`].
pub const GOAL_B: FieldId = FieldId(3);

/// Build the reference profile: a 400x100x100 solid channel with four
/// 10x10x10 fields (two diffusing secretions, two derived goals) and 100
/// bacteria split evenly between species A and B.
///
/// dt=0.01, within the diffusion bound of ~0.027 for D=890.
pub fn reference_profile(seed: u64) -> SimulationConfig {
    cross_feeding(seed, [10, 10, 10], 890.0, 100)
}

/// Build the stress profile: the reference channel at 40x40x40 cells per
/// field and 2000 bacteria.
///
/// D is lowered to 100 so dt=0.01 stays under the ~0.015 bound of the
/// finer grid.
pub fn stress_profile(seed: u64) -> SimulationConfig {
    cross_feeding(seed, [40, 40, 40], 100.0, 2000)
}

fn cross_feeding(seed: u64, grid: [usize; 3], diffusivity: f64, total: usize) -> SimulationConfig {
    let (count_a, count_b) = split_population(total, 0.5);
    let bound = BoundBox::solid(DVec3::new(400.0, 100.0, 100.0))
        .unwrap_or_else(|e| panic!("reference bound rejected: {e}"));
    let signal = |name: &str| {
        FieldConfig::new(name, grid)
            .with_diffusivity(diffusivity)
            .with_decay_rate(0.9)
    };
    let profile = |species, goal, secretes| {
        SpeciesProfile::new(species)
            .with_goal(goal)
            .with_secretion(Secretion::stochastic(secretes, 12e5, 1.0))
            .with_taxis(Taxis::RunAndTumble {
                tumble_rate: 1.0,
                bias: 0.8,
            })
            .with_growth_rate(0.5)
    };

    SimulationConfig {
        dt: 0.01,
        duration: 10.0,
        bound,
        seed,
        fields: vec![
            signal("signal_a"),
            signal("signal_b"),
            FieldConfig::new("goal_a", grid),
            FieldConfig::new("goal_b", grid),
        ],
        couplings: vec![
            (GOAL_A, Combination::Copy(SIGNAL_B)),
            (
                GOAL_B,
                Combination::Difference {
                    minuend: SIGNAL_A,
                    subtrahend: SIGNAL_B,
                },
            ),
        ],
        species: vec![
            SpeciesConfig::new(profile(Species::A, GOAL_A, SIGNAL_A), count_a),
            SpeciesConfig::new(profile(Species::B, GOAL_B, SIGNAL_B), count_b),
        ],
        ..SimulationConfig::default()
    }
}
