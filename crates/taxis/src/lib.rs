//! Taxis: field-coupled population dynamics for chemotactic bacteria.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Taxis sub-crates. For most users, adding `taxis` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use taxis::prelude::*;
//!
//! // One species secreting into a diffusing field it also follows.
//! let profile = SpeciesProfile::new(Species::A)
//!     .with_goal(FieldId(0))
//!     .with_secretion(Secretion::every_tick(FieldId(0), 100.0));
//! let config = SimulationConfig {
//!     dt: 0.1,
//!     duration: 1.0,
//!     bound: BoundBox::solid(DVec3::splat(100.0)).unwrap(),
//!     fields: vec![FieldConfig::new("signal", [10, 10, 10])
//!         .with_diffusivity(10.0)
//!         .with_decay_rate(0.5)],
//!     species: vec![SpeciesConfig::new(profile, 25)],
//!     ..SimulationConfig::default()
//! };
//! let mut sim = Simulation::new(config).unwrap();
//! let report = sim.tick().unwrap();
//! assert_eq!(report.tick, TickId(1));
//! assert_eq!(sim.agent_count(), 25);
//! assert!(sim.field(FieldId(0)).unwrap().total_quantity() > 0.0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `taxis-core` | IDs, bound box, shared error types |
//! | [`field`] | `taxis-field` | Chemical fields, field store, coupler |
//! | [`agent`] | `taxis-agent` | Species profiles, motility, agents, populations |
//! | [`engine`] | `taxis-engine` | Configuration, tick orchestration, observers |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, IDs, and errors (`taxis-core`).
pub use taxis_core as types;

/// Chemical fields and derived-field coupling (`taxis-field`).
///
/// [`field::ChemicalField`] is the diffusing grid; [`field::FieldCoupler`]
/// recomputes derived fields from their sources each tick.
pub use taxis_field as field;

/// Species, motility, and agent populations (`taxis-agent`).
pub use taxis_agent as agent;

/// Simulation orchestration (`taxis-engine`).
///
/// [`engine::Simulation`] runs the tick loop; [`engine::CsvTracker`] is a
/// ready-made [`engine::Observer`] for tabular output.
pub use taxis_engine as engine;

/// Common imports for typical Taxis usage.
///
/// ```rust
/// use taxis::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use taxis_core::{BoundBox, Boundary, DVec3, FieldId, PopulationId, TickId};

    // Errors
    pub use taxis_core::{FieldError, StepError};
    pub use taxis_engine::ConfigError;

    // Fields
    pub use taxis_field::{ChemicalField, Combination, FieldCoupler, FieldStore};

    // Agents
    pub use taxis_agent::{
        split_population, Agent, Population, Secretion, Species, SpeciesProfile, Taxis,
    };

    // Engine
    pub use taxis_engine::{
        Cadence, CsvTracker, FieldConfig, Observer, Simulation, SimulationConfig, SpeciesConfig,
        TickReport, TrackerColumn,
    };
}
