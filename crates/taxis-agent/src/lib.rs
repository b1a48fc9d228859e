//! Agents and populations for Taxis simulations.
//!
//! One [`Agent`] type serves every species: per-species behaviour
//! (secretions, goal field, motility strategy, growth and replication
//! thresholds) lives in a [`SpeciesProfile`] owned by the agent's
//! [`Population`]. Agents act through an [`ActContext`] that lends them
//! the field store, the bound box, and the simulation's random stream.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod agent;
pub mod context;
pub mod motility;
pub mod population;
pub mod species;

pub use agent::Agent;
pub use context::ActContext;
pub use motility::{MotilityState, Taxis};
pub use population::{split_population, PlacementError, Population, PopulationStep};
pub use species::{Secretion, SecretionMode, Species, SpeciesProfile};
