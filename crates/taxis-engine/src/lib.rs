//! Simulation orchestration for Taxis.
//!
//! [`Simulation`] owns every field and population and advances them in a
//! fixed phase order each tick: agents act, derived fields are recoupled,
//! source fields diffuse and decay, the clock advances, and observers see
//! the resulting snapshot. [`SimulationConfig`] describes a run and is
//! validated in full before any state is built.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod metrics;
pub mod observer;
pub mod simulation;
pub mod snapshot;
pub mod tracker;

pub use config::{ConfigError, FieldConfig, SimulationConfig, SpeciesConfig};
pub use metrics::StepMetrics;
pub use observer::{Cadence, Observer};
pub use simulation::{RunSummary, Simulation, SimulationState, TickReport};
pub use snapshot::FieldSnapshot;
pub use tracker::{CsvTracker, TrackerColumn};
