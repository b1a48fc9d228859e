//! Core types for the Taxis population-dynamics framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the strongly-typed identifiers, the bound box and its per-axis
//! boundary behaviour, and the error types shared by the field, agent,
//! and engine layers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bounds;
pub mod error;
pub mod id;

pub use bounds::{BoundBox, Boundary};
pub use error::{FieldError, StepError};
pub use id::{FieldId, PopulationId, TickId};

/// Continuous 3-D coordinate used for positions and headings.
pub use glam::DVec3;
