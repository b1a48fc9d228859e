//! Chemical fields for Taxis simulations.
//!
//! A [`ChemicalField`] is a uniform 3-D grid of non-negative
//! concentrations mapped onto the simulation's [`BoundBox`]. It accepts
//! point deposits, answers per-cell queries, and advances by explicit
//! diffusion plus exponential decay. Fields are owned by a
//! [`FieldStore`] and addressed by [`FieldId`]; a [`FieldCoupler`]
//! recomputes derived fields from the live concentrations of others.
//!
//! [`BoundBox`]: taxis_core::BoundBox
//! [`FieldId`]: taxis_core::FieldId

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod chemical;
pub mod coupler;
pub mod grid;
pub mod store;

pub use chemical::{ChemicalField, ChemicalFieldBuilder};
pub use coupler::{Combination, CouplingError, FieldCoupler};
pub use grid::GridShape;
pub use store::FieldStore;
