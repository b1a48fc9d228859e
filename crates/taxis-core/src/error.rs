//! Error types shared across the simulation layers.
//!
//! Setup-time failures live next to the code that validates them
//! (coupler, placement, configuration). The types here are the ones that
//! can surface while the simulation is already running.

use std::error::Error;
use std::fmt;

use crate::FieldId;

/// Indexed field query contract violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// A cell index lies outside the field's grid.
    CellOutOfRange {
        /// The requested `(i, j, k)` index.
        cell: [usize; 3],
        /// Grid dimensions `(nx, ny, nz)`.
        shape: [usize; 3],
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CellOutOfRange { cell, shape } => write!(
                f,
                "cell ({}, {}, {}) outside grid {}x{}x{}",
                cell[0], cell[1], cell[2], shape[0], shape[1], shape[2]
            ),
        }
    }
}

impl Error for FieldError {}

/// Errors from `Simulation::tick()` and `Simulation::run()`.
///
/// Any of these halts the simulation: the tick that produced it is not
/// reported as a consistent snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepError {
    /// The clock already reached the configured duration.
    Finished,
    /// A field produced NaN or infinity during its update.
    NonFiniteConcentration {
        /// The offending field.
        field: FieldId,
        /// Its configured name.
        name: String,
        /// Flat index of the first non-finite cell.
        cell: usize,
    },
    /// An indexed field query was out of range mid-tick.
    Field(FieldError),
    /// An external collaborator rejected the snapshot.
    Observer {
        /// Name the observer reports for itself.
        name: String,
        /// The observer's failure description.
        reason: String,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finished => write!(f, "simulation finished, no further ticks permitted"),
            Self::NonFiniteConcentration { field, name, cell } => {
                write!(f, "non-finite concentration in field {field} '{name}' at cell {cell}")
            }
            Self::Field(e) => write!(f, "field query failed: {e}"),
            Self::Observer { name, reason } => write!(f, "observer '{name}' failed: {reason}"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Field(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FieldError> for StepError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_names_cell_and_shape() {
        let e = FieldError::CellOutOfRange {
            cell: [10, 0, 3],
            shape: [10, 10, 10],
        };
        assert_eq!(e.to_string(), "cell (10, 0, 3) outside grid 10x10x10");
    }

    #[test]
    fn step_error_chains_field_source() {
        let inner = FieldError::CellOutOfRange {
            cell: [0, 0, 9],
            shape: [1, 1, 1],
        };
        let e: StepError = inner.clone().into();
        assert_eq!(e, StepError::Field(inner));
        assert!(e.source().is_some());
        assert!(StepError::Finished.source().is_none());
    }

    #[test]
    fn non_finite_message_names_field() {
        let e = StepError::NonFiniteConcentration {
            field: FieldId(2),
            name: "attractant".into(),
            cell: 17,
        };
        let msg = e.to_string();
        assert!(msg.contains("attractant"), "{msg}");
        assert!(msg.contains("17"), "{msg}");
    }
}
