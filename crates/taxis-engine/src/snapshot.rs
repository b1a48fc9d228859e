//! Owned, read-only copies of field state for rendering collaborators.

use taxis_core::{DVec3, FieldError};
use taxis_field::{ChemicalField, GridShape};

/// A frozen copy of one field's concentrations.
///
/// Renderers pull snapshots between ticks and may keep them for as long
/// as they like; nothing in a snapshot refers back to the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSnapshot {
    name: String,
    shape: GridShape,
    cell_size: DVec3,
    values: Vec<f64>,
}

impl FieldSnapshot {
    /// Copy the current state of `field`.
    pub fn from_field(field: &ChemicalField) -> Self {
        Self {
            name: field.name().to_string(),
            shape: field.shape(),
            cell_size: field.cell_size(),
            values: field.concentrations().to_vec(),
        }
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Grid shape.
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Edge lengths of one cell.
    pub fn cell_size(&self) -> DVec3 {
        self.cell_size
    }

    /// Concentrations in x-major flat order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Concentration of one cell.
    ///
    /// # Errors
    ///
    /// [`FieldError::CellOutOfRange`] if any index is past its axis.
    pub fn conc(&self, cell: [usize; 3]) -> Result<f64, FieldError> {
        if self.shape.contains(cell) {
            Ok(self.values[self.shape.flat(cell)])
        } else {
            Err(FieldError::CellOutOfRange {
                cell,
                shape: self.shape.dims(),
            })
        }
    }

    /// Display intensity of one cell in `[0, 1]`, relative to the
    /// concentration `full_scale` that renders at full brightness.
    ///
    /// Returns `None` when `full_scale` is zero, negative or non-finite,
    /// or when `cell` is outside the grid. A degenerate scale therefore
    /// yields "nothing to draw" rather than an infinite intensity.
    ///
    /// ```
    /// use taxis_core::{BoundBox, DVec3};
    /// use taxis_engine::FieldSnapshot;
    /// use taxis_field::ChemicalField;
    ///
    /// let bound = BoundBox::solid(DVec3::splat(10.0)).unwrap();
    /// let field = ChemicalField::builder()
    ///     .shape([2, 2, 2])
    ///     .bound(&bound)
    ///     .initial_concentration(5.0)
    ///     .build()
    ///     .unwrap();
    /// let snap = FieldSnapshot::from_field(&field);
    /// assert_eq!(snap.display_intensity([0, 0, 0], 10.0), Some(0.5));
    /// assert_eq!(snap.display_intensity([0, 0, 0], 0.0), None);
    /// ```
    pub fn display_intensity(&self, cell: [usize; 3], full_scale: f64) -> Option<f32> {
        if !full_scale.is_finite() || full_scale <= 0.0 {
            return None;
        }
        let value = self.conc(cell).ok()?;
        Some((value / full_scale).clamp(0.0, 1.0) as f32)
    }
}
