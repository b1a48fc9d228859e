//! Explicit diffusion/decay chemical field.
//!
//! Constructed via the builder pattern: [`ChemicalField::builder`].

use glam::DVec3;
use taxis_core::{BoundBox, Boundary, FieldError};
use tracing::trace;

use crate::grid::{face_neighbours, GridShape};

/// A uniform 3-D concentration grid spanning the simulation bound box.
///
/// Each [`update`](Self::update) computes, per cell, the flux-form
/// explicit step
/// ```text
/// out[c] = prev[c] + sum_axis(r_axis * sum_nb(prev[nb] - prev[c]))
/// ```
/// with `r_axis = D * dt / h_axis^2`, reading only the frozen previous
/// buffer, then multiplies every cell by `exp(-decay_rate * dt)`.
/// Solid faces exchange no flux and wrapping faces exchange with the
/// opposite face, so the diffusion part conserves total mass exactly.
///
/// The step is stable and keeps every cell non-negative while
/// [`stability_number`](Self::stability_number) is at most 1/2, i.e.
/// `dt <= max_dt()`. Callers are responsible for choosing such a `dt`;
/// the engine rejects configurations that violate it before the first
/// tick.
///
/// Concentrations are stored, not quantities: a deposit of `amount`
/// raises its cell by `amount / cell_volume`.
///
/// # Construction
///
/// ```
/// use taxis_core::{BoundBox, DVec3};
/// use taxis_field::ChemicalField;
///
/// let bound = BoundBox::solid(DVec3::splat(100.0)).unwrap();
/// let field = ChemicalField::builder()
///     .name("attractant")
///     .shape([10, 10, 10])
///     .bound(&bound)
///     .diffusivity(10.0)
///     .decay_rate(9.0)
///     .build()
///     .unwrap();
/// assert_eq!(field.cell_volume(), 1000.0);
/// let max_dt = field.max_dt().unwrap();
/// assert!((max_dt - 100.0 / 60.0).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct ChemicalField {
    name: String,
    shape: GridShape,
    extent: DVec3,
    boundaries: [Boundary; 3],
    cell_size: DVec3,
    diffusivity: f64,
    decay_rate: f64,
    conc: Vec<f64>,
    back: Vec<f64>,
}

/// Builder for [`ChemicalField`].
///
/// Required: `shape` and `bound`. Defaults: name `"field"`, zero
/// diffusivity, zero decay, zero initial concentration.
pub struct ChemicalFieldBuilder {
    name: String,
    shape: Option<[usize; 3]>,
    bound: Option<BoundBox>,
    diffusivity: f64,
    decay_rate: f64,
    initial_concentration: f64,
}

impl ChemicalField {
    /// Create a new builder for configuring a `ChemicalField`.
    pub fn builder() -> ChemicalFieldBuilder {
        ChemicalFieldBuilder {
            name: "field".to_string(),
            shape: None,
            bound: None,
            diffusivity: 0.0,
            decay_rate: 0.0,
            initial_concentration: 0.0,
        }
    }

    /// The field's configured name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Grid dimensions.
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Physical extent the grid covers (the simulation bound box).
    pub fn extent(&self) -> DVec3 {
        self.extent
    }

    /// Per-axis boundary behaviour the stencil follows.
    pub fn boundaries(&self) -> [Boundary; 3] {
        self.boundaries
    }

    /// Side lengths of one cell.
    pub fn cell_size(&self) -> DVec3 {
        self.cell_size
    }

    /// Volume of one cell.
    pub fn cell_volume(&self) -> f64 {
        self.cell_size.x * self.cell_size.y * self.cell_size.z
    }

    /// Diffusivity in length²/time.
    pub fn diffusivity(&self) -> f64 {
        self.diffusivity
    }

    /// Decay rate in 1/time.
    pub fn decay_rate(&self) -> f64 {
        self.decay_rate
    }

    /// Largest step for which the explicit update stays stable:
    /// `1 / (2 * D * sum(1 / h^2))`. `None` when the field does not diffuse.
    pub fn max_dt(&self) -> Option<f64> {
        if self.diffusivity > 0.0 {
            Some(1.0 / (2.0 * self.diffusivity * self.inverse_h2_sum()))
        } else {
            None
        }
    }

    /// `D * dt * sum(1 / h^2)`; the update is stable while this is <= 1/2.
    pub fn stability_number(&self, dt: f64) -> f64 {
        self.diffusivity * dt * self.inverse_h2_sum()
    }

    fn inverse_h2_sum(&self) -> f64 {
        (1.0 / (self.cell_size * self.cell_size)).element_sum()
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Grid cell containing `position`, or `None` outside the bound box.
    ///
    /// Positions exactly on the far face map to the last cell.
    pub fn cell_of(&self, position: DVec3) -> Option<[usize; 3]> {
        let dims = self.shape.dims();
        let mut cell = [0usize; 3];
        for axis in 0..3 {
            let p = position[axis];
            if !(p >= 0.0 && p <= self.extent[axis]) {
                return None;
            }
            let idx = (p / self.cell_size[axis]).floor() as usize;
            cell[axis] = idx.min(dims[axis] - 1);
        }
        Some(cell)
    }

    /// Concentration of cell `(i, j, k)`.
    ///
    /// # Errors
    ///
    /// [`FieldError::CellOutOfRange`] if any index is past its axis.
    pub fn conc(&self, i: usize, j: usize, k: usize) -> Result<f64, FieldError> {
        let idx = self.checked_index([i, j, k])?;
        Ok(self.conc[idx])
    }

    /// Concentration of the cell containing `position`, or `None` when
    /// the position lies outside the grid.
    pub fn conc_at(&self, position: DVec3) -> Option<f64> {
        self.cell_of(position)
            .map(|cell| self.conc[self.shape.flat(cell)])
    }

    /// All concentrations in x-major flat order.
    pub fn concentrations(&self) -> &[f64] {
        &self.conc
    }

    // ── Mutation ────────────────────────────────────────────────

    /// Deposit `amount` into the cell containing `position`.
    ///
    /// Returns `false` (and changes nothing) when the position lies
    /// outside the grid. A negative amount removes substance, never
    /// below zero.
    pub fn add_quantity(&mut self, position: DVec3, amount: f64) -> bool {
        match self.cell_of(position) {
            Some(cell) => {
                let idx = self.shape.flat(cell);
                let volume = self.cell_volume();
                self.conc[idx] = (self.conc[idx] + amount / volume).max(0.0);
                true
            }
            None => {
                trace!(field = %self.name, ?position, amount, "deposit outside grid dropped");
                false
            }
        }
    }

    /// Override one cell. Negative or NaN values are stored as zero.
    ///
    /// # Errors
    ///
    /// [`FieldError::CellOutOfRange`] if any index is past its axis.
    pub fn set_conc(&mut self, i: usize, j: usize, k: usize, value: f64) -> Result<(), FieldError> {
        let idx = self.checked_index([i, j, k])?;
        self.conc[idx] = value.max(0.0);
        Ok(())
    }

    /// Broadcast `value` to every cell, clamped like [`set_conc`](Self::set_conc).
    pub fn fill(&mut self, value: f64) {
        self.conc.fill(value.max(0.0));
    }

    /// Overwrite every cell from `values` (same flat order), clamping at zero.
    /// Extra or missing values leave the corresponding cells untouched.
    pub(crate) fn overwrite(&mut self, values: &[f64]) {
        for (c, &v) in self.conc.iter_mut().zip(values) {
            *c = v.max(0.0);
        }
    }

    /// Advance one step of length `dt`: diffusion, then decay.
    pub fn update(&mut self, dt: f64) {
        debug_assert!(
            self.stability_number(dt) <= 0.5 + 1e-12,
            "dt {dt} exceeds the stable step for field '{}'",
            self.name
        );
        if self.diffusivity > 0.0 {
            let rates = self.diffusivity * dt / (self.cell_size * self.cell_size);
            let prev = &self.conc;
            for (idx, out) in self.back.iter_mut().enumerate() {
                let cell = self.shape.unflat(idx);
                let here = prev[idx];
                let mut flux = 0.0;
                for (nb, axis) in face_neighbours(&self.shape, cell, self.boundaries) {
                    flux += rates[axis] * (prev[nb] - here);
                }
                *out = here + flux;
            }
            std::mem::swap(&mut self.conc, &mut self.back);
        }

        if self.decay_rate > 0.0 {
            let factor = (-(self.decay_rate * dt)).exp();
            for v in &mut self.conc {
                *v *= factor;
            }
        }
    }

    // ── Diagnostics ─────────────────────────────────────────────

    /// Sum of all cell concentrations.
    pub fn total_concentration(&self) -> f64 {
        self.conc.iter().sum()
    }

    /// Total amount of substance: concentration sum times cell volume.
    pub fn total_quantity(&self) -> f64 {
        self.total_concentration() * self.cell_volume()
    }

    /// Highest cell concentration.
    pub fn max_concentration(&self) -> f64 {
        self.conc.iter().copied().fold(0.0, f64::max)
    }

    /// Number of cells holding a strictly positive concentration.
    pub fn nonzero_cells(&self) -> usize {
        self.conc.iter().filter(|&&v| v > 0.0).count()
    }

    /// Flat index of the first NaN or infinite cell.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.conc.iter().position(|v| !v.is_finite())
    }

    fn checked_index(&self, cell: [usize; 3]) -> Result<usize, FieldError> {
        if self.shape.contains(cell) {
            Ok(self.shape.flat(cell))
        } else {
            Err(FieldError::CellOutOfRange {
                cell,
                shape: self.shape.dims(),
            })
        }
    }
}

impl ChemicalFieldBuilder {
    /// Set the name used in diagnostics and lookups.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the box counts per axis.
    pub fn shape(mut self, dims: [usize; 3]) -> Self {
        self.shape = Some(dims);
        self
    }

    /// Map the grid onto this bound box and follow its boundaries.
    pub fn bound(mut self, bound: &BoundBox) -> Self {
        self.bound = Some(*bound);
        self
    }

    /// Set the diffusivity (default 0.0). Must be finite and >= 0.
    pub fn diffusivity(mut self, d: f64) -> Self {
        self.diffusivity = d;
        self
    }

    /// Set the decay rate (default 0.0). Must be finite and >= 0.
    pub fn decay_rate(mut self, k: f64) -> Self {
        self.decay_rate = k;
        self
    }

    /// Set the concentration every cell starts at (default 0.0).
    pub fn initial_concentration(mut self, c: f64) -> Self {
        self.initial_concentration = c;
        self
    }

    /// Build the field, validating all configuration.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - `shape` or `bound` is not set
    /// - any grid axis has zero boxes
    /// - `diffusivity`, `decay_rate`, or `initial_concentration` is
    ///   negative or non-finite
    pub fn build(self) -> Result<ChemicalField, String> {
        let dims = self.shape.ok_or_else(|| "shape is required".to_string())?;
        let bound = self.bound.ok_or_else(|| "bound is required".to_string())?;
        let shape = GridShape::new(dims)?;

        for (label, value) in [
            ("diffusivity", self.diffusivity),
            ("decay_rate", self.decay_rate),
            ("initial_concentration", self.initial_concentration),
        ] {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(format!("{label} must be finite and >= 0, got {value}"));
            }
        }

        let extent = bound.extent();
        let cell_size = extent / DVec3::new(dims[0] as f64, dims[1] as f64, dims[2] as f64);
        let cells = shape.cell_count();

        Ok(ChemicalField {
            name: self.name,
            shape,
            extent,
            boundaries: bound.boundaries(),
            cell_size,
            diffusivity: self.diffusivity,
            decay_rate: self.decay_rate,
            conc: vec![self.initial_concentration; cells],
            back: vec![0.0; cells],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(n: usize, len: f64, boundary: Boundary) -> ChemicalFieldBuilder {
        let bound = BoundBox::new(DVec3::splat(len), [boundary; 3]).unwrap();
        ChemicalField::builder().shape([n, n, n]).bound(&bound)
    }

    // ---------------------------------------------------------------
    // Builder tests
    // ---------------------------------------------------------------

    #[test]
    fn builder_requires_shape_and_bound() {
        let bound = BoundBox::default();
        assert!(ChemicalField::builder().bound(&bound).build().is_err());
        assert!(ChemicalField::builder().shape([2, 2, 2]).build().is_err());
    }

    #[test]
    fn builder_rejects_bad_constants() {
        assert!(cube(4, 1.0, Boundary::Solid).diffusivity(-1.0).build().is_err());
        assert!(cube(4, 1.0, Boundary::Solid).decay_rate(f64::NAN).build().is_err());
        assert!(cube(4, 1.0, Boundary::Solid)
            .initial_concentration(f64::INFINITY)
            .build()
            .is_err());
        assert!(cube(0, 1.0, Boundary::Solid).build().is_err());
    }

    #[test]
    fn initial_concentration_fills_grid() {
        let f = cube(3, 3.0, Boundary::Solid)
            .initial_concentration(2.5)
            .build()
            .unwrap();
        assert!(f.concentrations().iter().all(|&v| v == 2.5));
        assert_eq!(f.total_concentration(), 2.5 * 27.0);
    }

    // ---------------------------------------------------------------
    // Query / mutation tests
    // ---------------------------------------------------------------

    #[test]
    fn cell_of_maps_edges() {
        let f = cube(10, 100.0, Boundary::Solid).build().unwrap();
        assert_eq!(f.cell_of(DVec3::ZERO), Some([0, 0, 0]));
        assert_eq!(f.cell_of(DVec3::new(15.0, 99.9, 100.0)), Some([1, 9, 9]));
        assert_eq!(f.cell_of(DVec3::new(-0.1, 5.0, 5.0)), None);
        assert_eq!(f.cell_of(DVec3::new(5.0, 100.1, 5.0)), None);
        assert_eq!(f.cell_of(DVec3::new(f64::NAN, 5.0, 5.0)), None);
    }

    #[test]
    fn deposit_raises_concentration_by_amount_over_volume() {
        let mut f = cube(10, 100.0, Boundary::Solid).build().unwrap();
        assert!(f.add_quantity(DVec3::splat(55.0), 1.0e4));
        assert_eq!(f.conc(5, 5, 5).unwrap(), 10.0);
        assert_eq!(f.total_quantity(), 1.0e4);
    }

    #[test]
    fn deposit_outside_grid_is_noop() {
        let mut f = cube(4, 4.0, Boundary::Solid).build().unwrap();
        assert!(!f.add_quantity(DVec3::new(5.0, 1.0, 1.0), 7.0));
        assert_eq!(f.total_concentration(), 0.0);
    }

    #[test]
    fn negative_deposit_floors_at_zero() {
        let mut f = cube(2, 2.0, Boundary::Solid).build().unwrap();
        f.add_quantity(DVec3::splat(0.5), 1.0);
        f.add_quantity(DVec3::splat(0.5), -5.0);
        assert_eq!(f.conc(0, 0, 0).unwrap(), 0.0);
    }

    #[test]
    fn indexed_query_out_of_range_is_error() {
        let f = cube(3, 3.0, Boundary::Solid).build().unwrap();
        let err = f.conc(3, 0, 0).unwrap_err();
        assert_eq!(
            err,
            FieldError::CellOutOfRange {
                cell: [3, 0, 0],
                shape: [3, 3, 3]
            }
        );
    }

    #[test]
    fn set_conc_clamps_negative_and_nan() {
        let mut f = cube(2, 2.0, Boundary::Solid).build().unwrap();
        f.set_conc(1, 1, 1, -3.0).unwrap();
        assert_eq!(f.conc(1, 1, 1).unwrap(), 0.0);
        f.set_conc(1, 1, 1, f64::NAN).unwrap();
        assert_eq!(f.conc(1, 1, 1).unwrap(), 0.0);
        f.set_conc(0, 1, 0, 4.0).unwrap();
        assert_eq!(f.conc(0, 1, 0).unwrap(), 4.0);
        assert!(f.set_conc(0, 2, 0, 1.0).is_err());
        f.fill(-1.0);
        assert_eq!(f.total_concentration(), 0.0);
    }

    // ---------------------------------------------------------------
    // Update tests
    // ---------------------------------------------------------------

    #[test]
    fn stability_bound_matches_cubic_formula() {
        let f = cube(10, 100.0, Boundary::Solid)
            .diffusivity(10.0)
            .build()
            .unwrap();
        let h = 10.0;
        let expected = h * h / (6.0 * 10.0);
        assert!((f.max_dt().unwrap() - expected).abs() < 1e-12);
        assert!((f.stability_number(expected) - 0.5).abs() < 1e-12);
        assert_eq!(cube(2, 1.0, Boundary::Solid).build().unwrap().max_dt(), None);
    }

    #[test]
    fn solid_diffusion_conserves_mass() {
        let mut f = cube(5, 5.0, Boundary::Solid)
            .diffusivity(0.1)
            .build()
            .unwrap();
        f.set_conc(0, 0, 0, 100.0).unwrap();
        f.set_conc(2, 3, 4, 50.0).unwrap();
        let before = f.total_concentration();
        for _ in 0..20 {
            f.update(1.0);
        }
        assert!((f.total_concentration() - before).abs() < 1e-9 * before);
        assert!(f.concentrations().iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn wrapping_diffusion_reaches_uniform_equilibrium() {
        let mut f = cube(4, 4.0, Boundary::Wrap)
            .diffusivity(0.15)
            .build()
            .unwrap();
        f.set_conc(0, 0, 0, 64.0).unwrap();
        for _ in 0..2000 {
            f.update(1.0);
        }
        for &v in f.concentrations() {
            assert!((v - 1.0).abs() < 1e-6, "cell {v} not at equilibrium");
        }
    }

    #[test]
    fn spike_spreads_to_face_neighbours_only() {
        let mut f = cube(5, 5.0, Boundary::Solid)
            .diffusivity(0.1)
            .build()
            .unwrap();
        f.set_conc(2, 2, 2, 1.0).unwrap();
        f.update(1.0);
        assert!((f.conc(2, 2, 2).unwrap() - 0.4).abs() < 1e-12);
        assert!((f.conc(1, 2, 2).unwrap() - 0.1).abs() < 1e-12);
        assert!((f.conc(2, 2, 3).unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(f.conc(1, 1, 2).unwrap(), 0.0);
        assert_eq!(f.nonzero_cells(), 7);
    }

    #[test]
    fn decay_is_exponential() {
        let mut f = cube(2, 2.0, Boundary::Solid)
            .decay_rate(0.5)
            .initial_concentration(1.0)
            .build()
            .unwrap();
        f.update(2.0);
        let expected = (-1.0f64).exp();
        assert!((f.conc(1, 0, 1).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn anisotropic_cells_use_per_axis_rates() {
        let bound = BoundBox::solid(DVec3::new(4.0, 1.0, 1.0)).unwrap();
        let mut f = ChemicalField::builder()
            .shape([2, 1, 1])
            .bound(&bound)
            .diffusivity(0.2)
            .build()
            .unwrap();
        // h_x = 2: r = 0.2 * 1 / 4.
        f.set_conc(0, 0, 0, 8.0).unwrap();
        f.update(1.0);
        assert!((f.conc(0, 0, 0).unwrap() - 7.6).abs() < 1e-12);
        assert!((f.conc(1, 0, 0).unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn non_finite_cells_are_reported() {
        let mut f = cube(2, 2.0, Boundary::Solid).build().unwrap();
        assert_eq!(f.first_non_finite(), None);
        f.add_quantity(DVec3::splat(1.5), f64::INFINITY);
        assert_eq!(f.first_non_finite(), Some(f.shape().flat([1, 1, 1])));
    }
}
