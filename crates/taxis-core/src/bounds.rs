//! The simulation bound box and its per-axis boundary behaviour.

use glam::DVec3;

/// How an axis of the bound box treats anything that crosses its faces.
///
/// The same setting governs agent motion (reflect vs wrap) and field
/// diffusion (no-flux vs periodic) along that axis.
///
/// # Examples
///
/// ```
/// use taxis_core::{BoundBox, Boundary, DVec3};
///
/// let solid = BoundBox::solid(DVec3::splat(10.0)).unwrap();
/// let (p, h) = solid.confine(DVec3::new(12.0, 5.0, 5.0), DVec3::X);
/// assert_eq!(p.x, 8.0);
/// assert_eq!(h.x, -1.0);
///
/// let torus = BoundBox::wrapping(DVec3::splat(10.0)).unwrap();
/// let (p, h) = torus.confine(DVec3::new(12.0, 5.0, 5.0), DVec3::X);
/// assert_eq!(p.x, 2.0);
/// assert_eq!(h.x, 1.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// Faces are walls: agents reflect, fields exchange no flux.
    Solid,
    /// Faces are periodic: agents and field flux wrap to the opposite face.
    Wrap,
}

/// Axis-aligned simulation volume anchored at the origin.
///
/// Spans `[0, extent.x] x [0, extent.y] x [0, extent.z]`. Every field grid
/// maps onto exactly this volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundBox {
    extent: DVec3,
    boundaries: [Boundary; 3],
}

impl BoundBox {
    /// Create a bound box with an explicit boundary per axis.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any extent is not finite and strictly positive.
    pub fn new(extent: DVec3, boundaries: [Boundary; 3]) -> Result<Self, String> {
        for (axis, len) in extent.to_array().into_iter().enumerate() {
            if !len.is_finite() || len <= 0.0 {
                return Err(format!(
                    "extent along axis {axis} must be finite and > 0, got {len}"
                ));
            }
        }
        Ok(Self { extent, boundaries })
    }

    /// Bound box with solid walls on every axis.
    pub fn solid(extent: DVec3) -> Result<Self, String> {
        Self::new(extent, [Boundary::Solid; 3])
    }

    /// Bound box that wraps on every axis (3-torus).
    pub fn wrapping(extent: DVec3) -> Result<Self, String> {
        Self::new(extent, [Boundary::Wrap; 3])
    }

    /// Side lengths of the box.
    pub fn extent(&self) -> DVec3 {
        self.extent
    }

    /// Boundary behaviour for each of the three axes.
    pub fn boundaries(&self) -> [Boundary; 3] {
        self.boundaries
    }

    /// Boundary behaviour along one axis (0 = x, 1 = y, 2 = z).
    pub fn boundary(&self, axis: usize) -> Boundary {
        self.boundaries[axis]
    }

    /// Enclosed volume.
    pub fn volume(&self) -> f64 {
        self.extent.x * self.extent.y * self.extent.z
    }

    /// Centre of the box.
    pub fn center(&self) -> DVec3 {
        self.extent * 0.5
    }

    /// Whether `p` lies inside the closed box.
    pub fn contains(&self, p: DVec3) -> bool {
        p.cmpge(DVec3::ZERO).all() && p.cmple(self.extent).all()
    }

    /// Bring a position back inside the box after a displacement.
    ///
    /// Solid axes fold the coordinate back off the wall (any number of
    /// bounces) and flip the heading component when the final leg runs
    /// backwards. Wrapping axes take the coordinate modulo the extent and
    /// leave the heading untouched.
    pub fn confine(&self, position: DVec3, heading: DVec3) -> (DVec3, DVec3) {
        let mut p = position;
        let mut h = heading;
        for axis in 0..3 {
            let len = self.extent[axis];
            let x = p[axis];
            match self.boundaries[axis] {
                Boundary::Solid => {
                    if (0.0..=len).contains(&x) {
                        continue;
                    }
                    let period = 2.0 * len;
                    let m = x.rem_euclid(period);
                    if m > len {
                        p[axis] = (period - m).clamp(0.0, len);
                        h[axis] = -h[axis];
                    } else {
                        p[axis] = m.clamp(0.0, len);
                    }
                }
                Boundary::Wrap => {
                    let m = x.rem_euclid(len);
                    // rem_euclid of a tiny negative value can round up to len.
                    p[axis] = if m >= len { 0.0 } else { m };
                }
            }
        }
        (p, h)
    }
}

impl Default for BoundBox {
    /// A 100 x 100 x 100 box with wrapping faces.
    fn default() -> Self {
        Self {
            extent: DVec3::splat(100.0),
            boundaries: [Boundary::Wrap; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_degenerate_extent() {
        assert!(BoundBox::solid(DVec3::new(0.0, 1.0, 1.0)).is_err());
        assert!(BoundBox::solid(DVec3::new(1.0, -1.0, 1.0)).is_err());
        assert!(BoundBox::solid(DVec3::new(1.0, 1.0, f64::NAN)).is_err());
    }

    #[test]
    fn solid_reflects_off_low_wall() {
        let b = BoundBox::solid(DVec3::splat(10.0)).unwrap();
        let (p, h) = b.confine(DVec3::new(-3.0, 5.0, 5.0), DVec3::new(-1.0, 0.0, 0.0));
        assert_eq!(p, DVec3::new(3.0, 5.0, 5.0));
        assert_eq!(h, DVec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn solid_handles_double_bounce() {
        let b = BoundBox::solid(DVec3::splat(10.0)).unwrap();
        // 25 -> bounce at 10 (back to -5 equivalent) -> bounce at 0 -> 5, moving forward again.
        let (p, h) = b.confine(DVec3::new(25.0, 1.0, 1.0), DVec3::X);
        assert!((p.x - 5.0).abs() < 1e-12);
        assert_eq!(h.x, 1.0);
    }

    #[test]
    fn wrap_is_periodic_on_mixed_box() {
        let b = BoundBox::new(
            DVec3::splat(10.0),
            [Boundary::Wrap, Boundary::Solid, Boundary::Wrap],
        )
        .unwrap();
        let (p, h) = b.confine(DVec3::new(-1.0, 11.0, 23.0), DVec3::new(-1.0, 1.0, 1.0));
        assert!((p.x - 9.0).abs() < 1e-12);
        assert!((p.y - 9.0).abs() < 1e-12);
        assert!((p.z - 3.0).abs() < 1e-12);
        assert_eq!(h, DVec3::new(-1.0, -1.0, 1.0));
    }

    #[test]
    fn default_box_matches_reference_extent() {
        let b = BoundBox::default();
        assert_eq!(b.extent(), DVec3::splat(100.0));
        assert_eq!(b.boundaries(), [Boundary::Wrap; 3]);
        assert_eq!(b.volume(), 1.0e6);
    }

    proptest! {
        #[test]
        fn confine_always_lands_inside(
            x in -1.0e3f64..1.0e3,
            y in -1.0e3f64..1.0e3,
            z in -1.0e3f64..1.0e3,
            solid in any::<[bool; 3]>(),
        ) {
            let boundaries = solid.map(|s| if s { Boundary::Solid } else { Boundary::Wrap });
            let b = BoundBox::new(DVec3::new(7.0, 13.0, 100.0), boundaries).unwrap();
            let (p, h) = b.confine(DVec3::new(x, y, z), DVec3::ONE);
            prop_assert!(b.contains(p), "{p:?} escaped {:?}", b.extent());
            prop_assert!((h.abs() - DVec3::ONE).abs().max_element() < 1e-12);
        }
    }
}
