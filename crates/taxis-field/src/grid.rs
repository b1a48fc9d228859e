//! Grid shape and 3-D face-neighbour helpers.
//!
//! Cells are stored x-major: `flat = (i * ny + j) * nz + k`.

use smallvec::SmallVec;
use taxis_core::Boundary;

/// Box counts per axis of a field grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridShape {
    dims: [usize; 3],
}

impl GridShape {
    /// Create a shape from `[nx, ny, nz]`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any axis has zero boxes.
    pub fn new(dims: [usize; 3]) -> Result<Self, String> {
        if dims.contains(&0) {
            return Err(format!(
                "grid dimensions must be non-zero, got {}x{}x{}",
                dims[0], dims[1], dims[2]
            ));
        }
        Ok(Self { dims })
    }

    /// `[nx, ny, nz]`.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Whether `cell` is a valid `(i, j, k)` index.
    pub fn contains(&self, cell: [usize; 3]) -> bool {
        cell.iter().zip(self.dims).all(|(&c, n)| c < n)
    }

    /// Flat storage index of an in-range cell.
    pub fn flat(&self, cell: [usize; 3]) -> usize {
        (cell[0] * self.dims[1] + cell[1]) * self.dims[2] + cell[2]
    }

    /// Inverse of [`flat`](Self::flat).
    pub fn unflat(&self, idx: usize) -> [usize; 3] {
        let k = idx % self.dims[2];
        let rest = idx / self.dims[2];
        [rest / self.dims[1], rest % self.dims[1], k]
    }

    /// Index of the centre cell (rounded down on even axes).
    pub fn center(&self) -> [usize; 3] {
        self.dims.map(|n| n / 2)
    }
}

/// Resolve a single axis index under the given boundary.
/// Returns `None` when a solid axis is stepped past.
pub(crate) fn resolve_axis(val: isize, len: usize, boundary: Boundary) -> Option<usize> {
    let n = len as isize;
    if (0..n).contains(&val) {
        return Some(val as usize);
    }
    match boundary {
        Boundary::Solid => None,
        Boundary::Wrap => Some(val.rem_euclid(n) as usize),
    }
}

/// Flat indices of the face-adjacent neighbours of `cell`, each tagged
/// with the axis it lies along.
///
/// Solid faces contribute no neighbour. A wrapping axis of length 1
/// yields the cell itself, which exchanges nothing in a flux update.
pub(crate) fn face_neighbours(
    shape: &GridShape,
    cell: [usize; 3],
    boundaries: [Boundary; 3],
) -> SmallVec<[(usize, usize); 6]> {
    let dims = shape.dims();
    let mut result = SmallVec::new();
    for axis in 0..3 {
        for delta in [-1isize, 1] {
            let moved = cell[axis] as isize + delta;
            if let Some(v) = resolve_axis(moved, dims[axis], boundaries[axis]) {
                let mut nb = cell;
                nb[axis] = v;
                result.push((shape.flat(nb), axis));
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_axis_rejected() {
        assert!(GridShape::new([4, 0, 4]).is_err());
        assert_eq!(GridShape::new([4, 3, 2]).unwrap().cell_count(), 24);
    }

    #[test]
    fn flat_unflat_agree() {
        let s = GridShape::new([3, 4, 5]).unwrap();
        for idx in 0..s.cell_count() {
            let cell = s.unflat(idx);
            assert!(s.contains(cell));
            assert_eq!(s.flat(cell), idx);
        }
        assert_eq!(s.flat([2, 3, 4]), s.cell_count() - 1);
    }

    #[test]
    fn resolve_axis_solid_and_wrap() {
        assert_eq!(resolve_axis(2, 5, Boundary::Solid), Some(2));
        assert_eq!(resolve_axis(-1, 5, Boundary::Solid), None);
        assert_eq!(resolve_axis(5, 5, Boundary::Solid), None);
        assert_eq!(resolve_axis(-1, 5, Boundary::Wrap), Some(4));
        assert_eq!(resolve_axis(5, 5, Boundary::Wrap), Some(0));
    }

    #[test]
    fn corner_has_three_solid_neighbours() {
        let s = GridShape::new([3, 3, 3]).unwrap();
        let nbs = face_neighbours(&s, [0, 0, 0], [Boundary::Solid; 3]);
        assert_eq!(nbs.len(), 3);
        assert!(nbs.contains(&(s.flat([1, 0, 0]), 0)));
        assert!(nbs.contains(&(s.flat([0, 1, 0]), 1)));
        assert!(nbs.contains(&(s.flat([0, 0, 1]), 2)));
    }

    #[test]
    fn corner_wraps_to_six_neighbours() {
        let s = GridShape::new([3, 3, 3]).unwrap();
        let nbs = face_neighbours(&s, [0, 0, 0], [Boundary::Wrap; 3]);
        assert_eq!(nbs.len(), 6);
        assert!(nbs.contains(&(s.flat([2, 0, 0]), 0)));
        assert!(nbs.contains(&(s.flat([0, 0, 2]), 2)));
    }
}
