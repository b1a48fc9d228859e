//! Test utilities and fixtures for Taxis development.
//!
//! Provides deterministic random streams, standard bound boxes, float
//! assertions, and the field/species [`fixtures`] shared by the agent,
//! engine, and bench crates.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use taxis_core::{BoundBox, DVec3};

/// Deterministic random stream for tests.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Cube of side `len` with solid walls on every axis.
pub fn solid_cube(len: f64) -> BoundBox {
    BoundBox::new(DVec3::splat(len), [taxis_core::Boundary::Solid; 3])
        .unwrap_or_else(|e| panic!("invalid test cube {len}: {e}"))
}

/// Cube of side `len` wrapping on every axis.
pub fn wrapping_cube(len: f64) -> BoundBox {
    BoundBox::new(DVec3::splat(len), [taxis_core::Boundary::Wrap; 3])
        .unwrap_or_else(|e| panic!("invalid test cube {len}: {e}"))
}

/// Assert `|actual - expected| <= tol * max(1, |expected|)`.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    let scale = expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tol * scale,
        "expected {expected}, got {actual} (tolerance {tol})"
    );
}

/// Assert two concentration slices agree cell by cell.
#[track_caller]
pub fn assert_cells_close(actual: &[f64], expected: &[f64], tol: f64) {
    assert_eq!(actual.len(), expected.len(), "cell count mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        let scale = e.abs().max(1.0);
        assert!(
            (a - e).abs() <= tol * scale,
            "cell {i}: expected {e}, got {a} (tolerance {tol})"
        );
    }
}
