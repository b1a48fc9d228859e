//! Reusable field and species fixtures.
//!
//! - [`spike_field`]: a field holding one deposit at its centre cell.
//! - [`uniform_field`]: a non-diffusing field at a constant concentration.
//! - [`still_profile`] / [`swimmer_profile`]: species profiles for agents
//!   that stay put or chemotax toward a goal.

use taxis_agent::{Secretion, Species, SpeciesProfile, Taxis};
use taxis_core::{BoundBox, DVec3, FieldId};
use taxis_field::ChemicalField;

/// Centre of cell `cell` in physical coordinates.
pub fn cell_center(field: &ChemicalField, cell: [usize; 3]) -> DVec3 {
    (DVec3::new(cell[0] as f64, cell[1] as f64, cell[2] as f64) + 0.5) * field.cell_size()
}

/// A diffusing field with `amount` deposited in its centre cell.
pub fn spike_field(
    shape: [usize; 3],
    bound: &BoundBox,
    diffusivity: f64,
    decay_rate: f64,
    amount: f64,
) -> ChemicalField {
    let mut field = ChemicalField::builder()
        .name("spike")
        .shape(shape)
        .bound(bound)
        .diffusivity(diffusivity)
        .decay_rate(decay_rate)
        .build()
        .unwrap_or_else(|e| panic!("invalid spike field: {e}"));
    let center = cell_center(&field, field.shape().center());
    assert!(field.add_quantity(center, amount), "spike outside grid");
    field
}

/// A non-diffusing, non-decaying field at `value` everywhere.
pub fn uniform_field(name: &str, shape: [usize; 3], bound: &BoundBox, value: f64) -> ChemicalField {
    ChemicalField::builder()
        .name(name)
        .shape(shape)
        .bound(bound)
        .initial_concentration(value)
        .build()
        .unwrap_or_else(|e| panic!("invalid uniform field: {e}"))
}

/// Agents that never move or grow.
pub fn still_profile(species: Species) -> SpeciesProfile {
    SpeciesProfile::new(species)
        .with_speed(0.0)
        .with_taxis(Taxis::Unbiased)
}

/// Agents that swim toward `goal` and secrete `amount` into `secretes`
/// every tick.
pub fn swimmer_profile(species: Species, goal: FieldId, secretes: FieldId, amount: f64) -> SpeciesProfile {
    SpeciesProfile::new(species)
        .with_goal(goal)
        .with_secretion(Secretion::every_tick(secretes, amount))
        .with_taxis(Taxis::GradientAscent { probe_distance: 5.0 })
}
