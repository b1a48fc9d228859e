//! Species tags and their per-species behaviour profile.

use std::f64::consts::PI;
use std::fmt;

use smallvec::SmallVec;
use taxis_core::FieldId;

use crate::motility::Taxis;

/// Closed set of species tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Species {
    /// Species A.
    A,
    /// Species B.
    B,
    /// Species C.
    C,
    /// Species D.
    D,
}

impl Species {
    /// Every tag, in declaration order.
    pub const ALL: [Species; 4] = [Species::A, Species::B, Species::C, Species::D];

    /// Single-letter label used in logs and tabular output.
    pub fn label(self) -> &'static str {
        match self {
            Species::A => "A",
            Species::B => "B",
            Species::C => "C",
            Species::D => "D",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// When a secretion deposits into its field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SecretionMode {
    /// Deposit on every tick.
    EveryTick,
    /// Deposit with probability `rate * dt` per tick.
    Stochastic {
        /// Expected deposits per unit time.
        rate: f64,
    },
}

/// One field a species produces into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Secretion {
    /// Target field.
    pub field: FieldId,
    /// Quantity per deposit.
    pub amount: f64,
    /// Deposit schedule.
    pub mode: SecretionMode,
}

impl Secretion {
    /// Deposit `amount` into `field` on every tick.
    pub fn every_tick(field: FieldId, amount: f64) -> Self {
        Self {
            field,
            amount,
            mode: SecretionMode::EveryTick,
        }
    }

    /// Deposit `amount` into `field` with probability `rate * dt` per tick.
    pub fn stochastic(field: FieldId, amount: f64, rate: f64) -> Self {
        Self {
            field,
            amount,
            mode: SecretionMode::Stochastic { rate },
        }
    }
}

/// Production, motility and growth policy shared by every agent of one
/// species.
///
/// Defaults model a 1 µm bacterium swimming at 20 µm/s with run-and-tumble
/// motility, no secretions, no goal field and no growth.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeciesProfile {
    /// The species this profile describes.
    pub species: Species,
    /// Fields the species deposits into each tick.
    pub secretions: SmallVec<[Secretion; 2]>,
    /// Field the species chemotaxes toward.
    pub goal: Option<FieldId>,
    /// Motility strategy.
    pub taxis: Taxis,
    /// Swimming speed (length/time).
    pub speed: f64,
    /// Surface area added per unit time.
    pub growth_rate: f64,
    /// Radius of newly placed agents.
    pub initial_radius: f64,
    /// Radius at which an agent divides.
    pub replication_radius: f64,
}

impl SpeciesProfile {
    /// Default profile for `species`.
    pub fn new(species: Species) -> Self {
        Self {
            species,
            secretions: SmallVec::new(),
            goal: None,
            taxis: Taxis::default(),
            speed: 20.0,
            growth_rate: 0.0,
            initial_radius: 1.0,
            replication_radius: 2.0,
        }
    }

    /// Add a secretion.
    pub fn with_secretion(mut self, secretion: Secretion) -> Self {
        self.secretions.push(secretion);
        self
    }

    /// Set the goal field.
    pub fn with_goal(mut self, goal: FieldId) -> Self {
        self.goal = Some(goal);
        self
    }

    /// Set the motility strategy.
    pub fn with_taxis(mut self, taxis: Taxis) -> Self {
        self.taxis = taxis;
        self
    }

    /// Set the swimming speed.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Set the surface-area growth rate.
    pub fn with_growth_rate(mut self, growth_rate: f64) -> Self {
        self.growth_rate = growth_rate;
        self
    }

    /// Set the initial and replication radii.
    pub fn with_radii(mut self, initial: f64, replication: f64) -> Self {
        self.initial_radius = initial;
        self.replication_radius = replication;
        self
    }

    /// Surface area of a newly placed agent.
    pub fn initial_surface_area(&self) -> f64 {
        surface_area(self.initial_radius)
    }

    /// Surface area at which an agent divides.
    pub fn replication_surface_area(&self) -> f64 {
        surface_area(self.replication_radius)
    }

    /// Every field id this profile refers to.
    pub fn referenced_fields(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.secretions.iter().map(|s| s.field).chain(self.goal)
    }

    /// Check the profile for use with step `dt`.
    ///
    /// Besides finite, non-negative constants, requires
    /// `initial_radius < replication_radius` and a per-step growth below
    /// the replication surface area, so one halving always brings an
    /// agent back under the threshold.
    ///
    /// # Errors
    ///
    /// A description of the first violated constraint.
    pub fn validate(&self, dt: f64) -> Result<(), String> {
        check_positive("initial_radius", self.initial_radius)?;
        check_positive("replication_radius", self.replication_radius)?;
        if self.initial_radius >= self.replication_radius {
            return Err(format!(
                "initial_radius ({}) must be < replication_radius ({})",
                self.initial_radius, self.replication_radius
            ));
        }
        check_non_negative("speed", self.speed)?;
        check_non_negative("growth_rate", self.growth_rate)?;
        let step_growth = self.growth_rate * dt;
        if step_growth >= self.replication_surface_area() {
            return Err(format!(
                "growth per step ({step_growth}) must be < replication surface area ({})",
                self.replication_surface_area()
            ));
        }
        for s in &self.secretions {
            if !s.amount.is_finite() {
                return Err(format!(
                    "secretion into field {} must have a finite amount, got {}",
                    s.field, s.amount
                ));
            }
            if let SecretionMode::Stochastic { rate } = s.mode {
                check_non_negative("secretion rate", rate)?;
            }
        }
        self.taxis.validate()
    }
}

/// Sphere surface area for `radius`.
pub(crate) fn surface_area(radius: f64) -> f64 {
    4.0 * PI * radius * radius
}

/// Sphere radius for surface area `sa`.
pub(crate) fn radius_from_surface_area(sa: f64) -> f64 {
    (sa / (4.0 * PI)).sqrt()
}

fn check_positive(label: &str, v: f64) -> Result<(), String> {
    if v > 0.0 && v.is_finite() {
        Ok(())
    } else {
        Err(format!("{label} must be finite and > 0, got {v}"))
    }
}

pub(crate) fn check_non_negative(label: &str, v: f64) -> Result<(), String> {
    if v >= 0.0 && v.is_finite() {
        Ok(())
    } else {
        Err(format!("{label} must be finite and >= 0, got {v}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_valid() {
        for species in Species::ALL {
            SpeciesProfile::new(species).validate(0.1).unwrap();
        }
    }

    #[test]
    fn radius_and_surface_area_invert() {
        let sa = surface_area(1.5);
        assert!((radius_from_surface_area(sa) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn inverted_radii_rejected() {
        let p = SpeciesProfile::new(Species::A).with_radii(2.0, 2.0);
        let err = p.validate(0.1).unwrap_err();
        assert!(err.contains("initial_radius"), "{err}");
    }

    #[test]
    fn growth_past_threshold_in_one_step_rejected() {
        let p = SpeciesProfile::new(Species::B).with_growth_rate(1.0e3);
        assert!(p.validate(1.0).is_err());
        assert!(p.validate(1.0e-3).is_ok());
    }

    #[test]
    fn bad_secretion_rejected() {
        let p = SpeciesProfile::new(Species::C).with_secretion(Secretion::stochastic(
            FieldId(0),
            1.0,
            -1.0,
        ));
        assert!(p.validate(0.1).is_err());
        let p = SpeciesProfile::new(Species::C)
            .with_secretion(Secretion::every_tick(FieldId(0), f64::NAN));
        assert!(p.validate(0.1).is_err());
    }

    #[test]
    fn referenced_fields_include_goal() {
        let p = SpeciesProfile::new(Species::D)
            .with_secretion(Secretion::every_tick(FieldId(2), 1.0))
            .with_goal(FieldId(5));
        let ids: Vec<_> = p.referenced_fields().collect();
        assert_eq!(ids, vec![FieldId(2), FieldId(5)]);
        assert_eq!(Species::D.to_string(), "D");
    }
}
