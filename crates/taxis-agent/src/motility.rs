//! Motility strategies.
//!
//! A [`Taxis`] value decides, once per tick, which unit heading an agent
//! swims along. Strategies that follow a goal field never prefer a
//! candidate direction with a lower sampled concentration.

use std::f64::consts::TAU;

use glam::DVec3;
use rand::Rng;
use taxis_core::BoundBox;
use taxis_field::ChemicalField;

use crate::species::check_non_negative;

/// Per-species motility strategy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Taxis {
    /// Pick a fresh uniformly random heading every tick.
    Unbiased,
    /// Probe the goal field `probe_distance` away along the six axis
    /// directions and head toward the highest concentration. Falls back to
    /// a random heading when no probe improves on the current cell.
    GradientAscent {
        /// Distance from the agent to each probe point.
        probe_distance: f64,
    },
    /// Keep swimming straight, tumbling to a random heading with
    /// probability `tumble_rate * dt` per tick. While the goal
    /// concentration is rising the tumble probability is scaled by
    /// `1 - bias`.
    RunAndTumble {
        /// Tumbles per unit time when not climbing.
        tumble_rate: f64,
        /// Fraction of tumbles suppressed while climbing, in `[0, 1]`.
        bias: f64,
    },
}

impl Default for Taxis {
    fn default() -> Self {
        Taxis::RunAndTumble {
            tumble_rate: 1.0,
            bias: 0.5,
        }
    }
}

impl Taxis {
    /// Check the strategy's constants.
    ///
    /// # Errors
    ///
    /// A description of the first out-of-range constant.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Taxis::Unbiased => Ok(()),
            Taxis::GradientAscent { probe_distance } => {
                if probe_distance > 0.0 && probe_distance.is_finite() {
                    Ok(())
                } else {
                    Err(format!(
                        "probe_distance must be finite and > 0, got {probe_distance}"
                    ))
                }
            }
            Taxis::RunAndTumble { tumble_rate, bias } => {
                check_non_negative("tumble_rate", tumble_rate)?;
                if (0.0..=1.0).contains(&bias) {
                    Ok(())
                } else {
                    Err(format!("bias must lie in [0, 1], got {bias}"))
                }
            }
        }
    }

    /// Choose this tick's heading and record what the strategy needs to
    /// remember in `state`.
    ///
    /// Sample points are passed through `bound` first: past a wrapping face
    /// the opposite side is read, past a solid face its reflection.
    pub fn choose_heading<R: Rng + ?Sized>(
        &self,
        state: &mut MotilityState,
        position: DVec3,
        bound: &BoundBox,
        goal: Option<&ChemicalField>,
        dt: f64,
        rng: &mut R,
    ) -> DVec3 {
        let heading = match *self {
            Taxis::Unbiased => random_unit(rng),
            Taxis::GradientAscent { probe_distance } => {
                match goal.and_then(|g| best_probe(g, bound, position, probe_distance)) {
                    Some(dir) => dir,
                    None => random_unit(rng),
                }
            }
            Taxis::RunAndTumble { tumble_rate, bias } => {
                let sampled = goal.and_then(|g| g.conc_at(position));
                let climbing = matches!(
                    (sampled, state.memory),
                    (Some(now), Some(before)) if now > before
                );
                state.memory = sampled;
                let mut p = tumble_rate * dt;
                if climbing {
                    p *= 1.0 - bias;
                }
                if rng.random_bool(p.clamp(0.0, 1.0)) {
                    random_unit(rng)
                } else {
                    state.heading
                }
            }
        };
        state.heading = heading;
        heading
    }
}

/// Mutable per-agent motility memory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotilityState {
    /// Current unit heading.
    pub heading: DVec3,
    /// Goal concentration sampled on the previous tick, if any.
    pub memory: Option<f64>,
}

impl MotilityState {
    /// Fresh state with a uniformly random heading.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            heading: random_unit(rng),
            memory: None,
        }
    }
}

/// Uniformly distributed unit vector.
pub(crate) fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> DVec3 {
    let z: f64 = rng.random_range(-1.0..=1.0);
    let phi: f64 = rng.random_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    DVec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Axis direction whose probe beats the current cell, picking the highest.
fn best_probe(
    goal: &ChemicalField,
    bound: &BoundBox,
    position: DVec3,
    distance: f64,
) -> Option<DVec3> {
    let here = goal.conc_at(position).unwrap_or(0.0);
    let mut best: Option<(DVec3, f64)> = None;
    for dir in [
        DVec3::X,
        DVec3::NEG_X,
        DVec3::Y,
        DVec3::NEG_Y,
        DVec3::Z,
        DVec3::NEG_Z,
    ] {
        let (at, _) = bound.confine(position + dir * distance, dir);
        let Some(c) = goal.conc_at(at) else {
            continue;
        };
        if c > here && best.is_none_or(|(_, b)| c > b) {
            best = Some((dir, c));
        }
    }
    best.map(|(dir, _)| dir)
}
