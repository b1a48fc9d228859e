//! Read-only collaborators notified as a run progresses.

use crate::simulation::{Simulation, TickReport};

/// A collaborator that inspects the simulation between ticks.
///
/// Observers receive a shared reference, so they can read every field
/// and population but never mutate them. Returning `Err` stops the run
/// with [`StepError::Observer`](taxis_core::StepError::Observer).
pub trait Observer {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Called once before the first tick of [`Simulation::run`].
    fn before_run(&mut self, _sim: &Simulation) -> Result<(), String> {
        Ok(())
    }

    /// Called after every completed tick.
    fn after_tick(&mut self, sim: &Simulation, report: &TickReport) -> Result<(), String>;

    /// Called once after the final tick.
    fn after_run(&mut self, _sim: &Simulation) -> Result<(), String> {
        Ok(())
    }
}

/// Fires at most once per `interval` of simulated time.
///
/// The first query always fires. Afterwards a query fires when at least
/// `interval` has elapsed since the last firing; a small relative
/// tolerance absorbs the rounding of `tick * dt`.
///
/// ```
/// use taxis_engine::Cadence;
///
/// let mut c = Cadence::new(0.3);
/// let fired: Vec<bool> = (0..8).map(|t| c.due(t as f64 * 0.1)).collect();
/// assert_eq!(fired, [true, false, false, true, false, false, true, false]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Cadence {
    interval: f64,
    last: Option<f64>,
}

impl Cadence {
    /// Fire every `interval` units of simulated time. A non-positive or
    /// NaN interval fires on every query.
    pub fn new(interval: f64) -> Self {
        Self {
            interval: if interval > 0.0 { interval } else { 0.0 },
            last: None,
        }
    }

    /// Configured interval.
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Whether `time` is due, recording it as the last firing if so.
    pub fn due(&mut self, time: f64) -> bool {
        let fire = match self.last {
            None => true,
            Some(last) => time - last >= self.interval * (1.0 - 1e-9),
        };
        if fire {
            self.last = Some(time);
        }
        fire
    }

    /// Forget the last firing.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
