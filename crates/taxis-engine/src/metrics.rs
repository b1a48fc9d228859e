//! Per-tick metrics for the simulation engine.
//!
//! [`StepMetrics`] captures phase timings and population bookkeeping for
//! a single tick.

/// Timing and bookkeeping collected during a single tick.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Wall-clock time for the entire tick, in microseconds.
    pub total_us: u64,
    /// Time spent in the agent act phase, in microseconds.
    pub act_us: u64,
    /// Time spent recomputing derived fields, in microseconds.
    pub couple_us: u64,
    /// Time spent diffusing and decaying source fields, in microseconds.
    pub diffuse_us: u64,
    /// Live agents across all populations after the tick.
    pub agents: usize,
    /// Children admitted into populations this tick.
    pub children_admitted: usize,
    /// Secretions dropped because they mapped outside their field.
    pub deposits_dropped: usize,
    /// Cells written by the coupler this tick.
    pub cells_coupled: usize,
}
