//! Execution context lent to agents during the act phase.
//!
//! [`ActContext`] gives agents explicit handles to exactly what they may
//! touch during a tick: the field store (for goal sampling and
//! secretion), the bound box, the step size, and the simulation's random
//! stream. It also tallies deposits that fell outside every grid.

use rand_chacha::ChaCha8Rng;
use taxis_core::BoundBox;
use taxis_field::FieldStore;

/// Execution context passed to [`Agent::act`](crate::Agent::act).
pub struct ActContext<'a> {
    pub(crate) fields: &'a mut FieldStore,
    pub(crate) bound: &'a BoundBox,
    pub(crate) rng: &'a mut ChaCha8Rng,
    pub(crate) dt: f64,
    deposits_dropped: usize,
}

impl<'a> ActContext<'a> {
    /// Construct a new act context.
    ///
    /// Typically called by the engine once per tick.
    pub fn new(
        fields: &'a mut FieldStore,
        bound: &'a BoundBox,
        rng: &'a mut ChaCha8Rng,
        dt: f64,
    ) -> Self {
        Self {
            fields,
            bound,
            rng,
            dt,
            deposits_dropped: 0,
        }
    }

    /// Read access to every field.
    pub fn fields(&self) -> &FieldStore {
        self.fields
    }

    /// Write access to every field.
    pub fn fields_mut(&mut self) -> &mut FieldStore {
        self.fields
    }

    /// The simulation bound box.
    pub fn bound(&self) -> &BoundBox {
        self.bound
    }

    /// The simulation's random stream.
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        self.rng
    }

    /// Step size of this tick.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Deposits dropped so far because they mapped outside their field.
    pub fn deposits_dropped(&self) -> usize {
        self.deposits_dropped
    }

    pub(crate) fn record_dropped_deposit(&mut self) {
        self.deposits_dropped += 1;
    }
}
