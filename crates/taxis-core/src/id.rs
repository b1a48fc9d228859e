//! Strongly-typed identifiers.

use std::fmt;

/// Identifies a chemical field within a simulation.
///
/// Fields are registered at setup and assigned sequential IDs.
/// `FieldId(n)` corresponds to the n-th field in the simulation
/// configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u32);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FieldId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl FieldId {
    /// Index into the owning field store.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifies a population (one species' agents) within a simulation.
///
/// `PopulationId(n)` corresponds to the n-th species entry in the
/// simulation configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PopulationId(pub u32);

impl fmt::Display for PopulationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PopulationId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl PopulationId {
    /// Index into the owning population list.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Monotonically increasing tick counter.
///
/// Incremented each time the simulation advances one fixed step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl TickId {
    /// The tick following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_as_bare_numbers() {
        assert_eq!(FieldId(3).to_string(), "3");
        assert_eq!(PopulationId(1).to_string(), "1");
        assert_eq!(TickId(42).to_string(), "42");
    }

    #[test]
    fn tick_next_increments() {
        assert_eq!(TickId(0).next(), TickId(1));
        assert!(TickId(1) > TickId(0));
    }
}
