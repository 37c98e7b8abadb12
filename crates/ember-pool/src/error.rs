//! Pool error types.

use std::error::Error;
use std::fmt;

/// Errors surfaced by pool operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// An allocation did not fit and the pool's policy is
    /// [`OverflowPolicy::Fatal`](crate::OverflowPolicy::Fatal).
    Exhausted {
        /// Bytes (or elements) the caller asked for.
        requested: usize,
        /// Bytes (or elements) already in use.
        used: usize,
        /// Total pool capacity.
        capacity: usize,
    },
    /// A slot handle referred to storage outside the pool.
    ForeignSlot {
        /// The offending slot.
        slot: u64,
        /// Number of slots the pool owns.
        capacity: u64,
    },
    /// A slot was discarded that holds no live element.
    SlotVacant {
        /// The offending slot.
        slot: u64,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted {
                requested,
                used,
                capacity,
            } => write!(
                f,
                "pool exhausted: requested {requested} with {used}/{capacity} in use"
            ),
            Self::ForeignSlot { slot, capacity } => {
                write!(f, "slot {slot} is outside the pool (capacity {capacity})")
            }
            Self::SlotVacant { slot } => write!(f, "slot {slot} holds no element"),
        }
    }
}

impl Error for PoolError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_informative() {
        let err = PoolError::Exhausted {
            requested: 64,
            used: 120,
            capacity: 128,
        };
        assert_eq!(
            err.to_string(),
            "pool exhausted: requested 64 with 120/128 in use"
        );
        assert_eq!(
            PoolError::SlotVacant { slot: 7 }.to_string(),
            "slot 7 holds no element"
        );
    }
}
