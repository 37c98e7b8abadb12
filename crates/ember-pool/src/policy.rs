//! Out-of-space policies.
//!
//! Every pool carries a policy chosen at construction. The policy decides
//! what an allocation that does not fit turns into: a hard error, a logged
//! drop, or a silent drop. Dropping is `Ok(None)` so callers distinguish
//! "pool full, traffic shed" from "engine defect".

use crate::error::PoolError;

/// What a pool does when an allocation does not fit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Fail the frame: return [`PoolError::Exhausted`].
    #[default]
    Fatal,
    /// Shed the allocation and log a warning.
    Log,
    /// Shed the allocation silently.
    Silent,
}

impl OverflowPolicy {
    /// Resolve an allocation that did not fit.
    pub(crate) fn overflow<T>(
        self,
        pool: &'static str,
        requested: usize,
        used: usize,
        capacity: usize,
    ) -> Result<Option<T>, PoolError> {
        match self {
            Self::Fatal => Err(PoolError::Exhausted {
                requested,
                used,
                capacity,
            }),
            Self::Log => {
                log::warn!("{pool} full: dropped {requested} ({used}/{capacity} in use)");
                Ok(None)
            }
            Self::Silent => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_is_an_error() {
        let got: Result<Option<()>, _> = OverflowPolicy::Fatal.overflow("test", 8, 0, 4);
        assert_eq!(
            got,
            Err(PoolError::Exhausted {
                requested: 8,
                used: 0,
                capacity: 4,
            })
        );
    }

    #[test]
    fn log_and_silent_shed() {
        let got: Result<Option<()>, _> = OverflowPolicy::Log.overflow("test", 8, 0, 4);
        assert_eq!(got, Ok(None));
        let got: Result<Option<()>, _> = OverflowPolicy::Silent.overflow("test", 8, 0, 4);
        assert_eq!(got, Ok(None));
    }
}
