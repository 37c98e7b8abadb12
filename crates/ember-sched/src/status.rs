//! Scheduler execution status.

use std::fmt;

/// Gates how much of the frame graph runs.
///
/// Outside [`Running`](Self::Running), gameplay stages are skipped but the
/// stream pump still executes every frame, so command and loader traffic
/// keeps flowing and the engine can be driven back to `Running`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchedulerStatus {
    /// Full frame graph: all stages, hooks, and the pump.
    Running,
    /// Blocking resource loads are outstanding; pump only. Transitions to
    /// `Running` automatically once the loads have completed.
    #[default]
    Loading,
    /// Gameplay suspended by command; pump only.
    Stopped,
}

impl SchedulerStatus {
    /// Whether gameplay stages execute in this status.
    pub fn runs_systems(self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for SchedulerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Running => "running",
            Self::Loading => "loading",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
