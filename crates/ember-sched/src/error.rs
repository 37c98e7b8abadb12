//! Scheduler error types.

use std::error::Error;
use std::fmt;
use std::io;

/// Errors surfaced while building graphs or starting workers.
#[derive(Debug)]
pub enum SchedError {
    /// The declared dependencies contain a cycle; no valid execution
    /// order exists.
    Cycle,
    /// A system was registered twice under the same name in one stage.
    DuplicateSystem {
        /// The offending name.
        name: String,
    },
    /// A dependency named a system that is not registered in the stage.
    UnknownSystem {
        /// The name that failed to resolve.
        name: String,
    },
    /// A worker thread could not be spawned.
    WorkerSpawn(io::Error),
}

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cycle => write!(f, "task graph contains a dependency cycle"),
            Self::DuplicateSystem { name } => {
                write!(f, "system {name:?} is already registered in this stage")
            }
            Self::UnknownSystem { name } => {
                write!(f, "no system named {name:?} in this stage")
            }
            Self::WorkerSpawn(err) => write!(f, "failed to spawn worker thread: {err}"),
        }
    }
}

impl Error for SchedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::WorkerSpawn(err) => Some(err),
            _ => None,
        }
    }
}
