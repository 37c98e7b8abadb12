//! Engine error types.

use std::error::Error;
use std::fmt;

use ember_sched::SchedError;
use ember_stream::StreamError;

use crate::config::ConfigError;

/// Errors surfaced by engine startup and the frame loop.
#[derive(Debug)]
pub enum EngineError {
    /// The configuration failed validation.
    Config(ConfigError),
    /// Graph compilation or worker startup failed.
    Sched(SchedError),
    /// A stream operation failed while the frame loop was scanning.
    Stream(StreamError),
    /// A task in the frame graph failed or panicked.
    FrameFailed,
    /// The loader pool is not running (disabled or shut down).
    LoaderUnavailable,
    /// The installed scene loader rejected a scene.
    Scene(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::Sched(err) => write!(f, "scheduler failure: {err}"),
            Self::Stream(err) => write!(f, "stream failure: {err}"),
            Self::FrameFailed => write!(f, "a frame task failed; see the task log"),
            Self::LoaderUnavailable => write!(f, "resource loader pool is not running"),
            Self::Scene(err) => write!(f, "scene load failed: {err}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Sched(err) => Some(err),
            Self::Stream(err) => Some(err),
            Self::Scene(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<SchedError> for EngineError {
    fn from(err: SchedError) -> Self {
        Self::Sched(err)
    }
}

impl From<StreamError> for EngineError {
    fn from(err: StreamError) -> Self {
        Self::Stream(err)
    }
}
