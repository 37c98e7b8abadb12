//! Engine configuration.

use indexmap::IndexMap;
use std::error::Error;
use std::fmt;

use ember_pool::OverflowPolicy;

/// Startup configuration for an [`Engine`](crate::Engine).
///
/// Capacities are bytes per buffer; double-buffered streams allocate two
/// buffers of the configured size. Validated once by
/// [`validate`](Self::validate) before any allocation happens.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Default byte capacity of each event stream buffer.
    pub default_stream_capacity: u32,
    /// Per-stream capacity overrides, keyed by declared stream name.
    pub stream_overrides: IndexMap<String, u32>,
    /// Byte capacity of the global message pool.
    pub message_capacity: u32,
    /// Byte capacity of each thread-local message pool.
    pub local_capacity: u32,
    /// What full pools do with new traffic.
    pub overflow_policy: OverflowPolicy,
    /// Worker threads for the task graph; `None` selects
    /// `available_parallelism - 1` with a floor of one.
    pub worker_threads: Option<usize>,
    /// Background resource-loader threads. Zero disables loading.
    pub loader_threads: usize,
    /// Depth of the loader request and completion queues.
    pub loader_queue: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_stream_capacity: 64 * 1024,
            stream_overrides: IndexMap::new(),
            message_capacity: 64 * 1024,
            local_capacity: 16 * 1024,
            overflow_policy: OverflowPolicy::Log,
            worker_threads: None,
            loader_threads: 1,
            loader_queue: 32,
        }
    }
}

impl EngineConfig {
    /// Check the configuration for values that cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_stream_capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                what: "default stream",
            });
        }
        if self.message_capacity == 0 {
            return Err(ConfigError::ZeroCapacity { what: "message pool" });
        }
        if self.local_capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                what: "thread-local message pool",
            });
        }
        if let Some((name, _)) = self
            .stream_overrides
            .iter()
            .find(|(_, &capacity)| capacity == 0)
        {
            return Err(ConfigError::ZeroOverride { name: name.clone() });
        }
        if self.worker_threads == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.loader_threads > 0 && self.loader_queue == 0 {
            return Err(ConfigError::ZeroLoaderQueue);
        }
        Ok(())
    }
}

/// A configuration value the engine cannot start with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A pool capacity is zero.
    ZeroCapacity {
        /// Which capacity.
        what: &'static str,
    },
    /// A per-stream override is zero.
    ZeroOverride {
        /// The stream's declared name.
        name: String,
    },
    /// An explicit worker count of zero.
    ZeroWorkers,
    /// Loader threads configured with no queue depth.
    ZeroLoaderQueue,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCapacity { what } => write!(f, "{what} capacity must be nonzero"),
            Self::ZeroOverride { name } => {
                write!(f, "capacity override for stream {name:?} must be nonzero")
            }
            Self::ZeroWorkers => write!(f, "worker thread count must be nonzero"),
            Self::ZeroLoaderQueue => {
                write!(f, "loader queue depth must be nonzero when loader threads exist")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_capacities_are_rejected() {
        let mut config = EngineConfig {
            default_stream_capacity: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroCapacity { .. })
        ));

        config.default_stream_capacity = 1024;
        config
            .stream_overrides
            .insert("module/combat".to_owned(), 0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroOverride {
                name: "module/combat".to_owned()
            })
        );
    }

    #[test]
    fn zero_workers_and_empty_loader_queue_are_rejected() {
        let config = EngineConfig {
            worker_threads: Some(0),
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroWorkers));

        let config = EngineConfig {
            loader_threads: 2,
            loader_queue: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroLoaderQueue));
    }
}
