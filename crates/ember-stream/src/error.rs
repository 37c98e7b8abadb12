//! Stream error types.

use std::error::Error;
use std::fmt;

use ember_core::{EventTypeId, StreamName};
use ember_pool::PoolError;

/// Errors surfaced by stream operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The stream's buffer is full and its policy sheds traffic; the
    /// record was dropped. Non-fatal: the producer may carry on.
    Dropped {
        /// Type of the dropped payload.
        type_id: EventTypeId,
    },
    /// A stored record's type id disagrees with the consumer's.
    TypeMismatch {
        /// What the consumer asked for.
        expected: EventTypeId,
        /// What the envelope carries.
        found: EventTypeId,
    },
    /// A stored record's payload size disagrees with the consumer's type.
    SizeMismatch {
        /// The envelope's type id.
        type_id: EventTypeId,
        /// `size_of` the consumer's type.
        expected: usize,
        /// The envelope's declared payload size.
        found: usize,
    },
    /// The buffer ended mid-envelope.
    Truncated {
        /// Byte offset of the broken record.
        offset: usize,
    },
    /// A payload region was not aligned for zero-copy access.
    Misaligned {
        /// The consumer's type id.
        type_id: EventTypeId,
    },
    /// No stream is registered under this name.
    UnknownStream {
        /// The name that failed to resolve.
        name: StreamName,
    },
    /// The backing pool failed.
    Pool(PoolError),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dropped { type_id } => write!(f, "stream full: dropped {type_id}"),
            Self::TypeMismatch { expected, found } => {
                write!(f, "envelope type mismatch: expected {expected}, found {found}")
            }
            Self::SizeMismatch {
                type_id,
                expected,
                found,
            } => write!(
                f,
                "payload size mismatch for {type_id}: expected {expected} bytes, envelope declares {found}"
            ),
            Self::Truncated { offset } => {
                write!(f, "stream truncated mid-envelope at byte {offset}")
            }
            Self::Misaligned { type_id } => {
                write!(f, "payload for {type_id} is not aligned for zero-copy access")
            }
            Self::UnknownStream { name } => write!(f, "no stream registered under {name}"),
            Self::Pool(err) => write!(f, "pool failure: {err}"),
        }
    }
}

impl Error for StreamError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Pool(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PoolError> for StreamError {
    fn from(err: PoolError) -> Self {
        Self::Pool(err)
    }
}
