//! Strongly-typed identifiers derived from stable string hashes.
//!
//! Event types and streams are addressed by 32-bit FNV-1a hashes of their
//! declared names. The hash is computed in a `const fn` so identifiers can
//! live in associated constants and `match` arms, and so producers compiled
//! separately (modules, scripting runtimes) agree on the same ids.

use std::fmt;

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a hash of a byte string, computable at compile time.
pub const fn fnv1a(name: &str) -> u32 {
    let bytes = name.as_bytes();
    let mut hash = FNV_OFFSET;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// Identifies an event or message payload type.
///
/// Derived from the payload's declared name via [`fnv1a`]. Stored in every
/// envelope header; consumers validate it before reinterpreting the payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventTypeId(pub u32);

impl EventTypeId {
    /// Compute the type id for a declared payload name.
    pub const fn from_name(name: &str) -> Self {
        Self(fnv1a(name))
    }
}

impl fmt::Display for EventTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<u32> for EventTypeId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a stream within a registry.
///
/// Stream names are unique within their registry; the hash is the lookup
/// key for both named and engine streams, and for per-stream buffer size
/// overrides in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamName(pub u32);

impl StreamName {
    /// Compute the stream name hash for a declared name.
    pub const fn from_name(name: &str) -> Self {
        Self(fnv1a(name))
    }
}

impl fmt::Display for StreamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<u32> for StreamName {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies an entity (or entity group, when the envelope's target kind
/// says so). The entity storage itself is an external collaborator; this
/// core only routes by the raw 32-bit key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
