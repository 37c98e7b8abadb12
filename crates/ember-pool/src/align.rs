//! Byte-boundary strategies for arena backing storage.
//!
//! The byte arenas are generic over an [`Alignment`] so the boundary is a
//! compile-time choice with no per-allocation branching. [`CacheLine`] is
//! the default for stream pools: a 64-byte base keeps every 8-byte-padded
//! envelope payload aligned for zero-copy reads.

/// Boundary applied to an arena's base address.
///
/// `BOUNDARY` must be a power of two. `1` means the allocator's natural
/// placement is used as-is.
pub trait Alignment {
    /// The boundary in bytes.
    const BOUNDARY: usize;

    /// Backing-buffer size that guarantees `capacity` aligned bytes.
    fn padded_size(capacity: usize) -> usize {
        if Self::BOUNDARY <= 1 {
            capacity
        } else {
            capacity + Self::BOUNDARY - 1
        }
    }

    /// Offset from `addr` to the first aligned byte.
    fn base_offset(addr: usize) -> usize {
        if Self::BOUNDARY <= 1 {
            0
        } else {
            addr.wrapping_neg() & (Self::BOUNDARY - 1)
        }
    }
}

/// No extra alignment beyond the allocator's natural placement.
#[derive(Clone, Copy, Debug)]
pub struct NoAlign;

impl Alignment for NoAlign {
    const BOUNDARY: usize = 1;
}

/// 16-byte boundary for vectorized payload access.
#[derive(Clone, Copy, Debug)]
pub struct Simd;

impl Alignment for Simd {
    const BOUNDARY: usize = 16;
}

/// 64-byte boundary so hot arenas start on their own cache line.
#[derive(Clone, Copy, Debug)]
pub struct CacheLine;

impl Alignment for CacheLine {
    const BOUNDARY: usize = 64;
}
