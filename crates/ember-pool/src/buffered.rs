//! The shared byte-arena interface and its frame-buffering wrappers.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::PoolError;

/// Shared-access byte arena, implemented by [`RawPool`] and
/// [`AtomicRawPool`].
///
/// Everything takes `&self` so a registry can hand the same arena to
/// every producer. The frame splits into a produce phase and a quiescent
/// pump phase: [`alloc`](Self::alloc) and
/// [`extend_from`](Self::extend_from) belong to the produce phase, under
/// whatever writer cardinality the implementation tolerates, while
/// [`bytes`](Self::bytes) and [`reset`](Self::reset) must not overlap
/// any writer. Callers uphold the phase boundary; the scheduler provides
/// it by running the pump with the task graph drained.
///
/// [`RawPool`]: crate::RawPool
/// [`AtomicRawPool`]: crate::AtomicRawPool
pub trait BytePool: Send + Sync {
    /// Claim `len` bytes for writing.
    ///
    /// `Ok(None)` means the arena is full and its policy sheds traffic.
    fn alloc(&self, len: u32) -> Result<Option<&mut [u8]>, PoolError>;

    /// Bulk-append `bytes` carrying `items` records, all or nothing.
    fn extend_from(&self, bytes: &[u8], items: u32) -> Result<Option<()>, PoolError>;

    /// The written bytes, oldest record first.
    fn bytes(&self) -> &[u8];

    /// Discard every record. Must not overlap writers.
    fn reset(&self);

    /// Number of records written.
    fn count(&self) -> u32;

    /// Bytes written.
    fn used(&self) -> u32;

    /// Usable bytes.
    fn capacity(&self) -> u32;

    /// Bytes that still fit.
    fn remaining(&self) -> u32 {
        self.capacity() - self.used()
    }
}

/// Read/write pair of arenas a stream pumps between frames.
///
/// `read` is what consumers iterate this frame; `write` is where
/// producers append. [`swap`](Self::swap) advances the frame.
pub trait StreamBuffer: Send + Sync {
    /// The arena consumers read this frame.
    fn read(&self) -> &dyn BytePool;

    /// The arena producers append to this frame.
    fn write(&self) -> &dyn BytePool;

    /// Advance the frame boundary. Must not overlap producers or
    /// consumers; the engine calls this from the pump with the task
    /// graph quiescent.
    fn swap(&self);
}

/// Two arenas flipped every pump: records written this frame become
/// readable next frame, so producers never race consumers.
#[derive(Debug)]
pub struct DoubleBuffered<P> {
    pools: [P; 2],
    read: AtomicUsize,
}

impl<P: BytePool> DoubleBuffered<P> {
    /// Wrap a pair of arenas. Both start empty; `a` is read first.
    pub fn new(a: P, b: P) -> Self {
        Self {
            pools: [a, b],
            read: AtomicUsize::new(0),
        }
    }

    /// The arena consumers read this frame.
    pub fn read(&self) -> &P {
        &self.pools[self.read.load(Ordering::Acquire)]
    }

    /// The arena producers append to this frame.
    pub fn write(&self) -> &P {
        &self.pools[self.read.load(Ordering::Acquire) ^ 1]
    }

    /// Flip the buffers: the consumed read arena is reset and becomes
    /// the new write side.
    pub fn swap(&self) {
        let read = self.read.load(Ordering::Acquire);
        self.pools[read].reset();
        self.read.store(read ^ 1, Ordering::Release);
    }
}

impl<P: BytePool> StreamBuffer for DoubleBuffered<P> {
    fn read(&self) -> &dyn BytePool {
        DoubleBuffered::<P>::read(self)
    }

    fn write(&self) -> &dyn BytePool {
        DoubleBuffered::<P>::write(self)
    }

    fn swap(&self) {
        DoubleBuffered::<P>::swap(self);
    }
}

/// One arena serving both sides: records are visible the same frame
/// they are written. Used for streams that need zero-frame latency
/// (engine commands, input).
#[derive(Debug)]
pub struct SingleBuffered<P> {
    pool: P,
}

impl<P: BytePool> SingleBuffered<P> {
    /// Wrap a single arena.
    pub fn new(pool: P) -> Self {
        Self { pool }
    }

    /// The underlying arena.
    pub fn pool(&self) -> &P {
        &self.pool
    }
}

impl<P: BytePool> StreamBuffer for SingleBuffered<P> {
    fn read(&self) -> &dyn BytePool {
        &self.pool
    }

    fn write(&self) -> &dyn BytePool {
        &self.pool
    }

    fn swap(&self) {
        self.pool.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::NoAlign;
    use crate::policy::OverflowPolicy;
    use crate::raw::RawPool;

    fn arena(capacity: u32) -> RawPool<NoAlign> {
        RawPool::new(capacity, OverflowPolicy::Fatal)
    }

    #[test]
    fn writes_become_readable_after_one_swap() {
        let buffers = DoubleBuffered::new(arena(16), arena(16));
        buffers.write().alloc(4).unwrap().unwrap().fill(7);
        // Not visible yet.
        assert!(buffers.read().bytes().is_empty());

        buffers.swap();
        assert_eq!(buffers.read().bytes(), &[7; 4]);
        // The new write side starts empty.
        assert_eq!(buffers.write().used(), 0);
    }

    #[test]
    fn swap_discards_the_consumed_frame() {
        let buffers = DoubleBuffered::new(arena(16), arena(16));
        buffers.write().alloc(4).unwrap().unwrap().fill(1);
        buffers.swap();
        buffers.write().alloc(4).unwrap().unwrap().fill(2);
        buffers.swap();
        // Frame 1's records are gone, frame 2's are readable.
        assert_eq!(buffers.read().bytes(), &[2; 4]);
        buffers.swap();
        assert!(buffers.read().bytes().is_empty());
    }

    #[test]
    fn double_buffered_behaves_the_same_through_the_trait_object() {
        let buffers: Box<dyn StreamBuffer> =
            Box::new(DoubleBuffered::new(arena(16), arena(16)));
        buffers.write().alloc(4).unwrap().unwrap().fill(3);
        assert!(buffers.read().bytes().is_empty());
        buffers.swap();
        assert_eq!(buffers.read().bytes(), &[3; 4]);
    }

    #[test]
    fn single_buffered_is_visible_same_frame() {
        let buffer = SingleBuffered::new(arena(16));
        buffer.write().alloc(2).unwrap().unwrap().fill(9);
        assert_eq!(StreamBuffer::read(&buffer).bytes(), &[9, 9]);
        buffer.swap();
        assert!(StreamBuffer::read(&buffer).bytes().is_empty());
    }
}
