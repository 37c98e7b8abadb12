//! Single-writer heterogeneous byte arena.

use std::cell::{Cell, UnsafeCell};
use std::marker::PhantomData;
use std::slice;

use crate::align::{Alignment, CacheLine};
use crate::buffered::BytePool;
use crate::error::PoolError;
use crate::policy::OverflowPolicy;

/// A fixed-capacity bump arena of raw bytes with one serialized writer.
///
/// The write cursor is a plain [`Cell`], so pushes cost nothing beyond a
/// bounds check. The arena is still `Sync` so a stream registry can hold
/// it behind an `Arc`; the engine guarantees that at most one thread
/// allocates at a time and that readers run only after the producing
/// phase has finished. Use [`AtomicRawPool`](crate::AtomicRawPool) when
/// producers genuinely race.
#[derive(Debug)]
pub struct RawPool<A: Alignment = CacheLine> {
    buf: Box<[UnsafeCell<u8>]>,
    base: usize,
    capacity: u32,
    cursor: Cell<u32>,
    items: Cell<u32>,
    policy: OverflowPolicy,
    _align: PhantomData<A>,
}

// SAFETY: the engine serializes writers (single-writer streams are only
// pushed from the simulation thread) and readers run strictly after the
// last push of the produce phase.
unsafe impl<A: Alignment> Send for RawPool<A> {}
// SAFETY: as above.
unsafe impl<A: Alignment> Sync for RawPool<A> {}

impl<A: Alignment> RawPool<A> {
    /// Create an arena with `capacity` usable bytes.
    pub fn new(capacity: u32, policy: OverflowPolicy) -> Self {
        let buf: Box<[UnsafeCell<u8>]> = (0..A::padded_size(capacity as usize))
            .map(|_| UnsafeCell::new(0))
            .collect();
        let base = A::base_offset(buf.as_ptr() as usize);
        Self {
            buf,
            base,
            capacity,
            cursor: Cell::new(0),
            items: Cell::new(0),
            policy,
            _align: PhantomData,
        }
    }

    fn region(&self, start: u32) -> *mut u8 {
        let index = self.base + start as usize;
        debug_assert!(index <= self.buf.len());
        // SAFETY: `base + capacity <= buf.len()` by construction and every
        // caller stays below `capacity`.
        unsafe { UnsafeCell::raw_get(self.buf.as_ptr().add(index)) }
    }
}

impl<A: Alignment> BytePool for RawPool<A> {
    fn alloc(&self, len: u32) -> Result<Option<&mut [u8]>, PoolError> {
        let start = self.cursor.get();
        if u64::from(start) + u64::from(len) > u64::from(self.capacity) {
            return self.policy.overflow(
                "byte arena",
                len as usize,
                start as usize,
                self.capacity as usize,
            );
        }
        self.cursor.set(start + len);
        self.items.set(self.items.get() + 1);
        // SAFETY: the cursor advance makes `start..end` exclusively ours;
        // no previously handed-out region overlaps it.
        Ok(Some(unsafe {
            slice::from_raw_parts_mut(self.region(start), len as usize)
        }))
    }

    fn extend_from(&self, bytes: &[u8], items: u32) -> Result<Option<()>, PoolError> {
        let start = self.cursor.get();
        let len = bytes.len();
        if u64::from(start) + len as u64 > u64::from(self.capacity) {
            return self
                .policy
                .overflow("byte arena", len, start as usize, self.capacity as usize);
        }
        self.cursor.set(start + len as u32);
        self.items.set(self.items.get() + items);
        // SAFETY: as in `alloc`, the advanced cursor reserves the region.
        unsafe {
            slice::from_raw_parts_mut(self.region(start), len).copy_from_slice(bytes);
        }
        Ok(Some(()))
    }

    fn bytes(&self) -> &[u8] {
        let used = self.cursor.get() as usize;
        // SAFETY: `0..used` was fully written before any read phase.
        unsafe { slice::from_raw_parts(self.region(0), used) }
    }

    fn reset(&self) {
        self.cursor.set(0);
        self.items.set(0);
    }

    fn count(&self) -> u32 {
        self.items.get()
    }

    fn used(&self) -> u32 {
        self.cursor.get()
    }

    fn capacity(&self) -> u32 {
        self.capacity
    }
}
