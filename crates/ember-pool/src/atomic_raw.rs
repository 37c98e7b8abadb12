//! Concurrent heterogeneous byte arena.

use std::cell::UnsafeCell;
use std::marker::PhantomData;
use std::slice;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::align::{Alignment, CacheLine};
use crate::buffered::BytePool;
use crate::error::PoolError;
use crate::policy::OverflowPolicy;

/// A fixed-capacity bump arena of raw bytes that accepts allocations from
/// any thread.
///
/// Regions are claimed with a compare-and-swap on the write cursor, so
/// concurrent task-graph nodes push wait-free and never overlap. Reads
/// and resets belong to the quiescent pump phase, same contract as
/// [`RawPool`](crate::RawPool).
#[derive(Debug)]
pub struct AtomicRawPool<A: Alignment = CacheLine> {
    buf: Box<[UnsafeCell<u8>]>,
    base: usize,
    capacity: u32,
    cursor: AtomicU32,
    items: AtomicU32,
    policy: OverflowPolicy,
    _align: PhantomData<A>,
}

// SAFETY: writers claim disjoint regions through the CAS on `cursor`, and
// readers run only after the produce phase has finished.
unsafe impl<A: Alignment> Send for AtomicRawPool<A> {}
// SAFETY: as above.
unsafe impl<A: Alignment> Sync for AtomicRawPool<A> {}

impl<A: Alignment> AtomicRawPool<A> {
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
            cursor: AtomicU32::new(0),
            items: AtomicU32::new(0),
            policy,
            _align: PhantomData,
        }
    }

    /// Claim `len` bytes, returning the region's start offset.
    fn reserve(&self, len: u32) -> Option<u32> {
        let mut start = self.cursor.load(Ordering::Relaxed);
        loop {
            if u64::from(start) + u64::from(len) > u64::from(self.capacity) {
                return None;
            }
            match self.cursor.compare_exchange_weak(
                start,
                start + len,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Some(start),
                Err(current) => start = current,
            }
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

impl<A: Alignment> BytePool for AtomicRawPool<A> {
    fn alloc(&self, len: u32) -> Result<Option<&mut [u8]>, PoolError> {
        let Some(start) = self.reserve(len) else {
            return self.policy.overflow(
                "atomic byte arena",
                len as usize,
                self.used() as usize,
                self.capacity as usize,
            );
        };
        self.items.fetch_add(1, Ordering::AcqRel);
        // SAFETY: the CAS in `reserve` made this region exclusively ours.
        Ok(Some(unsafe {
            slice::from_raw_parts_mut(self.region(start), len as usize)
        }))
    }

    fn extend_from(&self, bytes: &[u8], items: u32) -> Result<Option<()>, PoolError> {
        let Some(start) = self.reserve(bytes.len() as u32) else {
            return self.policy.overflow(
                "atomic byte arena",
                bytes.len(),
                self.used() as usize,
                self.capacity as usize,
            );
        };
        self.items.fetch_add(items, Ordering::AcqRel);
        // SAFETY: as in `alloc`, the reserved region is exclusively ours.
        unsafe {
            slice::from_raw_parts_mut(self.region(start), bytes.len()).copy_from_slice(bytes);
        }
        Ok(Some(()))
    }

    fn bytes(&self) -> &[u8] {
        let used = self.cursor.load(Ordering::Acquire) as usize;
        // SAFETY: `0..used` was fully written before the quiescent point
        // that precedes any read.
        unsafe { slice::from_raw_parts(self.region(0), used) }
    }

    fn reset(&self) {
        self.cursor.store(0, Ordering::Release);
        self.items.store(0, Ordering::Release);
    }

    fn count(&self) -> u32 {
        self.items.load(Ordering::Acquire)
    }

    fn used(&self) -> u32 {
        self.cursor.load(Ordering::Acquire)
    }

    fn capacity(&self) -> u32 {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::NoAlign;
    use std::thread;

    #[test]
    fn concurrent_allocations_never_overlap() {
        let pool = AtomicRawPool::<NoAlign>::new(4 * 128 * 8, OverflowPolicy::Fatal);
        thread::scope(|scope| {
            for writer in 0u8..4 {
                let pool = &pool;
                scope.spawn(move || {
                    for _ in 0..128 {
                        let region = pool.alloc(8).unwrap().unwrap();
                        region.copy_from_slice(&[writer + 1; 8]);
                    }
                });
            }
        });
        assert_eq!(pool.count(), 4 * 128);
        assert_eq!(pool.used(), 4 * 128 * 8);
        // Every 8-byte record is uniform: no allocation was torn by another.
        let mut per_writer = [0u32; 4];
        for record in pool.bytes().chunks_exact(8) {
            assert!(record.iter().all(|&b| b == record[0]), "torn record");
            per_writer[(record[0] - 1) as usize] += 1;
        }
        assert_eq!(per_writer, [128; 4]);
    }

    #[test]
    fn exhaustion_follows_the_policy() {
        let pool = AtomicRawPool::<NoAlign>::new(8, OverflowPolicy::Fatal);
        pool.alloc(8).unwrap().unwrap();
        assert!(matches!(
            pool.alloc(1),
            Err(PoolError::Exhausted { capacity: 8, .. })
        ));

        let shedding = AtomicRawPool::<NoAlign>::new(8, OverflowPolicy::Log);
        shedding.alloc(8).unwrap().unwrap();
        assert!(shedding.alloc(1).unwrap().is_none());
    }

    #[test]
    fn reset_reclaims_the_arena() {
        let pool = AtomicRawPool::<NoAlign>::new(16, OverflowPolicy::Fatal);
        pool.alloc(16).unwrap().unwrap();
        pool.reset();
        assert_eq!(pool.used(), 0);
        assert_eq!(pool.count(), 0);
        assert!(pool.alloc(16).unwrap().is_some());
    }

    #[test]
    fn extend_from_is_atomic_per_call() {
        let pool = AtomicRawPool::<NoAlign>::new(8, OverflowPolicy::Silent);
        assert!(pool.extend_from(&[1; 6], 2).unwrap().is_some());
        assert!(pool.extend_from(&[2; 4], 1).unwrap().is_none());
        assert_eq!(pool.used(), 6);
        assert_eq!(pool.count(), 2);
    }
}
