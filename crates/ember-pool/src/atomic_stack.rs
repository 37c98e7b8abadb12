//! Concurrent bump pool of homogeneous elements.

use std::cell::UnsafeCell;
use std::slice;
use std::sync::atomic::{AtomicU32, Ordering};

use bytemuck::Pod;

use crate::error::PoolError;
use crate::policy::OverflowPolicy;

/// A fixed-capacity bump pool of `T` that accepts pushes from any thread.
///
/// Slots are reserved with a compare-and-swap on the length, so concurrent
/// producers never contend on a lock and never overlap. Reads via
/// [`items`](Self::items) and rewinds via [`reset`](Self::reset) belong to
/// the consume phase of the frame: callers must not overlap them with
/// pushes.
#[derive(Debug)]
pub struct AtomicStackPool<T> {
    slots: Box<[UnsafeCell<T>]>,
    len: AtomicU32,
    policy: OverflowPolicy,
}

// SAFETY: `T: Pod` carries no references or interior state, writers claim
// disjoint slots through the CAS on `len`, and readers run only in the
// quiescent consume phase.
unsafe impl<T: Pod> Send for AtomicStackPool<T> {}
// SAFETY: as above.
unsafe impl<T: Pod> Sync for AtomicStackPool<T> {}

impl<T: Pod> AtomicStackPool<T> {
    /// Create a pool that holds up to `capacity` elements.
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        let slots = (0..capacity)
            .map(|_| UnsafeCell::new(T::zeroed()))
            .collect();
        Self {
            slots,
            len: AtomicU32::new(0),
            policy,
        }
    }

    /// Reserve `n` contiguous slots, returning the first index.
    fn reserve(&self, n: u32) -> Option<u32> {
        let capacity = self.slots.len() as u32;
        let mut len = self.len.load(Ordering::Relaxed);
        loop {
            if len + n > capacity {
                return None;
            }
            match self.len.compare_exchange_weak(
                len,
                len + n,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Some(len),
                Err(current) => len = current,
            }
        }
    }

    /// Claim a zeroed element and return it for in-place construction.
    pub fn alloc(&self) -> Result<Option<&mut T>, PoolError> {
        let Some(index) = self.reserve(1) else {
            return self.policy.overflow("atomic stack pool", 1, self.count(), self.capacity());
        };
        let slot = &self.slots[index as usize];
        // SAFETY: the CAS in `reserve` made `index` exclusively ours; no
        // other producer will touch it and consumers wait for quiescence.
        Ok(Some(unsafe { &mut *slot.get() }))
    }

    /// Append `value`.
    pub fn push(&self, value: T) -> Result<Option<()>, PoolError> {
        match self.alloc()? {
            Some(slot) => {
                *slot = value;
                Ok(Some(()))
            }
            None => Ok(None),
        }
    }

    /// Append every element of `values`, all or nothing.
    pub fn push_all(&self, values: &[T]) -> Result<Option<()>, PoolError> {
        let Some(start) = self.reserve(values.len() as u32) else {
            return self.policy.overflow(
                "atomic stack pool",
                values.len(),
                self.count(),
                self.capacity(),
            );
        };
        for (offset, value) in values.iter().enumerate() {
            let slot = &self.slots[start as usize + offset];
            // SAFETY: `reserve` claimed this contiguous range for us alone.
            unsafe { *slot.get() = *value };
        }
        Ok(Some(()))
    }

    /// Discard every element. Must not overlap concurrent pushes.
    pub fn reset(&self) {
        self.len.store(0, Ordering::Release);
    }

    /// The live elements, oldest first. Must not overlap concurrent pushes.
    pub fn items(&self) -> &[T] {
        let len = self.len.load(Ordering::Acquire) as usize;
        // SAFETY: slots 0..len were fully written before the quiescent
        // point that precedes any read, and `UnsafeCell<T>` has the layout
        // of `T`.
        unsafe { slice::from_raw_parts(self.slots.as_ptr().cast::<T>(), len) }
    }

    /// Number of live elements.
    pub fn count(&self) -> usize {
        self.len.load(Ordering::Acquire) as usize
    }

    /// Maximum number of elements.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Elements that still fit.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.count()
    }
}
