//! Fixed-capacity pool with per-element reclamation.

use crate::error::PoolError;
use crate::policy::OverflowPolicy;

/// Handle to an element in a [`FreeListPool`].
///
/// Handles are plain indices: they stay valid until the element is
/// discarded, and discarding validates them instead of trusting them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotIndex(u32);

impl SlotIndex {
    /// The raw slot index.
    pub fn index(self) -> u32 {
        self.0
    }
}

#[derive(Debug)]
enum Slot<T> {
    Occupied(T),
    Vacant { next: Option<u32> },
}

/// A fixed-capacity pool whose elements can be discarded individually.
///
/// Vacant slots form an intrusive free list, so insert and discard are
/// both O(1). Unlike the bump pools, element order is not meaningful;
/// a discarded slot is reused by the next insert.
#[derive(Debug)]
pub struct FreeListPool<T> {
    slots: Vec<Slot<T>>,
    head: Option<u32>,
    len: u32,
    policy: OverflowPolicy,
}

impl<T> FreeListPool<T> {
    /// Create a pool that holds up to `capacity` elements.
    pub fn new(capacity: u32, policy: OverflowPolicy) -> Self {
        let mut pool = Self {
            slots: Vec::with_capacity(capacity as usize),
            head: None,
            len: 0,
            policy,
        };
        pool.rebuild_free_list(capacity);
        pool
    }

    fn rebuild_free_list(&mut self, capacity: u32) {
        self.slots.clear();
        for i in 0..capacity {
            let next = if i + 1 < capacity { Some(i + 1) } else { None };
            self.slots.push(Slot::Vacant { next });
        }
        self.head = if capacity > 0 { Some(0) } else { None };
        self.len = 0;
    }

    /// Insert `value`, returning its handle.
    pub fn insert(&mut self, value: T) -> Result<Option<SlotIndex>, PoolError> {
        let Some(index) = self.head else {
            return self.policy.overflow(
                "free-list pool",
                1,
                self.len as usize,
                self.slots.len(),
            );
        };
        let slot = &mut self.slots[index as usize];
        let Slot::Vacant { next } = *slot else {
            // The head of the free list is vacant by construction.
            unreachable!("free-list head points at an occupied slot");
        };
        *slot = Slot::Occupied(value);
        self.head = next;
        self.len += 1;
        Ok(Some(SlotIndex(index)))
    }

    /// Remove the element at `slot` and return it.
    ///
    /// Fails with [`PoolError::ForeignSlot`] for handles outside the pool
    /// and [`PoolError::SlotVacant`] for slots already discarded. Both
    /// indicate a bookkeeping defect in the caller, so they are errors
    /// regardless of the overflow policy.
    pub fn discard(&mut self, slot: SlotIndex) -> Result<T, PoolError> {
        let index = slot.0;
        if index as usize >= self.slots.len() {
            return Err(PoolError::ForeignSlot {
                slot: u64::from(index),
                capacity: self.slots.len() as u64,
            });
        }
        let entry = &mut self.slots[index as usize];
        if matches!(entry, Slot::Vacant { .. }) {
            return Err(PoolError::SlotVacant {
                slot: u64::from(index),
            });
        }
        let taken = std::mem::replace(entry, Slot::Vacant { next: self.head });
        self.head = Some(index);
        self.len -= 1;
        match taken {
            Slot::Occupied(value) => Ok(value),
            Slot::Vacant { .. } => unreachable!("vacancy was checked above"),
        }
    }

    /// The element at `slot`, if it is live.
    pub fn get(&self, slot: SlotIndex) -> Option<&T> {
        match self.slots.get(slot.0 as usize)? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    /// Mutable access to the element at `slot`, if it is live.
    pub fn get_mut(&mut self, slot: SlotIndex) -> Option<&mut T> {
        match self.slots.get_mut(slot.0 as usize)? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    /// Iterate over the live elements with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (SlotIndex, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match slot {
            Slot::Occupied(value) => Some((SlotIndex(i as u32), value)),
            Slot::Vacant { .. } => None,
        })
    }

    /// Discard every element and rebuild the free list.
    pub fn reset(&mut self) {
        let capacity = self.slots.len() as u32;
        self.rebuild_free_list(capacity);
    }

    /// Number of live elements.
    pub fn count(&self) -> usize {
        self.len as usize
    }

    /// Maximum number of elements.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Elements that still fit.
    pub fn remaining(&self) -> usize {
        self.slots.len() - self.len as usize
    }
}
