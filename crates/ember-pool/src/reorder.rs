//! Dense pool with per-element reclamation via swap-removal.

use indexmap::IndexMap;

use crate::error::PoolError;
use crate::policy::OverflowPolicy;

/// Handle to an element in a [`ReorderingPool`].
///
/// Ids are monotonic and never reused, so a stale handle is detected
/// rather than silently resolving to a different element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotId(u64);

impl SlotId {
    /// The raw id.
    pub fn id(self) -> u64 {
        self.0
    }
}

/// A fixed-capacity pool that keeps its elements dense.
///
/// Discarding swaps the last element into the vacated position, so
/// iteration always walks contiguous storage but element order is not
/// preserved across discards. Use this for bulk per-frame iteration
/// (particles, transient effects); use [`FreeListPool`] when order or
/// stable positions matter.
///
/// [`FreeListPool`]: crate::FreeListPool
#[derive(Debug)]
pub struct ReorderingPool<T> {
    items: IndexMap<SlotId, T>,
    next: u64,
    capacity: usize,
    policy: OverflowPolicy,
}

impl<T> ReorderingPool<T> {
    /// Create a pool that holds up to `capacity` elements.
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            items: IndexMap::with_capacity(capacity),
            next: 0,
            capacity,
            policy,
        }
    }

    /// Insert `value`, returning its handle.
    pub fn insert(&mut self, value: T) -> Result<Option<SlotId>, PoolError> {
        if self.items.len() == self.capacity {
            return self
                .policy
                .overflow("reordering pool", 1, self.items.len(), self.capacity);
        }
        let id = SlotId(self.next);
        self.next += 1;
        self.items.insert(id, value);
        Ok(Some(id))
    }

    /// Remove the element with `id` and return it.
    ///
    /// The last element is swapped into the vacated position. A stale or
    /// foreign id is a caller defect, so it is an error regardless of the
    /// overflow policy.
    pub fn discard(&mut self, id: SlotId) -> Result<T, PoolError> {
        self.items
            .swap_remove(&id)
            .ok_or(PoolError::SlotVacant { slot: id.0 })
    }

    /// The element with `id`, if it is live.
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.items.get(&id)
    }

    /// Mutable access to the element with `id`, if it is live.
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.items.get_mut(&id)
    }

    /// Iterate over the live elements in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.items.iter().map(|(id, value)| (*id, value))
    }

    /// Mutable iteration over the live elements in storage order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotId, &mut T)> {
        self.items.iter_mut().map(|(id, value)| (*id, value))
    }

    /// Discard every element.
    pub fn reset(&mut self) {
        self.items.clear();
    }

    /// Number of live elements.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Maximum number of elements.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Elements that still fit.
    pub fn remaining(&self) -> usize {
        self.capacity - self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discard_keeps_storage_dense() {
        let mut pool = ReorderingPool::new(4, OverflowPolicy::Fatal);
        let a = pool.insert("a").unwrap().unwrap();
        let _b = pool.insert("b").unwrap().unwrap();
        let _c = pool.insert("c").unwrap().unwrap();

        assert_eq!(pool.discard(a).unwrap(), "a");
        // The tail element moved into the vacated position.
        let order: Vec<&str> = pool.iter().map(|(_, v)| *v).collect();
        assert_eq!(order, vec!["c", "b"]);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut pool = ReorderingPool::new(1, OverflowPolicy::Fatal);
        let a = pool.insert(1u32).unwrap().unwrap();
        pool.discard(a).unwrap();
        let b = pool.insert(2u32).unwrap().unwrap();
        assert_ne!(a, b);
        // The stale handle no longer resolves.
        assert_eq!(pool.get(a), None);
        assert_eq!(pool.discard(a), Err(PoolError::SlotVacant { slot: a.id() }));
    }

    #[test]
    fn capacity_is_enforced() {
        let mut pool = ReorderingPool::new(2, OverflowPolicy::Silent);
        pool.insert(1u8).unwrap();
        pool.insert(2u8).unwrap();
        assert_eq!(pool.insert(3u8).unwrap(), None);

        let mut fatal = ReorderingPool::new(0, OverflowPolicy::Fatal);
        assert!(matches!(
            fatal.insert(1u8),
            Err(PoolError::Exhausted { capacity: 0, .. })
        ));
    }
}
