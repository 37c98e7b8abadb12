//! Single-writer bump pool of homogeneous elements.

use bytemuck::Pod;

use crate::error::PoolError;
use crate::policy::OverflowPolicy;

/// A fixed-capacity bump pool of `T`.
///
/// Elements are appended at the end and reclaimed only wholesale via
/// [`reset`](Self::reset). The `Pod` bound keeps reset trivial: no element
/// owns anything, so rewinding the length is the whole job.
#[derive(Debug)]
pub struct StackPool<T> {
    items: Vec<T>,
    capacity: usize,
    policy: OverflowPolicy,
}

impl<T: Pod> StackPool<T> {
    /// Create a pool that holds up to `capacity` elements.
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            policy,
        }
    }

    /// Append a zeroed element and return it for in-place construction.
    pub fn alloc(&mut self) -> Result<Option<&mut T>, PoolError> {
        self.push(T::zeroed())
    }

    /// Append `value`.
    pub fn push(&mut self, value: T) -> Result<Option<&mut T>, PoolError> {
        if self.items.len() == self.capacity {
            return self
                .policy
                .overflow("stack pool", 1, self.items.len(), self.capacity);
        }
        self.items.push(value);
        Ok(self.items.last_mut())
    }

    /// Append every element of `values`, all or nothing.
    pub fn push_all(&mut self, values: &[T]) -> Result<Option<()>, PoolError> {
        if self.items.len() + values.len() > self.capacity {
            return self
                .policy
                .overflow("stack pool", values.len(), self.items.len(), self.capacity);
        }
        self.items.extend_from_slice(values);
        Ok(Some(()))
    }

    /// Discard every element.
    pub fn reset(&mut self) {
        self.items.clear();
    }

    /// The live elements, oldest first.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Mutable view of the live elements.
    pub fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
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

    /// Whether the pool holds no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
