//! Fixed-capacity arena pools for the Ember frame pipeline.
//!
//! Every pool here allocates its backing storage once at construction and
//! never touches the system allocator again in steady state. Exhaustion
//! invokes a per-pool [`OverflowPolicy`] instead of growing.
//!
//! # Architecture
//!
//! ```text
//! homogeneous pools          heterogeneous byte arenas
//! ├── StackPool<T>           ├── RawPool        (single writer)
//! ├── AtomicStackPool<T>     └── AtomicRawPool  (concurrent writers)
//! ├── FreeListPool<T>                 │
//! └── ReorderingPool<T>       DoubleBuffered / SingleBuffered
//! ```
//!
//! # Unsafe policy
//!
//! This is the one crate in the workspace that contains `unsafe` code: the
//! byte arenas and the atomic stack pool hand out disjoint regions of an
//! `UnsafeCell` slab through `&self` so concurrent task-graph nodes can
//! push without locks. Each unsafe block documents the invariant it relies
//! on; everything above this crate is `#![forbid(unsafe_code)]`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod align;
pub mod atomic_raw;
pub mod atomic_stack;
pub mod buffered;
pub mod error;
pub mod free_list;
pub mod policy;
pub mod raw;
pub mod reorder;
pub mod stack;

// Public re-exports for the primary API surface.
pub use align::{Alignment, CacheLine, NoAlign, Simd};
pub use atomic_raw::AtomicRawPool;
pub use atomic_stack::AtomicStackPool;
pub use buffered::{BytePool, DoubleBuffered, SingleBuffered, StreamBuffer};
pub use error::PoolError;
pub use free_list::{FreeListPool, SlotIndex};
pub use policy::OverflowPolicy;
pub use raw::RawPool;
pub use reorder::{ReorderingPool, SlotId};
pub use stack::StackPool;
