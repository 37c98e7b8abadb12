//! Frame task scheduling for Ember.
//!
//! Gameplay systems register into per-stage [`SystemRegistry`]s; the
//! [`Coordinator`] compiles the stages, the engine hook slots, and the
//! stream pump into one dependency graph per frame shape, and the
//! [`Executor`]'s persistent worker pool runs a graph to completion once
//! per frame. A panicking or erroring task is caught at the task boundary
//! and fails the frame rather than the process.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod graph;
pub mod status;
pub mod system;

// Public re-exports for the primary API surface.
pub use context::TaskContext;
pub use coordinator::Coordinator;
pub use error::SchedError;
pub use executor::{default_worker_count, Executor};
pub use graph::{GraphBuilder, TaskGraph};
pub use status::SchedulerStatus;
pub use system::{SystemFn, SystemRegistry, SystemResult};
