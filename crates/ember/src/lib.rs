//! Ember: a frame-synchronous event pipeline and task scheduler for
//! game engines.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Ember sub-crates. For most users, adding `ember` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use ember::prelude::*;
//!
//! let mut engine = Engine::new(EngineConfig {
//!     worker_threads: Some(2),
//!     loader_threads: 0,
//!     ..EngineConfig::default()
//! })?;
//!
//! // A system that asks the engine to exit. Update runs after the
//! // pump, so the command is scanned at the start of the next frame.
//! engine
//!     .coordinator_mut()
//!     .stage_mut(SystemStage::Update)
//!     .add("quit", |ctx| {
//!         ctx.engine(EngineStream::Commands).emit::<EngineExit>()?;
//!         Ok(())
//!     })?;
//! engine.coordinator_mut().rebuild()?;
//!
//! engine.run()?;
//! # Ok::<(), ember::engine::EngineError>(())
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `ember-core` | IDs, envelope layout, payload traits, stage and command vocabularies |
//! | [`pool`] | `ember-pool` | Arena pools, overflow policies, buffered pool pairs |
//! | [`stream`] | `ember-stream` | Event streams, message publishing, the registry and its pump |
//! | [`sched`] | `ember-sched` | System stages, the coordinator, the task-graph executor |
//! | [`engine`] | `ember-engine` | Engine configuration, the frame loop, renderer handoff, resource loading |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core identifiers, envelope layout, and vocabularies (`ember-core`).
///
/// Contains [`types::EventTypeId`], [`types::StreamName`], the
/// [`types::Event`]/[`types::Message`] payload traits, and the engine
/// command payloads the frame loop decodes.
pub use ember_core as types;

/// Arena pools and overflow policies (`ember-pool`).
///
/// Byte arenas ([`pool::RawPool`], [`pool::AtomicRawPool`]), typed pools
/// ([`pool::StackPool`], [`pool::FreeListPool`], [`pool::ReorderingPool`]),
/// and the [`pool::DoubleBuffered`]/[`pool::SingleBuffered`] frame pairs.
pub use ember_pool as pool;

/// Event streams and targeted messages (`ember-stream`).
///
/// The [`stream::StreamRegistry`] owns every named stream and the global
/// message pool; [`stream::EventStream`] and [`stream::MessagePublisher`]
/// are the typed facades systems write through.
pub use ember_stream as stream;

/// Frame task scheduling (`ember-sched`).
///
/// Register systems into stages on the [`sched::Coordinator`]; the
/// [`sched::Executor`] runs the compiled frame graph on a persistent
/// worker pool.
pub use ember_sched as sched;

/// The engine and frame loop (`ember-engine`).
///
/// [`engine::Engine`] assembles the registry, coordinator, executor,
/// loader pool, and renderer handoff behind one frame-by-frame API.
pub use ember_engine as engine;

/// Common imports for typical Ember usage.
///
/// ```rust
/// use ember::prelude::*;
/// ```
pub mod prelude {
    // Identifiers, payload traits, and vocabularies
    pub use ember_core::{
        EngineCommand, EngineExit, EngineStream, EntityId, Event, EventTypeId, Message, SceneLoad,
        StreamName, StreamWriters, SystemStage, SystemStatusRunning, SystemStatusStopped,
    };

    // Pool policy
    pub use ember_pool::{OverflowPolicy, PoolError};

    // Streams and messages
    pub use ember_stream::{
        EventStream, MessagePublisher, StreamError, StreamRegistry, StreamRegistryBuilder,
    };

    // Scheduling
    pub use ember_sched::{
        Coordinator, SchedError, SchedulerStatus, SystemResult, TaskContext,
    };

    // The engine
    pub use ember_engine::{
        Engine, EngineConfig, EngineError, FrameOutcome, LoadJob, ResourceLoadFailed,
        ResourceLoaded, SceneLoader,
    };
}
