//! Core types for the Ember frame pipeline.
//!
//! Provides the strongly-typed identifiers, the binary envelope layout
//! shared by every event and message pool, the [`Event`]/[`Message`]
//! payload traits, and the fixed vocabularies (pipeline stages, engine
//! streams, engine commands) that the rest of the workspace builds on.
//!
//! This crate is deliberately leaf-level: no allocation, no threads,
//! no I/O. Everything here is plain data.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod command;
pub mod envelope;
pub mod event;
pub mod id;
pub mod stage;

// Public re-exports for the primary API surface.
pub use command::{EngineCommand, EngineExit, SceneLoad, SystemStatusRunning, SystemStatusStopped};
pub use envelope::{
    EventHeader, MessageHeader, MessageMeta, TargetKind, EVENT_HEADER_BYTES, MESSAGE_HEADER_BYTES,
};
pub use event::{Event, Message, MAX_MESSAGE_PAYLOAD};
pub use id::{EntityId, EventTypeId, StreamName};
pub use stage::{EngineStream, StreamWriters, SystemStage};
