//! The Ember engine shell: configuration, the frame loop, the renderer
//! handoff, and background resource loading.
//!
//! [`Engine`] ties the workspace together: it builds the stream registry
//! from an [`EngineConfig`], compiles the coordinator's frame graphs,
//! drives the executor once per frame, scans the command stream for the
//! engine vocabulary, polls loader completions into the resources stream,
//! and hands the frame to the renderer thread.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod frame;
pub mod handoff;
pub mod loader;

// Public re-exports for the primary API surface.
pub use config::{ConfigError, EngineConfig};
pub use error::EngineError;
pub use frame::{Engine, FrameOutcome, SceneLoader};
pub use handoff::{RenderGate, Renderer};
pub use loader::{Completion, LoadJob, LoaderPool, ResourceLoadFailed, ResourceLoaded};
