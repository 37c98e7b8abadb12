//! Test utilities and probe types for Ember development.
//!
//! Provides small `Pod` payloads for exercising streams and messages, a
//! preconfigured [`StreamRegistry`] constructor, and the system fixtures
//! in [`fixtures`] for driving the scheduler in tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};

use ember_core::{Event, Message};
use ember_pool::OverflowPolicy;
use ember_stream::StreamRegistry;

/// One-word probe event, emitted once per frame by the tick fixtures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Tick {
    pub frame: u32,
}

impl Event for Tick {
    const NAME: &'static str = "test/tick";
}

/// Probe event with a payload worth asserting on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Ping {
    pub seq: u32,
    pub value: u32,
}

impl Event for Ping {
    const NAME: &'static str = "test/ping";
}

/// Probe message for the targeted-delivery path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Damage {
    pub source: u32,
    pub amount: u32,
}

impl Message for Damage {
    const NAME: &'static str = "test/damage";
}

/// A registry with only the engine streams, `capacity` bytes per buffer,
/// and a fatal overflow policy so tests notice exhaustion.
pub fn registry(capacity: u32) -> Arc<StreamRegistry> {
    Arc::new(StreamRegistry::builder(capacity, OverflowPolicy::Fatal).build())
}
