//! The named stream registry and the frame pump.

use std::sync::Arc;

use indexmap::IndexMap;

use ember_core::{EngineStream, StreamName, StreamWriters};
use ember_pool::{
    AtomicRawPool, BytePool, CacheLine, DoubleBuffered, OverflowPolicy, PoolError, RawPool,
    SingleBuffered, StreamBuffer,
};

use crate::error::StreamError;
use crate::event::EventStream;
use crate::iter::MessageIter;
use crate::local::{LocalMessagePool, LocalPoolRegistry};

struct StreamEntry {
    label: String,
    buffer: Box<dyn StreamBuffer>,
}

/// Builds a [`StreamRegistry`].
///
/// All streams are registered up front, during engine and module setup;
/// the built registry is immutable and shared behind an `Arc`, which is
/// what lets the emit path run without locks.
pub struct StreamRegistryBuilder {
    default_capacity: u32,
    message_capacity: u32,
    local_capacity: u32,
    policy: OverflowPolicy,
    overrides: IndexMap<StreamName, u32>,
    streams: IndexMap<StreamName, StreamEntry>,
}

impl StreamRegistryBuilder {
    fn new(default_capacity: u32, policy: OverflowPolicy) -> Self {
        Self {
            default_capacity,
            message_capacity: default_capacity,
            local_capacity: default_capacity,
            policy,
            overrides: IndexMap::new(),
            streams: IndexMap::new(),
        }
    }

    /// Size the global message pool independently of the event default.
    pub fn message_capacity(mut self, bytes: u32) -> Self {
        self.message_capacity = bytes;
        self
    }

    /// Size each thread-local message pool.
    pub fn local_capacity(mut self, bytes: u32) -> Self {
        self.local_capacity = bytes;
        self
    }

    /// Override the buffer size of one stream by name.
    ///
    /// Must precede that stream's registration; engine streams are
    /// registered last, so overrides for them always apply.
    pub fn capacity_override(mut self, name: &str, bytes: u32) -> Self {
        self.overrides.insert(StreamName::from_name(name), bytes);
        self
    }

    /// Register a double-buffered stream.
    pub fn register(&mut self, name: &str, writers: StreamWriters) -> StreamName {
        self.add(name, writers, false)
    }

    /// Register a single-buffered stream (records visible the frame they
    /// are written; the pump discards them).
    pub fn register_single_buffered(&mut self, name: &str, writers: StreamWriters) -> StreamName {
        self.add(name, writers, true)
    }

    fn add(&mut self, label: &str, writers: StreamWriters, single: bool) -> StreamName {
        let name = StreamName::from_name(label);
        if let Some(existing) = self.streams.get(&name) {
            log::warn!(
                "stream {label:?} already registered as {:?}; returning the existing handle",
                existing.label
            );
            return name;
        }
        let capacity = self
            .overrides
            .get(&name)
            .copied()
            .unwrap_or(self.default_capacity);
        let buffer = make_buffer(writers, single, capacity, self.policy);
        self.streams.insert(
            name,
            StreamEntry {
                label: label.to_owned(),
                buffer,
            },
        );
        name
    }

    /// Finish: register the engine streams and freeze the registry.
    pub fn build(mut self) -> StreamRegistry {
        for stream in EngineStream::ALL {
            // Commands may be posted by any system; input arrives from the
            // frame thread only. Both need same-frame visibility.
            let writers = match stream {
                EngineStream::Commands | EngineStream::Game | EngineStream::Scene => {
                    StreamWriters::Multi
                }
                EngineStream::Input | EngineStream::Resources => StreamWriters::Single,
            };
            self.add(stream.label(), writers, stream.single_buffered());
        }
        StreamRegistry {
            streams: self.streams,
            messages: DoubleBuffered::new(
                RawPool::new(self.message_capacity, self.policy),
                RawPool::new(self.message_capacity, self.policy),
            ),
            locals: LocalPoolRegistry::new(self.local_capacity, self.policy),
        }
    }
}

/// All streams of one engine instance, plus the global message pool and
/// the per-thread message pools feeding it.
///
/// Shared immutably across the task graph; every mutation goes through
/// the interior cursors of the pools themselves.
pub struct StreamRegistry {
    streams: IndexMap<StreamName, StreamEntry>,
    messages: DoubleBuffered<RawPool<CacheLine>>,
    locals: LocalPoolRegistry,
}

impl StreamRegistry {
    /// Start building a registry with `default_capacity` bytes per stream
    /// buffer.
    pub fn builder(default_capacity: u32, policy: OverflowPolicy) -> StreamRegistryBuilder {
        StreamRegistryBuilder::new(default_capacity, policy)
    }

    /// Handle to the stream registered under `name`.
    pub fn events(&self, name: StreamName) -> Result<EventStream<'_>, StreamError> {
        self.streams
            .get(&name)
            .map(|entry| EventStream::new(name, entry.buffer.as_ref()))
            .ok_or(StreamError::UnknownStream { name })
    }

    /// Handle to an engine stream.
    pub fn engine(&self, stream: EngineStream) -> EventStream<'_> {
        match self.events(stream.name()) {
            Ok(handle) => handle,
            // Engine streams are registered unconditionally in build().
            Err(_) => unreachable!("engine stream {stream:?} not registered"),
        }
    }

    /// The calling thread's message pool, created on first use.
    pub fn local_messages(&self) -> Arc<LocalMessagePool> {
        self.locals.register()
    }

    /// Walk the messages the last pump made visible.
    pub fn messages(&self) -> MessageIter<'_> {
        MessageIter::new(self.messages.read().bytes())
    }

    /// Advance the frame boundary.
    ///
    /// Aggregates every thread-local message pool into the global pool,
    /// then flips every stream. Must run with producers and consumers
    /// quiescent; the coordinator graph schedules it as the pump task.
    pub fn pump(&self) -> Result<(), PoolError> {
        self.locals.pump_into(self.messages.write())?;
        self.messages.swap();
        for entry in self.streams.values() {
            entry.buffer.swap();
        }
        Ok(())
    }

    /// Number of registered streams.
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Whether no streams are registered (never true after `build`).
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

fn make_buffer(
    writers: StreamWriters,
    single: bool,
    capacity: u32,
    policy: OverflowPolicy,
) -> Box<dyn StreamBuffer> {
    match (single, writers) {
        (false, StreamWriters::Multi) => Box::new(DoubleBuffered::new(
            AtomicRawPool::<CacheLine>::new(capacity, policy),
            AtomicRawPool::<CacheLine>::new(capacity, policy),
        )),
        (false, StreamWriters::Single) => Box::new(DoubleBuffered::new(
            RawPool::<CacheLine>::new(capacity, policy),
            RawPool::<CacheLine>::new(capacity, policy),
        )),
        (true, StreamWriters::Multi) => Box::new(SingleBuffered::new(
            AtomicRawPool::<CacheLine>::new(capacity, policy),
        )),
        (true, StreamWriters::Single) => Box::new(SingleBuffered::new(RawPool::<CacheLine>::new(
            capacity, policy,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::{Pod, Zeroable};
    use ember_core::{EntityId, Event, Message, TargetKind};

    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Probe {
        value: u32,
    }

    impl Event for Probe {
        const NAME: &'static str = "test/probe";
    }

    impl Message for Probe {
        const NAME: &'static str = "test/probe";
    }

    #[test]
    fn engine_streams_exist_after_build() {
        let registry = StreamRegistry::builder(1024, OverflowPolicy::Fatal).build();
        for stream in EngineStream::ALL {
            let handle = registry.engine(stream);
            assert_eq!(handle.name(), stream.name());
        }
        assert_eq!(registry.len(), EngineStream::ALL.len());
    }

    #[test]
    fn unknown_stream_is_an_error() {
        let registry = StreamRegistry::builder(1024, OverflowPolicy::Fatal).build();
        let name = StreamName::from_name("module/unregistered");
        assert_eq!(
            registry.events(name).err(),
            Some(StreamError::UnknownStream { name })
        );
    }

    #[test]
    fn duplicate_registration_aliases_the_existing_stream() {
        let mut builder = StreamRegistry::builder(1024, OverflowPolicy::Fatal);
        let first = builder.register("module/combat", StreamWriters::Multi);
        let second = builder.register("module/combat", StreamWriters::Single);
        assert_eq!(first, second);
        let registry = builder.build();
        assert_eq!(registry.len(), 1 + EngineStream::ALL.len());
    }

    #[test]
    fn pump_flips_every_stream_in_one_call() {
        let mut builder = StreamRegistry::builder(1024, OverflowPolicy::Fatal);
        let combat = builder.register("module/combat", StreamWriters::Multi);
        let registry = builder.build();

        registry
            .events(combat)
            .unwrap()
            .emit_with::<Probe>(|p| p.value = 1)
            .unwrap();
        registry
            .engine(EngineStream::Game)
            .emit_with::<Probe>(|p| p.value = 2)
            .unwrap();
        assert_eq!(registry.events(combat).unwrap().visible(), 0);

        registry.pump().unwrap();
        assert_eq!(registry.events(combat).unwrap().visible(), 1);
        assert_eq!(registry.engine(EngineStream::Game).visible(), 1);

        registry.pump().unwrap();
        assert_eq!(registry.events(combat).unwrap().visible(), 0);
        assert_eq!(registry.engine(EngineStream::Game).visible(), 0);
    }

    #[test]
    fn command_stream_is_visible_same_frame_and_cleared_by_pump() {
        let registry = StreamRegistry::builder(1024, OverflowPolicy::Fatal).build();
        let commands = registry.engine(EngineStream::Commands);
        commands.emit_with::<Probe>(|p| p.value = 7).unwrap();
        assert_eq!(commands.visible(), 1);

        registry.pump().unwrap();
        assert_eq!(registry.engine(EngineStream::Commands).visible(), 0);
    }

    #[test]
    fn pump_publishes_local_messages() {
        let registry = StreamRegistry::builder(1024, OverflowPolicy::Fatal).build();
        let local = registry.local_messages();
        local
            .publisher()
            .post(EntityId(5), TargetKind::Entity, Probe { value: 11 })
            .unwrap();
        assert!(registry.messages().next().is_none());

        registry.pump().unwrap();
        let view = registry.messages().next().unwrap().unwrap();
        assert_eq!(view.target(), EntityId(5));
        assert_eq!(view.decode::<Probe>().unwrap(), Probe { value: 11 });

        // Next pump retires them.
        registry.pump().unwrap();
        assert!(registry.messages().next().is_none());
    }

    #[test]
    fn capacity_override_applies_by_name() {
        let mut builder = StreamRegistry::builder(1024, OverflowPolicy::Silent)
            .capacity_override("module/tiny", 16);
        let tiny = builder.register("module/tiny", StreamWriters::Single);
        let registry = builder.build();

        let stream = registry.events(tiny).unwrap();
        stream.emit::<Probe>().unwrap();
        // 16 bytes hold exactly one 8-byte header + padded payload.
        assert!(matches!(
            stream.emit::<Probe>(),
            Err(StreamError::Dropped { .. })
        ));
    }
}
