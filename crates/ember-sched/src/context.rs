//! The per-thread context handed to every task.

use std::sync::Arc;

use ember_core::{EngineStream, StreamName};
use ember_stream::{
    EventStream, LocalMessagePool, MessageIter, MessagePublisher, StreamError, StreamRegistry,
};

/// Everything a task may touch: the stream registry and the calling
/// thread's message pool.
///
/// One context exists per worker thread, built when the worker starts.
/// Tasks never share a context across threads, which is what makes the
/// message post path lock-free.
pub struct TaskContext {
    registry: Arc<StreamRegistry>,
    local: Arc<LocalMessagePool>,
}

impl TaskContext {
    /// Build the context for the calling thread.
    pub fn new(registry: Arc<StreamRegistry>) -> Self {
        let local = registry.local_messages();
        Self { registry, local }
    }

    /// Handle to the stream registered under `name`.
    pub fn events(&self, name: StreamName) -> Result<EventStream<'_>, StreamError> {
        self.registry.events(name)
    }

    /// Handle to an engine stream.
    pub fn engine(&self, stream: EngineStream) -> EventStream<'_> {
        self.registry.engine(stream)
    }

    /// Post targeted messages through this thread's pool.
    pub fn post(&self) -> MessagePublisher<'_> {
        self.local.publisher()
    }

    /// Walk the messages the last pump made visible.
    pub fn messages(&self) -> MessageIter<'_> {
        self.registry.messages()
    }

    /// The underlying registry.
    pub fn registry(&self) -> &StreamRegistry {
        &self.registry
    }
}
