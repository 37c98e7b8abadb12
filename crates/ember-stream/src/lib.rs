//! Typed event streams and targeted message delivery for Ember.
//!
//! Producers emit [`Event`](ember_core::Event) payloads into named streams
//! and post [`Message`](ember_core::Message) payloads through per-thread
//! pools; the once-per-frame [`StreamRegistry::pump`] flips every stream's
//! buffers and aggregates the thread-local messages, so consumers iterate
//! a stable snapshot of last frame's traffic while this frame's producers
//! keep writing.
//!
//! Reading is a lazy validated walk over the envelope bytes: a header that
//! does not fit the remaining buffer, or a payload whose declared type or
//! size disagrees with the consumer's, is a hard error rather than a
//! silent desynchronization.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod event;
pub mod iter;
pub mod local;
pub mod message;
pub mod record;
pub mod registry;

// Public re-exports for the primary API surface.
pub use error::StreamError;
pub use event::EventStream;
pub use iter::{EventIter, EventView, MessageIter, MessageView};
pub use local::{LocalMessagePool, LocalPoolRegistry};
pub use message::MessagePublisher;
pub use registry::{StreamRegistry, StreamRegistryBuilder};
