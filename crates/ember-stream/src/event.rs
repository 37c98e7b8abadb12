//! The typed event emission facade.

use std::mem;

use ember_core::{Event, EventTypeId, StreamName};
use ember_pool::StreamBuffer;

use crate::error::StreamError;
use crate::iter::EventIter;
use crate::record::{write_event, EVENT_PAYLOAD_ALIGN};

/// Handle to one named stream, borrowed from the registry.
///
/// Emission goes to the stream's write buffer; [`read`](Self::read) walks
/// the buffer the last pump made visible. For double-buffered streams the
/// two never alias, so holding a read walk while emitting is fine. The
/// handle is `Copy`: look it up once per system invocation and pass it
/// around freely.
#[derive(Clone, Copy)]
pub struct EventStream<'r> {
    name: StreamName,
    buffer: &'r dyn StreamBuffer,
}

impl<'r> EventStream<'r> {
    pub(crate) fn new(name: StreamName, buffer: &'r dyn StreamBuffer) -> Self {
        Self { name, buffer }
    }

    /// The stream's registry name.
    pub fn name(&self) -> StreamName {
        self.name
    }

    /// Claim a zeroed `E` in the write buffer and fill it in place.
    ///
    /// [`StreamError::Dropped`] is non-fatal: the buffer is full and its
    /// policy sheds traffic. Pool errors mean the policy is fatal and the
    /// frame should fail.
    pub fn emit<E: Event>(&self) -> Result<&'r mut E, StreamError> {
        const {
            assert!(
                mem::align_of::<E>() <= EVENT_PAYLOAD_ALIGN,
                "event payloads may not require more than 8-byte alignment"
            )
        }
        match write_event(self.buffer.write(), E::TYPE_ID, mem::size_of::<E>() as u32)? {
            Some(payload) => bytemuck::try_from_bytes_mut(payload)
                .map_err(|_| StreamError::Misaligned { type_id: E::TYPE_ID }),
            None => Err(StreamError::Dropped { type_id: E::TYPE_ID }),
        }
    }

    /// Emit an `E` built by `fill`.
    pub fn emit_with<E: Event>(&self, fill: impl FnOnce(&mut E)) -> Result<(), StreamError> {
        let slot = self.emit::<E>()?;
        fill(slot);
        Ok(())
    }

    /// Type-erased emission for producers that carry their own type ids
    /// (scripting runtimes, network ingest).
    pub fn push(&self, type_id: EventTypeId, payload: &[u8]) -> Result<(), StreamError> {
        match write_event(self.buffer.write(), type_id, payload.len() as u32)? {
            Some(region) => {
                region.copy_from_slice(payload);
                Ok(())
            }
            None => Err(StreamError::Dropped { type_id }),
        }
    }

    /// Walk the events the last pump made visible.
    pub fn read(&self) -> EventIter<'r> {
        EventIter::new(self.buffer.read().bytes())
    }

    /// Number of visible events.
    pub fn visible(&self) -> u32 {
        self.buffer.read().count()
    }
}
