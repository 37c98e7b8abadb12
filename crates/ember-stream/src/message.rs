//! The targeted message posting facade.

use std::mem;

use ember_core::{EntityId, Message, MessageHeader, MessageMeta, TargetKind, MAX_MESSAGE_PAYLOAD};
use ember_pool::BytePool;

use crate::error::StreamError;
use crate::record::write_message;

/// Posts targeted messages into a byte arena.
///
/// Systems normally obtain one from their thread's
/// [`LocalMessagePool`](crate::LocalMessagePool) so posting is lock-free;
/// the pump copies the local records into the global message pool at the
/// frame boundary.
#[derive(Clone, Copy)]
pub struct MessagePublisher<'p> {
    pool: &'p dyn BytePool,
}

impl<'p> MessagePublisher<'p> {
    pub(crate) fn new(pool: &'p dyn BytePool) -> Self {
        Self { pool }
    }

    /// Post `value` to `target`, delivered to every subscriber.
    pub fn post<M: Message>(
        &self,
        target: EntityId,
        kind: TargetKind,
        value: M,
    ) -> Result<(), StreamError> {
        self.write(
            target,
            MessageMeta::new(kind, Self::payload_len::<M>()),
            value,
        )
    }

    /// Post `value` to `target`, delivered only to subscribers whose
    /// category mask overlaps `categories`.
    pub fn post_filtered<M: Message>(
        &self,
        target: EntityId,
        kind: TargetKind,
        categories: u16,
        value: M,
    ) -> Result<(), StreamError> {
        self.write(
            target,
            MessageMeta::filtered(kind, categories, Self::payload_len::<M>()),
            value,
        )
    }

    /// The payload length of `M`, checked against the envelope's 8-bit
    /// size field at compile time.
    const fn payload_len<M: Message>() -> u8 {
        const {
            assert!(
                mem::size_of::<M>() <= MAX_MESSAGE_PAYLOAD,
                "message payloads are limited to 255 bytes by the envelope size field"
            )
        }
        mem::size_of::<M>() as u8
    }

    fn write<M: Message>(
        &self,
        target: EntityId,
        meta: MessageMeta,
        value: M,
    ) -> Result<(), StreamError> {
        let header = MessageHeader {
            type_id: M::TYPE_ID,
            target,
            meta,
        };
        match write_message(self.pool, header, bytemuck::bytes_of(&value))? {
            Some(()) => Ok(()),
            None => Err(StreamError::Dropped { type_id: M::TYPE_ID }),
        }
    }
}
