//! Lazy validated iteration over envelope bytes.

use std::mem;

use ember_core::{
    EntityId, Event, EventHeader, EventTypeId, Message, MessageHeader, MessageMeta,
    EVENT_HEADER_BYTES, MESSAGE_HEADER_BYTES,
};

use crate::error::StreamError;
use crate::record::{message_record_len, EVENT_PAYLOAD_ALIGN};

/// One event envelope, borrowed from its arena.
#[derive(Clone, Copy, Debug)]
pub struct EventView<'a> {
    header: EventHeader,
    payload: &'a [u8],
}

impl<'a> EventView<'a> {
    /// The envelope's type id.
    pub fn type_id(&self) -> EventTypeId {
        self.header.type_id
    }

    /// The raw payload bytes.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Whether this envelope carries an `E`.
    pub fn is<E: Event>(&self) -> bool {
        self.header.type_id == E::TYPE_ID
    }

    /// Zero-copy typed access to the payload.
    ///
    /// Type and size are validated against `E`; disagreement is a hard
    /// error because it means producer and consumer were compiled against
    /// different payload definitions.
    pub fn decode<E: Event>(&self) -> Result<&'a E, StreamError> {
        if self.header.type_id != E::TYPE_ID {
            return Err(StreamError::TypeMismatch {
                expected: E::TYPE_ID,
                found: self.header.type_id,
            });
        }
        if self.header.size as usize != mem::size_of::<E>() {
            return Err(StreamError::SizeMismatch {
                type_id: self.header.type_id,
                expected: mem::size_of::<E>(),
                found: self.header.size as usize,
            });
        }
        bytemuck::try_from_bytes(self.payload).map_err(|_| StreamError::Misaligned {
            type_id: E::TYPE_ID,
        })
    }
}

/// Lazy walk over event envelopes.
///
/// Yields `Err` and terminates if the buffer ends mid-envelope; a
/// well-formed arena never triggers this, but the walk refuses to
/// desynchronize on a corrupt one.
#[derive(Clone, Debug)]
pub struct EventIter<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> EventIter<'a> {
    /// Walk the envelopes stored in `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }
}

impl<'a> Iterator for EventIter<'a> {
    type Item = Result<EventView<'a>, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.bytes.len() {
            return None;
        }
        let offset = self.offset;
        let rest = &self.bytes[offset..];
        let Some(header) = EventHeader::decode(rest) else {
            self.offset = self.bytes.len();
            return Some(Err(StreamError::Truncated { offset }));
        };
        // The size field is untrusted; the span is computed in `usize`
        // with checked arithmetic so a corrupt header cannot wrap it.
        let record = (header.size as usize)
            .checked_next_multiple_of(EVENT_PAYLOAD_ALIGN)
            .and_then(|padded| padded.checked_add(EVENT_HEADER_BYTES));
        let record = match record {
            Some(record) if record <= rest.len() => record,
            _ => {
                self.offset = self.bytes.len();
                return Some(Err(StreamError::Truncated { offset }));
            }
        };
        self.offset += record;
        Some(Ok(EventView {
            header,
            payload: &rest[EVENT_HEADER_BYTES..EVENT_HEADER_BYTES + header.size as usize],
        }))
    }
}

/// One message envelope, borrowed from its arena.
#[derive(Clone, Copy, Debug)]
pub struct MessageView<'a> {
    header: MessageHeader,
    payload: &'a [u8],
}

impl<'a> MessageView<'a> {
    /// The envelope's type id.
    pub fn type_id(&self) -> EventTypeId {
        self.header.type_id
    }

    /// The routing key, interpreted per [`MessageMeta::target_kind`].
    pub fn target(&self) -> EntityId {
        self.header.target
    }

    /// The packed metadata word.
    pub fn meta(&self) -> MessageMeta {
        self.header.meta
    }

    /// Whether a consumer subscribed to `categories` should receive this.
    pub fn matches(&self, categories: u16) -> bool {
        self.header.meta.matches(categories)
    }

    /// Whether this envelope carries an `M`.
    pub fn is<M: Message>(&self) -> bool {
        self.header.type_id == M::TYPE_ID
    }

    /// Decode the payload by copy.
    ///
    /// Message payloads are small (≤ 255 bytes) and cross thread-local
    /// pool boundaries, so they are read by value rather than zero-copy.
    pub fn decode<M: Message>(&self) -> Result<M, StreamError> {
        if self.header.type_id != M::TYPE_ID {
            return Err(StreamError::TypeMismatch {
                expected: M::TYPE_ID,
                found: self.header.type_id,
            });
        }
        if self.payload.len() != mem::size_of::<M>() {
            return Err(StreamError::SizeMismatch {
                type_id: self.header.type_id,
                expected: mem::size_of::<M>(),
                found: self.payload.len(),
            });
        }
        Ok(bytemuck::pod_read_unaligned(self.payload))
    }
}

/// Lazy walk over message envelopes; same termination contract as
/// [`EventIter`].
#[derive(Clone, Debug)]
pub struct MessageIter<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> MessageIter<'a> {
    /// Walk the envelopes stored in `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }
}

impl<'a> Iterator for MessageIter<'a> {
    type Item = Result<MessageView<'a>, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.bytes.len() {
            return None;
        }
        let offset = self.offset;
        let rest = &self.bytes[offset..];
        let Some(header) = MessageHeader::decode(rest) else {
            self.offset = self.bytes.len();
            return Some(Err(StreamError::Truncated { offset }));
        };
        let payload_len = header.meta.payload_len() as usize;
        let record = message_record_len(payload_len as u32) as usize;
        if record > rest.len() {
            self.offset = self.bytes.len();
            return Some(Err(StreamError::Truncated { offset }));
        }
        self.offset += record;
        Some(Ok(MessageView {
            header,
            payload: &rest[MESSAGE_HEADER_BYTES..MESSAGE_HEADER_BYTES + payload_len],
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::{Pod, Zeroable};
    use ember_core::TargetKind;
    use ember_pool::{BytePool, NoAlign, OverflowPolicy, RawPool};

    use crate::record::{write_event, write_message};

    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Hit {
        damage: u32,
        source: u32,
    }

    impl Event for Hit {
        const NAME: &'static str = "test/hit";
    }

    impl Message for Hit {
        const NAME: &'static str = "test/hit";
    }

    #[test]
    fn event_walk_yields_records_in_order() {
        let pool = RawPool::<NoAlign>::new(256, OverflowPolicy::Fatal);
        for damage in [3u32, 5, 7] {
            let payload = write_event(&pool, <Hit as Event>::TYPE_ID, 8)
                .unwrap()
                .unwrap();
            payload.copy_from_slice(bytemuck::bytes_of(&Hit { damage, source: 1 }));
        }

        let decoded: Vec<u32> = EventIter::new(pool.bytes())
            .map(|view| view.unwrap().decode::<Hit>().unwrap().damage)
            .collect();
        assert_eq!(decoded, vec![3, 5, 7]);
    }

    #[test]
    fn event_decode_rejects_wrong_type_and_size() {
        let pool = RawPool::<NoAlign>::new(64, OverflowPolicy::Fatal);
        write_event(&pool, EventTypeId(0xbad), 8).unwrap().unwrap();

        let view = EventIter::new(pool.bytes()).next().unwrap().unwrap();
        assert!(matches!(
            view.decode::<Hit>(),
            Err(StreamError::TypeMismatch { .. })
        ));

        let pool = RawPool::<NoAlign>::new(64, OverflowPolicy::Fatal);
        write_event(&pool, <Hit as Event>::TYPE_ID, 4)
            .unwrap()
            .unwrap();
        let view = EventIter::new(pool.bytes()).next().unwrap().unwrap();
        assert!(matches!(
            view.decode::<Hit>(),
            Err(StreamError::SizeMismatch {
                expected: 8,
                found: 4,
                ..
            })
        ));
    }

    #[test]
    fn truncated_buffer_terminates_with_an_error() {
        // A header declaring more payload than the buffer holds.
        let header = EventHeader {
            type_id: EventTypeId(1),
            size: 64,
        };
        let mut bytes = header.encode().to_vec();
        bytes.extend_from_slice(&[0; 8]);

        let mut iter = EventIter::new(&bytes);
        assert!(matches!(
            iter.next(),
            Some(Err(StreamError::Truncated { offset: 0 }))
        ));
        assert!(iter.next().is_none());
    }

    #[test]
    fn near_max_size_field_is_an_error_not_a_panic() {
        // Padding a size near u32::MAX would wrap if computed in u32.
        let header = EventHeader {
            type_id: EventTypeId(1),
            size: u32::MAX - 4,
        };
        let mut bytes = header.encode().to_vec();
        bytes.extend_from_slice(&[0; 8]);

        let mut iter = EventIter::new(&bytes);
        assert!(matches!(
            iter.next(),
            Some(Err(StreamError::Truncated { offset: 0 }))
        ));
        assert!(iter.next().is_none());
    }

    #[test]
    fn dangling_header_bytes_are_an_error() {
        let mut iter = EventIter::new(&[1, 2, 3]);
        assert!(matches!(
            iter.next(),
            Some(Err(StreamError::Truncated { offset: 0 }))
        ));
        assert!(iter.next().is_none());
    }

    #[test]
    fn message_walk_preserves_routing_and_payload() {
        let pool = RawPool::<NoAlign>::new(256, OverflowPolicy::Fatal);
        let hit = Hit {
            damage: 9,
            source: 2,
        };
        let header = MessageHeader {
            type_id: <Hit as Message>::TYPE_ID,
            target: EntityId(42),
            meta: MessageMeta::filtered(TargetKind::Group, 0b0011, 8),
        };
        write_message(&pool, header, bytemuck::bytes_of(&hit))
            .unwrap()
            .unwrap();

        let view = MessageIter::new(pool.bytes()).next().unwrap().unwrap();
        assert_eq!(view.target(), EntityId(42));
        assert_eq!(view.meta().target_kind(), TargetKind::Group);
        assert!(view.matches(0b0001));
        assert!(!view.matches(0b0100));
        assert_eq!(view.decode::<Hit>().unwrap(), hit);
    }

    #[test]
    fn empty_buffer_is_an_empty_walk() {
        assert!(EventIter::new(&[]).next().is_none());
        assert!(MessageIter::new(&[]).next().is_none());
    }
}
