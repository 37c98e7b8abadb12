//! Binary envelope layout for events and messages.
//!
//! Every record in an event or message pool is a fixed header immediately
//! followed by its payload bytes:
//!
//! ```text
//! event:   [type: u32][size: u32][payload: size bytes]
//! message: [type: u32][target: u32][metadata: u32][payload: meta & 0xff bytes]
//! ```
//!
//! Headers are encoded and decoded field-by-field in native byte order so
//! iteration never depends on the cursor's alignment. An envelope is never
//! split across a reset boundary: a pool always holds whole envelopes from
//! its base to its write cursor.

use crate::id::{EntityId, EventTypeId};

/// Byte length of an encoded [`EventHeader`].
pub const EVENT_HEADER_BYTES: usize = 8;

/// Byte length of an encoded [`MessageHeader`].
pub const MESSAGE_HEADER_BYTES: usize = 12;

/// Header preceding an untargeted broadcast event payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventHeader {
    /// Payload type identifier.
    pub type_id: EventTypeId,
    /// Exact payload length in bytes. Producers must guarantee this matches
    /// the bytes written; iteration validates it against the remaining
    /// buffer rather than trusting it blindly.
    pub size: u32,
}

impl EventHeader {
    /// Encode into the wire layout.
    pub fn encode(&self) -> [u8; EVENT_HEADER_BYTES] {
        let mut out = [0u8; EVENT_HEADER_BYTES];
        out[0..4].copy_from_slice(&self.type_id.0.to_ne_bytes());
        out[4..8].copy_from_slice(&self.size.to_ne_bytes());
        out
    }

    /// Decode from the start of `bytes`. Returns `None` if `bytes` is too
    /// short to hold a header.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < EVENT_HEADER_BYTES {
            return None;
        }
        let type_id = u32::from_ne_bytes(bytes[0..4].try_into().ok()?);
        let size = u32::from_ne_bytes(bytes[4..8].try_into().ok()?);
        Some(Self {
            type_id: EventTypeId(type_id),
            size,
        })
    }
}

/// What a message's 32-bit target key refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetKind {
    /// A single entity id.
    Entity,
    /// A group hash, delivered to every member.
    Group,
    /// A named entity set.
    EntitySet,
    /// A composite target resolved by the consumer.
    Composite,
}

impl TargetKind {
    fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0 => Self::Entity,
            1 => Self::Group,
            2 => Self::EntitySet,
            _ => Self::Composite,
        }
    }

    fn bits(self) -> u32 {
        match self {
            Self::Entity => 0,
            Self::Group => 1,
            Self::EntitySet => 2,
            Self::Composite => 3,
        }
    }
}

/// Packed metadata word of a message envelope.
///
/// Bit layout, most significant first:
///
/// ```text
/// TT F xxxxx CCCCCCCCCCCCCCCC SSSSSSSS
/// ```
///
/// - `T` (bits 30–31): [`TargetKind`]
/// - `F` (bit 29): category filtering enabled
/// - `C` (bits 8–23): 16-bit category bitmask
/// - `S` (bits 0–7): payload length in bytes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageMeta(pub u32);

const KIND_SHIFT: u32 = 30;
const FILTER_BIT: u32 = 1 << 29;
const CATEGORY_SHIFT: u32 = 8;
const CATEGORY_MASK: u32 = 0x00ff_ff00;
const SIZE_MASK: u32 = 0x0000_00ff;

impl MessageMeta {
    /// Pack an unfiltered metadata word.
    pub fn new(kind: TargetKind, payload_len: u8) -> Self {
        Self((kind.bits() << KIND_SHIFT) | u32::from(payload_len))
    }

    /// Pack a category-filtered metadata word.
    pub fn filtered(kind: TargetKind, category_mask: u16, payload_len: u8) -> Self {
        Self(
            (kind.bits() << KIND_SHIFT)
                | FILTER_BIT
                | (u32::from(category_mask) << CATEGORY_SHIFT)
                | u32::from(payload_len),
        )
    }

    /// The target kind encoded in bits 30–31.
    pub fn target_kind(self) -> TargetKind {
        TargetKind::from_bits(self.0 >> KIND_SHIFT)
    }

    /// Whether category filtering is enabled (bit 29).
    pub fn is_filtered(self) -> bool {
        self.0 & FILTER_BIT != 0
    }

    /// The 16-bit category bitmask (bits 8–23).
    pub fn category_mask(self) -> u16 {
        ((self.0 & CATEGORY_MASK) >> CATEGORY_SHIFT) as u16
    }

    /// Payload length in bytes (bits 0–7).
    pub fn payload_len(self) -> u8 {
        (self.0 & SIZE_MASK) as u8
    }

    /// Whether a consumer subscribed to `categories` should receive this
    /// message. Unfiltered messages go to everyone; filtered messages
    /// require at least one overlapping category bit.
    pub fn matches(self, categories: u16) -> bool {
        !self.is_filtered() || (self.category_mask() & categories) != 0
    }
}

/// Header preceding a targeted message payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageHeader {
    /// Payload type identifier.
    pub type_id: EventTypeId,
    /// Routing key: entity id or group hash, interpreted per
    /// [`MessageMeta::target_kind`].
    pub target: EntityId,
    /// Packed flags, category bitmask, and payload size.
    pub meta: MessageMeta,
}

impl MessageHeader {
    /// Encode into the wire layout.
    pub fn encode(&self) -> [u8; MESSAGE_HEADER_BYTES] {
        let mut out = [0u8; MESSAGE_HEADER_BYTES];
        out[0..4].copy_from_slice(&self.type_id.0.to_ne_bytes());
        out[4..8].copy_from_slice(&self.target.0.to_ne_bytes());
        out[8..12].copy_from_slice(&self.meta.0.to_ne_bytes());
        out
    }

    /// Decode from the start of `bytes`. Returns `None` if `bytes` is too
    /// short to hold a header.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < MESSAGE_HEADER_BYTES {
            return None;
        }
        let type_id = u32::from_ne_bytes(bytes[0..4].try_into().ok()?);
        let target = u32::from_ne_bytes(bytes[4..8].try_into().ok()?);
        let meta = u32::from_ne_bytes(bytes[8..12].try_into().ok()?);
        Some(Self {
            type_id: EventTypeId(type_id),
            target: EntityId(target),
            meta: MessageMeta(meta),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn event_header_round_trip() {
        let hdr = EventHeader {
            type_id: EventTypeId(0xdead_beef),
            size: 24,
        };
        let bytes = hdr.encode();
        assert_eq!(EventHeader::decode(&bytes), Some(hdr));
    }

    #[test]
    fn event_header_decode_rejects_short_input() {
        assert_eq!(EventHeader::decode(&[0u8; 7]), None);
    }

    #[test]
    fn message_meta_packs_all_fields() {
        let meta = MessageMeta::filtered(TargetKind::Group, 0b1010_0000_0000_0001, 62);
        assert_eq!(meta.target_kind(), TargetKind::Group);
        assert!(meta.is_filtered());
        assert_eq!(meta.category_mask(), 0b1010_0000_0000_0001);
        assert_eq!(meta.payload_len(), 62);
    }

    #[test]
    fn unfiltered_meta_matches_everything() {
        let meta = MessageMeta::new(TargetKind::Entity, 8);
        assert!(!meta.is_filtered());
        assert!(meta.matches(0));
        assert!(meta.matches(0xffff));
    }

    #[test]
    fn filtered_meta_requires_category_overlap() {
        let meta = MessageMeta::filtered(TargetKind::Entity, 0b0100, 8);
        assert!(meta.matches(0b0100));
        assert!(meta.matches(0b0110));
        assert!(!meta.matches(0b0010));
        assert!(!meta.matches(0));
    }

    #[test]
    fn message_header_round_trip() {
        let hdr = MessageHeader {
            type_id: EventTypeId(7),
            target: EntityId(42),
            meta: MessageMeta::new(TargetKind::EntitySet, 16),
        };
        let bytes = hdr.encode();
        assert_eq!(MessageHeader::decode(&bytes), Some(hdr));
    }

    proptest! {
        #[test]
        fn meta_round_trips_arbitrary_fields(
            kind in 0u32..4,
            mask: u16,
            len: u8,
        ) {
            let kind = TargetKind::from_bits(kind);
            let meta = MessageMeta::filtered(kind, mask, len);
            prop_assert_eq!(meta.target_kind(), kind);
            prop_assert_eq!(meta.category_mask(), mask);
            prop_assert_eq!(meta.payload_len(), len);
        }
    }
}
