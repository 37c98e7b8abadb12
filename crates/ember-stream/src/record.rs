//! Envelope record layout inside the byte arenas.
//!
//! Event records are padded to 8-byte multiples so that, on an arena whose
//! base is cache-line aligned, every payload starts 8-aligned and supports
//! zero-copy typed access. Message records are padded to 4 bytes only:
//! message payloads are always decoded by copy, so natural `u32` spacing
//! is enough.

use ember_core::{EventHeader, EventTypeId, MessageHeader, EVENT_HEADER_BYTES, MESSAGE_HEADER_BYTES};
use ember_pool::{BytePool, PoolError};

/// Event payloads start on this boundary within an arena.
pub const EVENT_PAYLOAD_ALIGN: usize = 8;

const fn padded(len: u32, align: u32) -> u32 {
    (len + align - 1) & !(align - 1)
}

/// Total arena bytes for an event record with `payload_len` payload bytes.
pub const fn event_record_len(payload_len: u32) -> u32 {
    EVENT_HEADER_BYTES as u32 + padded(payload_len, EVENT_PAYLOAD_ALIGN as u32)
}

/// Total arena bytes for a message record with `payload_len` payload bytes.
pub const fn message_record_len(payload_len: u32) -> u32 {
    MESSAGE_HEADER_BYTES as u32 + padded(payload_len, 4)
}

/// Write an event envelope, returning the zeroed payload region.
///
/// `Ok(None)` means the arena's policy shed the record.
pub fn write_event<'a>(
    pool: &'a dyn BytePool,
    type_id: EventTypeId,
    payload_len: u32,
) -> Result<Option<&'a mut [u8]>, PoolError> {
    let Some(region) = pool.alloc(event_record_len(payload_len))? else {
        return Ok(None);
    };
    let (header, rest) = region.split_at_mut(EVENT_HEADER_BYTES);
    header.copy_from_slice(
        &EventHeader {
            type_id,
            size: payload_len,
        }
        .encode(),
    );
    let (payload, pad) = rest.split_at_mut(payload_len as usize);
    payload.fill(0);
    pad.fill(0);
    Ok(Some(payload))
}

/// Write a message envelope with its payload bytes.
///
/// `header.meta` must already declare `payload.len()`; `Ok(None)` means
/// the arena's policy shed the record.
pub fn write_message(
    pool: &dyn BytePool,
    header: MessageHeader,
    payload: &[u8],
) -> Result<Option<()>, PoolError> {
    debug_assert_eq!(header.meta.payload_len() as usize, payload.len());
    let Some(region) = pool.alloc(message_record_len(payload.len() as u32))? else {
        return Ok(None);
    };
    let (head, rest) = region.split_at_mut(MESSAGE_HEADER_BYTES);
    head.copy_from_slice(&header.encode());
    let (body, pad) = rest.split_at_mut(payload.len());
    body.copy_from_slice(payload);
    pad.fill(0);
    Ok(Some(()))
}
