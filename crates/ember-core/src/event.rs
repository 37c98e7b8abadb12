//! Payload traits for typed event and message emission.
//!
//! A payload type declares a stable name; its [`EventTypeId`] is the FNV-1a
//! hash of that name, computed at compile time. The `Pod` bound guarantees
//! the payload is trivially copyable with no padding or pointers, so it can
//! be constructed in place inside an arena and read back zero-copy.

use bytemuck::Pod;

use crate::id::EventTypeId;

/// Maximum payload size of a targeted message, fixed by the 8-bit size
/// field in the message metadata word.
pub const MAX_MESSAGE_PAYLOAD: usize = 255;

/// An untargeted broadcast event payload.
///
/// # Example
///
/// ```
/// use bytemuck::{Pod, Zeroable};
/// use ember_core::event::Event;
///
/// #[derive(Clone, Copy, Pod, Zeroable)]
/// #[repr(C)]
/// struct CollisionStarted {
///     a: u32,
///     b: u32,
/// }
///
/// impl Event for CollisionStarted {
///     const NAME: &'static str = "physics/collision-started";
/// }
///
/// assert_eq!(
///     CollisionStarted::TYPE_ID,
///     ember_core::EventTypeId::from_name("physics/collision-started"),
/// );
/// ```
pub trait Event: Pod {
    /// Stable declared name, hashed into [`Event::TYPE_ID`].
    const NAME: &'static str;

    /// Type identifier stored in the envelope header.
    const TYPE_ID: EventTypeId = EventTypeId::from_name(Self::NAME);
}

/// An entity- or group-targeted message payload.
///
/// Message payloads must fit the envelope's 8-bit size field
/// ([`MAX_MESSAGE_PAYLOAD`] bytes); the publisher rejects larger types at
/// the call site. Messages are copied from thread-local pools into the
/// global pool every frame, so payloads stay small.
pub trait Message: Pod {
    /// Stable declared name, hashed into [`Message::TYPE_ID`].
    const NAME: &'static str;

    /// Type identifier stored in the envelope header.
    const TYPE_ID: EventTypeId = EventTypeId::from_name(Self::NAME);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::Zeroable;

    #[derive(Clone, Copy, Pod, Zeroable)]
    #[repr(C)]
    struct Ping {
        seq: u32,
    }

    impl Event for Ping {
        const NAME: &'static str = "test/ping";
    }

    impl Message for Ping {
        const NAME: &'static str = "test/ping";
    }

    #[test]
    fn type_id_defaults_to_hashed_name() {
        assert_eq!(
            <Ping as Event>::TYPE_ID,
            EventTypeId::from_name("test/ping")
        );
        assert_eq!(<Ping as Event>::TYPE_ID, <Ping as Message>::TYPE_ID);
    }
}
