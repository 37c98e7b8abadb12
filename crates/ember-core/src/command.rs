//! Engine command vocabulary carried on the command stream.
//!
//! Commands are ordinary event payloads emitted into the single-buffered
//! command stream and scanned once per frame by the frame loop. The
//! [`EngineCommand`] enum is the decoded form the frame loop acts on.

use bytemuck::{Pod, Zeroable};

use crate::event::Event;
use crate::id::{EventTypeId, StreamName};

/// Request a clean engine exit at the next frame boundary.
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C)]
pub struct EngineExit {}

impl Event for EngineExit {
    const NAME: &'static str = "engine/exit";
}

/// Resume gameplay system execution.
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C)]
pub struct SystemStatusRunning {}

impl Event for SystemStatusRunning {
    const NAME: &'static str = "engine/set-system-status/running";
}

/// Suspend gameplay system execution (events still pump).
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C)]
pub struct SystemStatusStopped {}

impl Event for SystemStatusStopped {
    const NAME: &'static str = "engine/set-system-status/stopped";
}

/// Load a scene by name hash.
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C)]
pub struct SceneLoad {
    /// Name hash of the scene to load.
    pub scene: u32,
    /// Nonzero to swap the staged registry in automatically once loaded.
    pub auto_swap: u32,
}

impl Event for SceneLoad {
    const NAME: &'static str = "scene/load";
}

/// A decoded engine command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineCommand {
    /// Exit the frame loop.
    Exit,
    /// Set scheduler status to running.
    SetStatusRunning,
    /// Set scheduler status to stopped.
    SetStatusStopped,
    /// Load a scene.
    LoadScene {
        /// Name hash of the scene.
        scene: StreamName,
        /// Swap the staged registry in automatically once loaded.
        auto_swap: bool,
    },
}

impl EngineCommand {
    /// Decode a command from an envelope's type id and payload.
    ///
    /// Returns `None` for type ids outside the command vocabulary; the
    /// command stream may carry other traffic the frame loop ignores.
    pub fn decode(type_id: EventTypeId, payload: &[u8]) -> Option<Self> {
        match type_id {
            id if id == EngineExit::TYPE_ID => Some(Self::Exit),
            id if id == SystemStatusRunning::TYPE_ID => Some(Self::SetStatusRunning),
            id if id == SystemStatusStopped::TYPE_ID => Some(Self::SetStatusStopped),
            id if id == SceneLoad::TYPE_ID => {
                // A type-erased push may carry a short payload; skip it
                // rather than panic inside pod_read_unaligned.
                if payload.len() != core::mem::size_of::<SceneLoad>() {
                    return None;
                }
                let load: SceneLoad = bytemuck::pod_read_unaligned(payload);
                Some(Self::LoadScene {
                    scene: StreamName(load.scene),
                    auto_swap: load.auto_swap != 0,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_recognises_the_command_vocabulary() {
        assert_eq!(
            EngineCommand::decode(EngineExit::TYPE_ID, &[]),
            Some(EngineCommand::Exit)
        );
        assert_eq!(
            EngineCommand::decode(SystemStatusRunning::TYPE_ID, &[]),
            Some(EngineCommand::SetStatusRunning)
        );
        assert_eq!(
            EngineCommand::decode(SystemStatusStopped::TYPE_ID, &[]),
            Some(EngineCommand::SetStatusStopped)
        );
    }

    #[test]
    fn decode_scene_load_carries_payload() {
        let payload = SceneLoad {
            scene: 0x1234_5678,
            auto_swap: 1,
        };
        let bytes = bytemuck::bytes_of(&payload);
        assert_eq!(
            EngineCommand::decode(SceneLoad::TYPE_ID, bytes),
            Some(EngineCommand::LoadScene {
                scene: StreamName(0x1234_5678),
                auto_swap: true,
            })
        );
    }

    #[test]
    fn decode_rejects_truncated_scene_load() {
        assert_eq!(EngineCommand::decode(SceneLoad::TYPE_ID, &[1, 2, 3]), None);
    }

    #[test]
    fn decode_ignores_unknown_type_ids() {
        assert_eq!(EngineCommand::decode(EventTypeId(0), &[]), None);
    }
}
