//! Fixed vocabularies: pipeline stages, writer cardinality, engine streams.

use std::fmt;

use crate::id::StreamName;

/// Pipeline stage into which gameplay systems are registered.
///
/// Stages are scheduled by the coordinator graph in a fixed topology;
/// systems within a stage are ordered only by their declared dependencies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SystemStage {
    /// Game-logic systems, run after scripted behaviors.
    GameLogic,
    /// AI decision systems.
    AIExecute,
    /// Application of AI-chosen actions.
    Actions,
    /// State-update systems, run after the event pump.
    Update,
}

impl SystemStage {
    /// All stages in scheduling order.
    pub const ALL: [SystemStage; 4] = [
        SystemStage::GameLogic,
        SystemStage::AIExecute,
        SystemStage::Actions,
        SystemStage::Update,
    ];
}

impl fmt::Display for SystemStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GameLogic => "game-logic",
            Self::AIExecute => "ai-execute",
            Self::Actions => "actions",
            Self::Update => "update",
        };
        f.write_str(name)
    }
}

/// Writer cardinality of a stream, chosen at stream creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamWriters {
    /// One serialized producer. Non-atomic write cursor; the engine must
    /// guarantee pushes never race (e.g. only the simulation thread emits).
    Single,
    /// Arbitrary concurrent producers, at the cost of one atomic increment
    /// per push.
    Multi,
}

/// Engine-owned streams reachable through a fixed enumeration in addition
/// to the named registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineStream {
    /// Engine control commands. Single-buffered: commands are visible the
    /// same frame they are emitted.
    Commands,
    /// Game-state events.
    Game,
    /// Scene lifecycle events.
    Scene,
    /// Input device events. Single-buffered for zero-frame latency.
    Input,
    /// Resource-loader completion events.
    Resources,
}

impl EngineStream {
    /// All engine streams, in registration order.
    pub const ALL: [EngineStream; 5] = [
        EngineStream::Commands,
        EngineStream::Game,
        EngineStream::Scene,
        EngineStream::Input,
        EngineStream::Resources,
    ];

    /// The stream's declared name.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Commands => "engine/commands",
            Self::Game => "engine/game",
            Self::Scene => "engine/scene",
            Self::Input => "engine/input",
            Self::Resources => "engine/resources",
        }
    }

    /// The stream's registry name.
    pub const fn name(self) -> StreamName {
        StreamName::from_name(self.label())
    }

    /// Whether the stream is single-buffered (same-frame visibility).
    pub const fn single_buffered(self) -> bool {
        matches!(self, Self::Commands | Self::Input)
    }
}
