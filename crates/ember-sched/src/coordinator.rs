//! The coordinator: stages, hooks, and the pump compiled into frame
//! graphs.

use std::sync::Arc;

use ember_core::SystemStage;
use ember_stream::StreamRegistry;

use crate::context::TaskContext;
use crate::error::SchedError;
use crate::graph::{GraphBuilder, TaskGraph};
use crate::status::SchedulerStatus;
use crate::system::{SystemFn, SystemRegistry, SystemResult};

fn noop() -> SystemFn {
    Arc::new(|_| Ok(()))
}

/// Owns the per-stage registries and the engine hook slots, and compiles
/// them into the frame graphs the executor runs.
///
/// The frame topology is fixed:
///
/// ```text
/// game-events → scene-events → scripted-behaviors → [GameLogic]
/// [GameLogic] → physics-step          [AIExecute] → [Actions]
/// [GameLogic] → before-update → pump  [Actions] → ai-scripts → pump
/// pump → [Update]    physics-step → [Update]
/// ```
///
/// Stage registrations and hook changes take effect at the next
/// [`rebuild`](Self::rebuild); the engine rebuilds after scene loads.
pub struct Coordinator {
    registry: Arc<StreamRegistry>,
    stages: [SystemRegistry; 4],
    game_events: SystemFn,
    scene_events: SystemFn,
    scripted_behaviors: SystemFn,
    ai_scripts: SystemFn,
    physics_step: SystemFn,
    before_update: SystemFn,
    full: Arc<TaskGraph>,
    pump_only: Arc<TaskGraph>,
}

impl Coordinator {
    /// A coordinator with empty stages and no-op hooks.
    pub fn new(registry: Arc<StreamRegistry>) -> Result<Self, SchedError> {
        let mut coordinator = Self {
            registry,
            stages: [
                SystemRegistry::new(SystemStage::GameLogic),
                SystemRegistry::new(SystemStage::AIExecute),
                SystemRegistry::new(SystemStage::Actions),
                SystemRegistry::new(SystemStage::Update),
            ],
            game_events: noop(),
            scene_events: noop(),
            scripted_behaviors: noop(),
            ai_scripts: noop(),
            physics_step: noop(),
            before_update: noop(),
            full: Arc::new(GraphBuilder::new().build()?),
            pump_only: Arc::new(GraphBuilder::new().build()?),
        };
        coordinator.rebuild()?;
        Ok(coordinator)
    }

    fn stage_index(stage: SystemStage) -> usize {
        match stage {
            SystemStage::GameLogic => 0,
            SystemStage::AIExecute => 1,
            SystemStage::Actions => 2,
            SystemStage::Update => 3,
        }
    }

    /// The registry for `stage`.
    pub fn stage(&self, stage: SystemStage) -> &SystemRegistry {
        &self.stages[Self::stage_index(stage)]
    }

    /// Mutable access for system registration.
    pub fn stage_mut(&mut self, stage: SystemStage) -> &mut SystemRegistry {
        &mut self.stages[Self::stage_index(stage)]
    }

    /// Install the game-event intake hook.
    pub fn set_game_events(
        &mut self,
        run: impl Fn(&TaskContext) -> SystemResult + Send + Sync + 'static,
    ) {
        self.game_events = Arc::new(run);
    }

    /// Install the scene-event intake hook.
    pub fn set_scene_events(
        &mut self,
        run: impl Fn(&TaskContext) -> SystemResult + Send + Sync + 'static,
    ) {
        self.scene_events = Arc::new(run);
    }

    /// Install the scripted-behavior processing hook.
    pub fn set_scripted_behaviors(
        &mut self,
        run: impl Fn(&TaskContext) -> SystemResult + Send + Sync + 'static,
    ) {
        self.scripted_behaviors = Arc::new(run);
    }

    /// Install the AI script hook.
    pub fn set_ai_scripts(
        &mut self,
        run: impl Fn(&TaskContext) -> SystemResult + Send + Sync + 'static,
    ) {
        self.ai_scripts = Arc::new(run);
    }

    /// Install the physics step.
    pub fn set_physics_step(
        &mut self,
        run: impl Fn(&TaskContext) -> SystemResult + Send + Sync + 'static,
    ) {
        self.physics_step = Arc::new(run);
    }

    /// Install the before-update hook (last writer before the pump).
    pub fn set_before_update(
        &mut self,
        run: impl Fn(&TaskContext) -> SystemResult + Send + Sync + 'static,
    ) {
        self.before_update = Arc::new(run);
    }

    /// The graph for a frame in `status`.
    pub fn graph(&self, status: SchedulerStatus) -> Arc<TaskGraph> {
        if status.runs_systems() {
            Arc::clone(&self.full)
        } else {
            Arc::clone(&self.pump_only)
        }
    }

    fn pump_task(&self) -> SystemFn {
        let registry = Arc::clone(&self.registry);
        Arc::new(move |_| {
            registry.pump()?;
            Ok(())
        })
    }

    /// Recompile both frame graphs from the current registrations.
    pub fn rebuild(&mut self) -> Result<(), SchedError> {
        self.full = Arc::new(self.compile_full()?);

        let mut pump_only = GraphBuilder::new();
        pump_only.add("pump", self.pump_task());
        self.pump_only = Arc::new(pump_only.build()?);
        Ok(())
    }

    fn compile_full(&self) -> Result<TaskGraph, SchedError> {
        let mut b = GraphBuilder::new();

        let game_events = b.add("game-events", Arc::clone(&self.game_events));
        let scene_events = b.add("scene-events", Arc::clone(&self.scene_events));
        let scripted = b.add("scripted-behaviors", Arc::clone(&self.scripted_behaviors));
        let physics = b.add("physics-step", Arc::clone(&self.physics_step));
        let before_update = b.add("before-update", Arc::clone(&self.before_update));
        let ai_scripts = b.add("ai-scripts", Arc::clone(&self.ai_scripts));
        let pump = b.add("pump", self.pump_task());

        let (logic_in, logic_out) = add_stage(&mut b, self.stage(SystemStage::GameLogic));
        let (ai_in, ai_out) = add_stage(&mut b, self.stage(SystemStage::AIExecute));
        let (actions_in, actions_out) = add_stage(&mut b, self.stage(SystemStage::Actions));
        let (update_in, _update_out) = add_stage(&mut b, self.stage(SystemStage::Update));

        // Event intake feeds game logic.
        b.add_edge(game_events, scene_events);
        b.add_edge(scene_events, scripted);
        b.add_edge(scripted, logic_in);
        // Game logic precedes physics and the last pre-pump writers.
        b.add_edge(logic_out, physics);
        b.add_edge(logic_out, before_update);
        b.add_edge(before_update, pump);
        // The AI pipeline also finishes before the pump.
        b.add_edge(ai_out, actions_in);
        b.add_edge(actions_out, ai_scripts);
        b.add_edge(ai_scripts, pump);
        // Update observes this frame's pumped traffic and settled physics.
        b.add_edge(pump, update_in);
        b.add_edge(physics, update_in);
        // AI decision-making starts the frame alongside event intake.
        let _ = ai_in;

        b.build()
    }
}

/// Add one stage's systems between a pair of no-op fence tasks, so
/// inter-stage edges stay valid even when the stage is empty.
fn add_stage(b: &mut GraphBuilder, registry: &SystemRegistry) -> (usize, usize) {
    let begin = b.add(&format!("stage:{}:begin", registry.stage()), noop());
    let end = b.add(&format!("stage:{}:end", registry.stage()), noop());
    let nodes = registry.nodes();
    let indices: Vec<usize> = nodes
        .iter()
        .map(|node| b.add(&node.name, Arc::clone(&node.run)))
        .collect();

    let mut has_parent = vec![false; nodes.len()];
    for (i, node) in nodes.iter().enumerate() {
        for &child in &node.children {
            b.add_edge(indices[i], indices[child]);
            has_parent[child] = true;
        }
    }
    for (i, node) in nodes.iter().enumerate() {
        if !has_parent[i] {
            b.add_edge(begin, indices[i]);
        }
        if node.children.is_empty() {
            b.add_edge(indices[i], end);
        }
    }
    if nodes.is_empty() {
        b.add_edge(begin, end);
    }
    (begin, end)
}
