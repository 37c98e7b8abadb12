//! The engine and its frame loop.

use std::error::Error;
use std::sync::Arc;

use ember_core::{EngineCommand, EngineStream, StreamName};
use ember_sched::{default_worker_count, Coordinator, Executor, SchedulerStatus};
use ember_stream::{StreamRegistry, StreamRegistryBuilder};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::handoff::Renderer;
use crate::loader::{LoadJob, LoaderPool, ResourceLoadFailed, ResourceLoaded};

/// What a frame decided about the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Keep running.
    Continue,
    /// An exit command was processed; the loop should end.
    Exit,
}

/// Installed hook that loads a scene: registers and removes systems on
/// the coordinator, optionally swapping staged state in immediately.
pub type SceneLoader = Box<
    dyn FnMut(&mut Coordinator, StreamName, bool) -> Result<(), Box<dyn Error + Send + Sync>>
        + Send,
>;

/// The assembled engine.
///
/// Owns the stream registry, the coordinator and executor, the loader
/// pool, and (optionally) the renderer thread. One [`run_frame`] call is
/// one frame:
///
/// 1. drain loader completions into the resources stream,
/// 2. scan the command stream for the engine vocabulary,
/// 3. execute the frame graph (which contains the pump),
/// 4. hand the frame to the renderer.
///
/// [`run_frame`]: Self::run_frame
pub struct Engine {
    registry: Arc<StreamRegistry>,
    coordinator: Coordinator,
    executor: Executor,
    loaders: LoaderPool,
    renderer: Option<Renderer>,
    scene_loader: Option<SceneLoader>,
    status: SchedulerStatus,
    outstanding_loads: usize,
    exit_requested: bool,
}

impl Engine {
    /// Build an engine from `config` with only the engine streams.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_streams(config, |_| {})
    }

    /// Build an engine, letting `setup` register module streams before
    /// the registry freezes.
    pub fn with_streams(
        config: EngineConfig,
        setup: impl FnOnce(&mut StreamRegistryBuilder),
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let mut builder =
            StreamRegistry::builder(config.default_stream_capacity, config.overflow_policy)
                .message_capacity(config.message_capacity)
                .local_capacity(config.local_capacity);
        for (name, capacity) in &config.stream_overrides {
            builder = builder.capacity_override(name, *capacity);
        }
        setup(&mut builder);
        let registry = Arc::new(builder.build());

        let coordinator = Coordinator::new(Arc::clone(&registry))?;
        let workers = config.worker_threads.unwrap_or_else(default_worker_count);
        let executor = Executor::new(Arc::clone(&registry), workers)?;
        let loaders = LoaderPool::new(config.loader_threads, config.loader_queue)?;

        Ok(Self {
            registry,
            coordinator,
            executor,
            loaders,
            renderer: None,
            scene_loader: None,
            status: SchedulerStatus::Running,
            outstanding_loads: 0,
            exit_requested: false,
        })
    }

    /// The shared stream registry.
    pub fn registry(&self) -> &Arc<StreamRegistry> {
        &self.registry
    }

    /// The coordinator, for system registration during setup. Call
    /// [`Coordinator::rebuild`] (or load a scene) after changing it.
    pub fn coordinator_mut(&mut self) -> &mut Coordinator {
        &mut self.coordinator
    }

    /// Current scheduler status.
    pub fn status(&self) -> SchedulerStatus {
        self.status
    }

    /// Install the scene-load hook.
    pub fn set_scene_loader(&mut self, loader: SceneLoader) {
        self.scene_loader = Some(loader);
    }

    /// Spawn the renderer thread; `prep` runs once per frame during the
    /// handoff window.
    pub fn attach_renderer(
        &mut self,
        prep: impl FnMut() + Send + 'static,
    ) -> Result<(), EngineError> {
        self.renderer = Some(Renderer::spawn(prep)?);
        Ok(())
    }

    /// Queue a background load. The scheduler drops to `Loading` until
    /// every outstanding load has completed.
    pub fn submit_load(&mut self, job: LoadJob) -> Result<(), EngineError> {
        self.loaders.submit(job)?;
        self.outstanding_loads += 1;
        if self.status == SchedulerStatus::Running {
            self.status = SchedulerStatus::Loading;
        }
        Ok(())
    }

    /// Run frames until an exit command or a failure.
    pub fn run(&mut self) -> Result<(), EngineError> {
        loop {
            match self.run_frame()? {
                FrameOutcome::Continue => {}
                FrameOutcome::Exit => break,
            }
        }
        // Stop the renderer here so its thread joins before we return.
        self.renderer = None;
        Ok(())
    }

    /// Run one frame.
    pub fn run_frame(&mut self) -> Result<FrameOutcome, EngineError> {
        self.poll_loaders()?;
        self.process_commands()?;
        if self.exit_requested {
            return Ok(FrameOutcome::Exit);
        }
        let graph = self.coordinator.graph(self.status);
        if !self.executor.execute(&graph) {
            return Err(EngineError::FrameFailed);
        }
        if let Some(renderer) = &self.renderer {
            renderer.hand_off();
        }
        Ok(FrameOutcome::Continue)
    }

    fn poll_loaders(&mut self) -> Result<(), EngineError> {
        for completion in self.loaders.poll() {
            self.outstanding_loads = self.outstanding_loads.saturating_sub(1);
            let resources = self.registry.engine(EngineStream::Resources);
            if completion.ok {
                resources.emit_with::<ResourceLoaded>(|e| e.resource = completion.resource)?;
            } else {
                resources.emit_with::<ResourceLoadFailed>(|e| e.resource = completion.resource)?;
            }
        }
        if self.status == SchedulerStatus::Loading && self.outstanding_loads == 0 {
            self.status = SchedulerStatus::Running;
            log::debug!("all blocking loads complete; scheduler running");
        }
        Ok(())
    }

    fn process_commands(&mut self) -> Result<(), EngineError> {
        let mut commands = Vec::new();
        for view in self.registry.engine(EngineStream::Commands).read() {
            let view = view?;
            if let Some(command) = EngineCommand::decode(view.type_id(), view.payload()) {
                commands.push(command);
            }
        }
        for command in commands {
            match command {
                EngineCommand::Exit => {
                    log::debug!("exit requested via command stream");
                    self.exit_requested = true;
                }
                EngineCommand::SetStatusRunning => {
                    self.status = if self.outstanding_loads > 0 {
                        SchedulerStatus::Loading
                    } else {
                        SchedulerStatus::Running
                    };
                }
                EngineCommand::SetStatusStopped => {
                    self.status = SchedulerStatus::Stopped;
                }
                EngineCommand::LoadScene { scene, auto_swap } => {
                    self.load_scene(scene, auto_swap)?;
                }
            }
        }
        Ok(())
    }

    fn load_scene(&mut self, scene: StreamName, auto_swap: bool) -> Result<(), EngineError> {
        if let Some(mut loader) = self.scene_loader.take() {
            let result = loader(&mut self.coordinator, scene, auto_swap);
            self.scene_loader = Some(loader);
            result.map_err(EngineError::Scene)?;
        } else {
            log::warn!("scene load {scene} requested but no scene loader is installed");
        }
        // Registration may have changed; recompile the frame graphs.
        self.coordinator.rebuild()?;
        Ok(())
    }
}
