//! Integration test: the frame loop end to end.
//!
//! Drives a real engine frame by frame: systems execute each frame,
//! command-stream traffic controls exit, stop, and resume, scene loads
//! recompile the frame graphs mid-run, and a task failure fails the
//! frame without wedging the engine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ember_core::{
    EngineExit, EngineStream, StreamName, SystemStage, SystemStatusRunning, SystemStatusStopped,
};
use ember_engine::{Engine, EngineConfig, EngineError, FrameOutcome};
use ember_sched::SchedulerStatus;
use ember_test_utils::fixtures::{counting_system, failing_system};

fn engine() -> Engine {
    Engine::new(EngineConfig {
        worker_threads: Some(2),
        loader_threads: 0,
        ..EngineConfig::default()
    })
    .unwrap()
}

#[test]
fn systems_run_once_per_frame() {
    let mut engine = engine();
    let runs = Arc::new(AtomicUsize::new(0));
    let coordinator = engine.coordinator_mut();
    coordinator
        .stage_mut(SystemStage::GameLogic)
        .add("counter", counting_system(Arc::clone(&runs)))
        .unwrap();
    coordinator.rebuild().unwrap();

    for frame in 1..=5 {
        assert_eq!(engine.run_frame().unwrap(), FrameOutcome::Continue);
        assert_eq!(runs.load(Ordering::SeqCst), frame);
    }
}

#[test]
fn exit_command_ends_the_loop_before_systems_run() {
    let mut engine = engine();
    let runs = Arc::new(AtomicUsize::new(0));
    let coordinator = engine.coordinator_mut();
    coordinator
        .stage_mut(SystemStage::Update)
        .add("counter", counting_system(Arc::clone(&runs)))
        .unwrap();
    coordinator.rebuild().unwrap();

    engine
        .registry()
        .engine(EngineStream::Commands)
        .emit::<EngineExit>()
        .unwrap();

    assert_eq!(engine.run_frame().unwrap(), FrameOutcome::Exit);
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[test]
fn a_system_can_request_exit_for_the_next_frame() {
    let mut engine = engine();
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let coordinator = engine.coordinator_mut();
    coordinator
        .stage_mut(SystemStage::Update)
        .add("exit-after-three", move |ctx| {
            // Update runs after the pump, so this emission survives into
            // the next frame's command scan.
            if counter.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                ctx.engine(EngineStream::Commands).emit::<EngineExit>()?;
            }
            Ok(())
        })
        .unwrap();
    coordinator.rebuild().unwrap();

    engine.run().unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 3);
}

#[test]
fn stop_and_resume_commands_gate_system_execution() {
    let mut engine = engine();
    let runs = Arc::new(AtomicUsize::new(0));
    let coordinator = engine.coordinator_mut();
    coordinator
        .stage_mut(SystemStage::GameLogic)
        .add("counter", counting_system(Arc::clone(&runs)))
        .unwrap();
    coordinator.rebuild().unwrap();

    engine
        .registry()
        .engine(EngineStream::Commands)
        .emit::<SystemStatusStopped>()
        .unwrap();
    engine.run_frame().unwrap();
    assert_eq!(engine.status(), SchedulerStatus::Stopped);
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    // Stopped frames still pump; the stop command itself was consumed.
    engine.run_frame().unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    engine
        .registry()
        .engine(EngineStream::Commands)
        .emit::<SystemStatusRunning>()
        .unwrap();
    engine.run_frame().unwrap();
    assert_eq!(engine.status(), SchedulerStatus::Running);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn scene_load_command_invokes_the_loader_and_rebuilds() {
    let mut engine = engine();
    let loaded: Arc<Mutex<Option<(StreamName, bool)>>> = Arc::new(Mutex::new(None));
    let record = Arc::clone(&loaded);
    let spawned = Arc::new(AtomicUsize::new(0));
    let spawn_counter = Arc::clone(&spawned);

    engine.set_scene_loader(Box::new(move |coordinator, scene, auto_swap| {
        *record.lock().unwrap() = Some((scene, auto_swap));
        let runs = Arc::clone(&spawn_counter);
        coordinator
            .stage_mut(SystemStage::GameLogic)
            .add("scene-system", counting_system(runs))?;
        Ok(())
    }));

    engine
        .registry()
        .engine(EngineStream::Commands)
        .emit_with::<ember_core::SceneLoad>(|load| {
            load.scene = StreamName::from_name("levels/forest").0;
            load.auto_swap = 1;
        })
        .unwrap();

    // The rebuilt graph takes effect in the very frame that loaded it.
    engine.run_frame().unwrap();
    assert_eq!(
        *loaded.lock().unwrap(),
        Some((StreamName::from_name("levels/forest"), true))
    );
    assert_eq!(spawned.load(Ordering::SeqCst), 1);

    engine.run_frame().unwrap();
    assert_eq!(spawned.load(Ordering::SeqCst), 2);
}

#[test]
fn scene_loader_errors_surface_from_run_frame() {
    let mut engine = engine();
    engine.set_scene_loader(Box::new(|_, _, _| Err("no such scene".into())));
    engine
        .registry()
        .engine(EngineStream::Commands)
        .emit_with::<ember_core::SceneLoad>(|load| {
            load.scene = StreamName::from_name("levels/missing").0;
        })
        .unwrap();
    assert!(matches!(engine.run_frame(), Err(EngineError::Scene(_))));
}

#[test]
fn a_failing_system_fails_the_frame_but_not_the_engine() {
    let mut engine = engine();
    let runs = Arc::new(AtomicUsize::new(0));
    let coordinator = engine.coordinator_mut();
    coordinator
        .stage_mut(SystemStage::GameLogic)
        .add("flaky", failing_system(2))
        .unwrap();
    coordinator
        .stage_mut(SystemStage::Update)
        .add("counter", counting_system(Arc::clone(&runs)))
        .unwrap();
    coordinator.rebuild().unwrap();

    assert_eq!(engine.run_frame().unwrap(), FrameOutcome::Continue);
    assert_eq!(engine.run_frame().unwrap(), FrameOutcome::Continue);
    assert!(matches!(engine.run_frame(), Err(EngineError::FrameFailed)));
    // The rest of the failing frame's graph still ran.
    assert_eq!(runs.load(Ordering::SeqCst), 3);

    // The next frame fails again (the fixture keeps failing), which shows
    // the executor survived rather than wedged.
    assert!(matches!(engine.run_frame(), Err(EngineError::FrameFailed)));
}

#[test]
fn renderer_prep_runs_once_per_frame_plus_handshake() {
    let mut engine = engine();
    let prepped = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&prepped);
    engine
        .attach_renderer(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    assert_eq!(prepped.load(Ordering::SeqCst), 1);

    for _ in 0..4 {
        engine.run_frame().unwrap();
    }
    assert_eq!(prepped.load(Ordering::SeqCst), 5);
}
