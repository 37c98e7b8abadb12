//! Reusable system fixtures.
//!
//! Standard systems for scheduler and frame-loop validation:
//!
//! - [`counting_system`] bumps a shared counter every run.
//! - [`sequence_system`] appends its name to a shared log, for ordering
//!   assertions.
//! - [`failing_system`] succeeds a fixed number of times then fails.
//! - [`tick_emitter`] / [`tick_counter`] exercise an event stream across
//!   the frame boundary.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ember_core::EngineStream;
use ember_sched::{SystemResult, TaskContext};

use crate::Tick;

/// A system that counts how many times it ran.
pub fn counting_system(
    counter: Arc<AtomicUsize>,
) -> impl Fn(&TaskContext) -> SystemResult + Send + Sync + 'static {
    move |_ctx| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A system that records `name` in `order` each time it runs.
pub fn sequence_system(
    name: &'static str,
    order: Arc<Mutex<Vec<&'static str>>>,
) -> impl Fn(&TaskContext) -> SystemResult + Send + Sync + 'static {
    move |_ctx| {
        order.lock().map_err(|_| "order log poisoned")?.push(name);
        Ok(())
    }
}

/// A system that succeeds `succeed_count` times, then fails every run.
pub fn failing_system(
    succeed_count: usize,
) -> impl Fn(&TaskContext) -> SystemResult + Send + Sync + 'static {
    let calls = AtomicUsize::new(0);
    move |_ctx| {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        if n >= succeed_count {
            return Err(format!("deliberate failure after {succeed_count} runs").into());
        }
        Ok(())
    }
}

/// A system that emits one [`Tick`] on the game stream per run.
pub fn tick_emitter() -> impl Fn(&TaskContext) -> SystemResult + Send + Sync + 'static {
    let frame = AtomicUsize::new(0);
    move |ctx| {
        let tick = ctx.engine(EngineStream::Game).emit::<Tick>()?;
        tick.frame = frame.fetch_add(1, Ordering::SeqCst) as u32;
        Ok(())
    }
}

/// A system that counts the [`Tick`] events visible on the game stream.
///
/// Whether a tick is visible to the counter in the same frame depends on
/// where the counter sits relative to the pump, which is exactly what the
/// tests using this fixture assert.
pub fn tick_counter(
    seen: Arc<AtomicUsize>,
) -> impl Fn(&TaskContext) -> SystemResult + Send + Sync + 'static {
    move |ctx| {
        for view in ctx.engine(EngineStream::Game).read() {
            if view?.is::<Tick>() {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        }
        Ok(())
    }
}
