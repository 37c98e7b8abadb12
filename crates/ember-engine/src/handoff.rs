//! The simulation/renderer frame handoff.
//!
//! One token of ownership moves between the simulation thread and the
//! renderer thread once per frame. While the renderer owns the token it
//! may read anything the simulation produced this frame; the simulation
//! blocks until the token comes back, so the two sides never touch the
//! shared frame state concurrently and neither side busy-waits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crate::error::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Owner {
    Simulation,
    Renderer,
}

/// The ownership token and its wait primitives.
pub struct RenderGate {
    owner: Mutex<Owner>,
    handed: Condvar,
    running: AtomicBool,
}

impl RenderGate {
    /// A gate owned by the simulation side.
    pub fn new() -> Self {
        Self {
            owner: Mutex::new(Owner::Simulation),
            handed: Condvar::new(),
            running: AtomicBool::new(true),
        }
    }

    /// Simulation side: give the frame to the renderer and block until
    /// it is returned (or the gate stops).
    pub fn hand_off(&self) {
        let mut owner = self.owner.lock().unwrap_or_else(PoisonError::into_inner);
        *owner = Owner::Renderer;
        self.handed.notify_all();
        let guard = self
            .handed
            .wait_while(owner, |owner| {
                *owner == Owner::Renderer && self.running.load(Ordering::Acquire)
            })
            .unwrap_or_else(PoisonError::into_inner);
        drop(guard);
    }

    /// Renderer side: block until the simulation hands a frame over.
    /// Returns `false` when the gate has stopped.
    fn acquire(&self) -> bool {
        let guard = self.owner.lock().unwrap_or_else(PoisonError::into_inner);
        let guard = self
            .handed
            .wait_while(guard, |owner| {
                *owner == Owner::Simulation && self.running.load(Ordering::Acquire)
            })
            .unwrap_or_else(PoisonError::into_inner);
        *guard == Owner::Renderer && self.running.load(Ordering::Acquire)
    }

    /// Renderer side: return the frame to the simulation.
    fn release(&self) {
        let mut owner = self.owner.lock().unwrap_or_else(PoisonError::into_inner);
        *owner = Owner::Simulation;
        self.handed.notify_all();
    }

    /// End the protocol; wakes whichever side is waiting.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
        self.handed.notify_all();
    }

    /// Whether the protocol is still live.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Default for RenderGate {
    fn default() -> Self {
        Self::new()
    }
}

/// The renderer thread and its gate.
///
/// `prep` runs once per handoff on the renderer thread, strictly
/// interleaved with the simulation: render-prep reads this frame's
/// pumped streams, copies what the backend needs, and returns the token.
pub struct Renderer {
    gate: Arc<RenderGate>,
    thread: Option<JoinHandle<()>>,
}

impl Renderer {
    /// Spawn the renderer thread and perform the startup handshake: one
    /// empty frame is handed over so the caller knows the loop is live.
    pub fn spawn<F>(mut prep: F) -> Result<Self, EngineError>
    where
        F: FnMut() + Send + 'static,
    {
        let gate = Arc::new(RenderGate::new());
        let loop_gate = Arc::clone(&gate);
        let thread = thread::Builder::new()
            .name("ember-render".to_owned())
            .spawn(move || {
                while loop_gate.acquire() {
                    prep();
                    loop_gate.release();
                }
            })
            .map_err(|err| EngineError::Sched(ember_sched::SchedError::WorkerSpawn(err)))?;
        gate.hand_off();
        Ok(Self {
            gate,
            thread: Some(thread),
        })
    }

    /// Hand the finished frame to the renderer and wait for it back.
    pub fn hand_off(&self) {
        self.gate.hand_off();
    }

    /// The underlying gate, for installing stop hooks.
    pub fn gate(&self) -> &Arc<RenderGate> {
        &self.gate
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.gate.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn startup_handshake_runs_prep_once() {
        let frames = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&frames);
        let renderer = Renderer::spawn(move || {
            counter.fetch_add(1, Ordering::AcqRel);
        })
        .unwrap();
        assert_eq!(frames.load(Ordering::Acquire), 1);
        drop(renderer);
    }

    #[test]
    fn ownership_alternates_without_lost_updates() {
        const FRAMES: u64 = 2_000;

        // Both sides bump the counter with a split read-then-write. Only
        // the gate's mutual exclusion keeps the total exact.
        let counter = Arc::new(AtomicU64::new(0));
        let bump = |counter: &AtomicU64| {
            let seen = counter.load(Ordering::Acquire);
            counter.store(seen + 1, Ordering::Release);
        };

        let render_counter = Arc::clone(&counter);
        let renderer = Renderer::spawn(move || bump(&render_counter)).unwrap();

        for _ in 0..FRAMES {
            bump(&counter);
            renderer.hand_off();
        }

        // Handshake + FRAMES render bumps + FRAMES simulation bumps.
        assert_eq!(counter.load(Ordering::Acquire), 1 + 2 * FRAMES);
        drop(renderer);
    }

    #[test]
    fn stop_unblocks_a_pending_hand_off() {
        let gate = Arc::new(RenderGate::new());
        let stopper = Arc::clone(&gate);
        let waiter = thread::spawn(move || {
            // No renderer will ever take this frame.
            stopper.hand_off();
        });
        // Give the waiter time to block, then stop the protocol.
        thread::sleep(std::time::Duration::from_millis(20));
        gate.stop();
        waiter.join().unwrap();
        assert!(!gate.is_running());
    }

    #[test]
    fn drop_joins_the_renderer_thread() {
        let renderer = Renderer::spawn(|| {}).unwrap();
        let gate = Arc::clone(renderer.gate());
        drop(renderer);
        assert!(!gate.is_running());
    }
}
