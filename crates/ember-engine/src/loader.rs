//! Background resource loading.
//!
//! Loader threads consume a bounded request queue and post completions to
//! a bounded completion queue. The frame loop drains completions without
//! blocking once per frame and converts them into events on the
//! resources engine stream, so gameplay code observes loads the same way
//! it observes everything else.

use std::error::Error;
use std::thread::{self, JoinHandle};

use bytemuck::{Pod, Zeroable};
use crossbeam_channel::{bounded, Receiver, Sender};

use ember_core::Event;

use crate::error::EngineError;

/// Emitted on the resources stream when a load completes.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ResourceLoaded {
    /// Name hash of the loaded resource.
    pub resource: u32,
}

impl Event for ResourceLoaded {
    const NAME: &'static str = "resource/loaded";
}

/// Emitted on the resources stream when a load fails, carrying the same
/// name hash so waiters can react.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ResourceLoadFailed {
    /// Name hash of the failed resource.
    pub resource: u32,
}

impl Event for ResourceLoadFailed {
    const NAME: &'static str = "resource/load-failed";
}

/// The work of loading one resource.
pub struct LoadJob {
    /// Name hash of the resource, echoed in the completion.
    pub resource: u32,
    /// Runs on a loader thread; an `Err` marks the load failed.
    pub work: Box<dyn FnOnce() -> Result<(), Box<dyn Error + Send + Sync>> + Send>,
}

/// A finished load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// Name hash of the resource.
    pub resource: u32,
    /// Whether the work succeeded.
    pub ok: bool,
}

/// Background loader threads plus their queues.
pub struct LoaderPool {
    requests: Option<Sender<LoadJob>>,
    completions: Receiver<Completion>,
    threads: Vec<JoinHandle<()>>,
}

impl LoaderPool {
    /// Spawn `threads` loader threads with `queue`-deep channels. Zero
    /// threads builds a disabled pool whose `submit` always fails.
    pub fn new(threads: usize, queue: usize) -> Result<Self, EngineError> {
        let (requests, incoming) = bounded::<LoadJob>(queue);
        let (completed, completions) = bounded::<Completion>(queue.max(1));
        let mut handles = Vec::with_capacity(threads);
        for index in 0..threads {
            let incoming = incoming.clone();
            let completed = completed.clone();
            let handle = thread::Builder::new()
                .name(format!("ember-loader-{index}"))
                .spawn(move || loader_loop(&incoming, &completed))
                .map_err(|err| EngineError::Sched(ember_sched::SchedError::WorkerSpawn(err)))?;
            handles.push(handle);
        }
        let requests = (threads > 0).then_some(requests);
        Ok(Self {
            requests,
            completions,
            threads: handles,
        })
    }

    /// Queue a load. Blocks if the request queue is full.
    pub fn submit(&self, job: LoadJob) -> Result<(), EngineError> {
        let Some(requests) = &self.requests else {
            return Err(EngineError::LoaderUnavailable);
        };
        requests
            .send(job)
            .map_err(|_| EngineError::LoaderUnavailable)
    }

    /// Drain every completion that has arrived, without blocking.
    pub fn poll(&self) -> Vec<Completion> {
        self.completions.try_iter().collect()
    }
}

impl Drop for LoaderPool {
    fn drop(&mut self) {
        // Closing the request queue lets the loader threads drain and exit.
        self.requests = None;
        for handle in self.threads.drain(..) {
            let _ = handle.join();
        }
    }
}

fn loader_loop(incoming: &Receiver<LoadJob>, completed: &Sender<Completion>) {
    while let Ok(job) = incoming.recv() {
        let ok = match (job.work)() {
            Ok(()) => true,
            Err(err) => {
                log::warn!("resource {:#010x} failed to load: {err}", job.resource);
                false
            }
        };
        if completed
            .send(Completion {
                resource: job.resource,
                ok,
            })
            .is_err()
        {
            break;
        }
    }
}
