//! The persistent worker pool.

use std::mem;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use ember_stream::StreamRegistry;

use crate::context::TaskContext;
use crate::error::SchedError;
use crate::graph::TaskGraph;

/// Worker thread count for a machine: one core is left for the frame
/// thread, with a floor of one worker.
pub fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        .saturating_sub(1)
        .max(1)
}

/// Per-execution bookkeeping shared between the frame thread and the
/// workers.
struct RunState {
    graph: Arc<TaskGraph>,
    indegree: Vec<AtomicUsize>,
    remaining: AtomicUsize,
    ok: AtomicBool,
    jobs: Sender<Job>,
    done: Sender<()>,
}

struct Job {
    state: Arc<RunState>,
    task: usize,
}

/// Runs task graphs on a pool of persistent worker threads.
///
/// Workers are spawned once and reused every frame; a frame is one
/// [`execute`](Self::execute) call, which blocks until the whole graph
/// has run. Task failures and panics are absorbed at the task boundary:
/// the rest of the graph still completes, and `execute` reports `false`.
pub struct Executor {
    jobs: Sender<Job>,
    workers: Vec<JoinHandle<()>>,
}

impl Executor {
    /// Spawn `workers` threads (minimum one), each with its own
    /// [`TaskContext`] over `registry`.
    pub fn new(registry: Arc<StreamRegistry>, workers: usize) -> Result<Self, SchedError> {
        let (jobs, queue) = unbounded::<Job>();
        let mut handles = Vec::with_capacity(workers.max(1));
        for index in 0..workers.max(1) {
            let queue = queue.clone();
            let registry = Arc::clone(&registry);
            let handle = thread::Builder::new()
                .name(format!("ember-worker-{index}"))
                .spawn(move || worker_loop(&queue, registry))
                .map_err(SchedError::WorkerSpawn)?;
            handles.push(handle);
        }
        Ok(Self {
            jobs,
            workers: handles,
        })
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    /// Run `graph` to completion. Returns `false` if any task failed or
    /// panicked (or the pool is shutting down).
    pub fn execute(&self, graph: &Arc<TaskGraph>) -> bool {
        if graph.is_empty() {
            return true;
        }
        let (done, finished) = bounded(1);
        let state = Arc::new(RunState {
            graph: Arc::clone(graph),
            indegree: graph
                .indegrees()
                .into_iter()
                .map(AtomicUsize::new)
                .collect(),
            remaining: AtomicUsize::new(graph.len()),
            ok: AtomicBool::new(true),
            jobs: self.jobs.clone(),
            done,
        });
        for &root in state.graph.roots() {
            let job = Job {
                state: Arc::clone(&state),
                task: root,
            };
            if self.jobs.send(job).is_err() {
                return false;
            }
        }
        if finished.recv().is_err() {
            return false;
        }
        state.ok.load(Ordering::Acquire)
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        // Disconnect the queue so idle workers observe shutdown.
        let (orphan, _) = unbounded();
        drop(mem::replace(&mut self.jobs, orphan));
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop(queue: &Receiver<Job>, registry: Arc<StreamRegistry>) {
    let ctx = TaskContext::new(registry);
    while let Ok(Job { state, task }) = queue.recv() {
        let node = state.graph.task(task);
        match catch_unwind(AssertUnwindSafe(|| (node.run)(&ctx))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                log::error!("task {:?} failed: {err}", node.name);
                state.ok.store(false, Ordering::Release);
            }
            Err(_) => {
                log::error!("task {:?} panicked", node.name);
                state.ok.store(false, Ordering::Release);
            }
        }
        // Release children whose prerequisites are all done, then retire
        // this task; the last retirement wakes the frame thread.
        for &child in &node.children {
            if state.indegree[child].fetch_sub(1, Ordering::AcqRel) == 1 {
                let job = Job {
                    state: Arc::clone(&state),
                    task: child,
                };
                let _ = state.jobs.send(job);
            }
        }
        if state.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            let _ = state.done.send(());
        }
    }
}
