//! Per-thread message pools and their aggregation.
//!
//! Posting a message never takes a lock: each thread owns a private byte
//! arena and the pump copies every arena's records into the global message
//! pool at the frame boundary. Registration (first use per thread) is the
//! only locking operation.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, ThreadId};

use ember_pool::{BytePool, NoAlign, OverflowPolicy, PoolError, RawPool};

use crate::message::MessagePublisher;

/// One thread's private message arena.
///
/// Only the owning thread posts into it; the pump reads and resets it
/// while the task graph is quiescent.
pub struct LocalMessagePool {
    pool: RawPool<NoAlign>,
}

impl LocalMessagePool {
    fn new(capacity: u32, policy: OverflowPolicy) -> Self {
        Self {
            pool: RawPool::new(capacity, policy),
        }
    }

    /// A posting facade over this pool.
    pub fn publisher(&self) -> MessagePublisher<'_> {
        MessagePublisher::new(&self.pool)
    }

    /// Records currently buffered, waiting for the pump.
    pub fn pending(&self) -> u32 {
        self.pool.count()
    }
}

/// Process-wide list of thread-local message pools.
///
/// Threads register once and cache the returned handle in their task
/// context; no thread-local statics are involved, so the same thread can
/// serve different engines in tests without cross-talk.
pub struct LocalPoolRegistry {
    capacity: u32,
    policy: OverflowPolicy,
    pools: Mutex<Vec<(ThreadId, Arc<LocalMessagePool>)>>,
}

impl LocalPoolRegistry {
    /// Create a registry whose per-thread pools hold `capacity` bytes.
    pub fn new(capacity: u32, policy: OverflowPolicy) -> Self {
        Self {
            capacity,
            policy,
            pools: Mutex::new(Vec::new()),
        }
    }

    /// The calling thread's pool, created on first use.
    pub fn register(&self) -> Arc<LocalMessagePool> {
        let id = thread::current().id();
        let mut pools = self.pools.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((_, pool)) = pools.iter().find(|(owner, _)| *owner == id) {
            return Arc::clone(pool);
        }
        let pool = Arc::new(LocalMessagePool::new(self.capacity, self.policy));
        pools.push((id, Arc::clone(&pool)));
        pool
    }

    /// Copy every thread's buffered records into `global` in registration
    /// order, then reset the local pools.
    ///
    /// Runs with the task graph quiescent. If `global` sheds, the shed
    /// thread's records are lost for the frame (its policy decides whether
    /// that is logged); locals are reset either way so they cannot grow
    /// unboundedly.
    pub fn pump_into(&self, global: &dyn BytePool) -> Result<(), PoolError> {
        let pools = self.pools.lock().unwrap_or_else(PoisonError::into_inner);
        for (_, local) in pools.iter() {
            if local.pool.count() > 0 {
                global.extend_from(local.pool.bytes(), local.pool.count())?;
            }
            local.pool.reset();
        }
        Ok(())
    }

    /// Number of threads that have registered.
    pub fn threads(&self) -> usize {
        self.pools
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::{Pod, Zeroable};
    use ember_core::{EntityId, Message, TargetKind};

    use crate::iter::MessageIter;

    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Tick {
        thread: u32,
        seq: u32,
    }

    impl Message for Tick {
        const NAME: &'static str = "test/tick";
    }

    #[test]
    fn registration_is_per_thread_and_idempotent() {
        let registry = LocalPoolRegistry::new(256, OverflowPolicy::Fatal);
        let a = registry.register();
        let b = registry.register();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.threads(), 1);
    }

    #[test]
    fn pump_gathers_every_thread_and_resets_locals() {
        const THREADS: u32 = 4;
        const POSTS: u32 = 32;

        let registry = LocalPoolRegistry::new(4096, OverflowPolicy::Fatal);
        thread::scope(|scope| {
            for t in 0..THREADS {
                let registry = &registry;
                scope.spawn(move || {
                    let local = registry.register();
                    let publisher = local.publisher();
                    for seq in 0..POSTS {
                        publisher
                            .post(EntityId(seq), TargetKind::Entity, Tick { thread: t, seq })
                            .unwrap();
                    }
                });
            }
        });
        assert_eq!(registry.threads(), THREADS as usize);

        let global = RawPool::<NoAlign>::new(64 * 1024, OverflowPolicy::Fatal);
        registry.pump_into(&global).unwrap();

        // Exactly THREADS * POSTS messages, each exactly once.
        let seen: Vec<(u32, u32)> = MessageIter::new(global.bytes())
            .map(|view| {
                let tick = view.unwrap().decode::<Tick>().unwrap();
                (tick.thread, tick.seq)
            })
            .collect();
        assert_eq!(seen.len(), (THREADS * POSTS) as usize);
        let mut unique = seen.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), (THREADS * POSTS) as usize);

        // Each thread's posts keep their posting order through aggregation.
        let mut last_seq = [None::<u32>; THREADS as usize];
        for (thread, seq) in seen {
            let last = &mut last_seq[thread as usize];
            assert!(
                last.map_or(true, |prev| prev < seq),
                "thread {thread}: seq {seq} after {last:?}"
            );
            *last = Some(seq);
        }
        assert_eq!(last_seq, [Some(POSTS - 1); THREADS as usize]);

        // Locals are drained; a second pump adds nothing.
        let again = RawPool::<NoAlign>::new(64 * 1024, OverflowPolicy::Fatal);
        registry.pump_into(&again).unwrap();
        assert_eq!(again.count(), 0);
    }

    #[test]
    fn pump_propagates_global_exhaustion() {
        let registry = LocalPoolRegistry::new(256, OverflowPolicy::Fatal);
        let local = registry.register();
        local
            .publisher()
            .post(EntityId(1), TargetKind::Entity, Tick { thread: 0, seq: 0 })
            .unwrap();

        let tiny = RawPool::<NoAlign>::new(4, OverflowPolicy::Fatal);
        assert!(matches!(
            registry.pump_into(&tiny),
            Err(PoolError::Exhausted { .. })
        ));
    }
}
