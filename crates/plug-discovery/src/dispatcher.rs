//! Scoped work groups on a bounded worker pool
//!
//! A [`Dispatcher`] tracks the work it scheduled, including work scheduled
//! by that work through a [`DispatchHandle`], and [`Dispatcher::wait`]
//! returns once all of it has finished. Only this group's outstanding
//! count is observed, never the pool as a whole, so waiting cannot block
//! on unrelated jobs sharing the pool.

use crate::errors::DispatchError;
use once_cell::sync::OnceCell;
use parking_lot::{Condvar, Mutex};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;
use tracing::{debug, error};

static SHARED_POOL: OnceCell<Arc<ThreadPool>> = OnceCell::new();

/// Build a worker pool bounded to `threads` workers
pub fn build_pool(threads: usize) -> Result<ThreadPool, DispatchError> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|idx| format!("plug-worker-{idx}"))
        .panic_handler(|_| error!("Discovery task panicked"))
        .build()?;
    Ok(pool)
}

/// Process-wide pool, sized from the configured thread limit on first use
fn shared_pool() -> Result<Arc<ThreadPool>, DispatchError> {
    SHARED_POOL
        .get_or_try_init(|| {
            let threads = plug_config::thread_limit();
            debug!("Creating shared discovery pool with {} threads", threads);
            build_pool(threads).map(Arc::new)
        })
        .map(Arc::clone)
}

struct WorkGroup {
    pool: Arc<ThreadPool>,
    outstanding: Mutex<usize>,
    idle: Condvar,
}

impl WorkGroup {
    fn spawn<F>(self: &Arc<Self>, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        *self.outstanding.lock() += 1;
        let pending = PendingWork {
            group: Arc::clone(self),
        };
        self.pool.spawn(move || {
            // Dropped after `work` (and everything it captured) is gone,
            // including when `work` panics.
            let _pending = pending;
            work();
        });
    }

    fn wait(&self) {
        let mut outstanding = self.outstanding.lock();
        while *outstanding > 0 {
            self.idle.wait(&mut outstanding);
        }
    }
}

struct PendingWork {
    group: Arc<WorkGroup>,
}

impl Drop for PendingWork {
    fn drop(&mut self) {
        let mut outstanding = self.group.outstanding.lock();
        *outstanding -= 1;
        if *outstanding == 0 {
            self.group.idle.notify_all();
        }
    }
}

#[derive(Clone)]
enum DispatchMode {
    Concurrent(Arc<WorkGroup>),
    Synchronous,
}

/// Cloneable handle for scheduling more work into a group from inside
/// running work.
#[derive(Clone)]
pub struct DispatchHandle {
    mode: DispatchMode,
}

impl DispatchHandle {
    /// Schedule `work` and return immediately (concurrent mode) or run it
    /// to completion before returning (synchronous mode).
    pub fn run<F>(&self, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match &self.mode {
            DispatchMode::Concurrent(group) => group.spawn(work),
            DispatchMode::Synchronous => work(),
        }
    }

    pub fn is_synchronous(&self) -> bool {
        matches!(self.mode, DispatchMode::Synchronous)
    }
}

/// Owner of a work group. Dropping it waits for the group to drain.
pub struct Dispatcher {
    handle: DispatchHandle,
}

impl Dispatcher {
    /// Concurrent dispatcher on the shared, process-wide pool
    pub fn concurrent() -> Result<Self, DispatchError> {
        Ok(Self::with_pool(shared_pool()?))
    }

    /// Concurrent dispatcher on a dedicated pool of `threads` workers
    pub fn with_thread_limit(threads: usize) -> Result<Self, DispatchError> {
        Ok(Self::with_pool(Arc::new(build_pool(threads)?)))
    }

    /// Concurrent dispatcher on a caller-supplied pool
    pub fn with_pool(pool: Arc<ThreadPool>) -> Self {
        Dispatcher {
            handle: DispatchHandle {
                mode: DispatchMode::Concurrent(Arc::new(WorkGroup {
                    pool,
                    outstanding: Mutex::new(0),
                    idle: Condvar::new(),
                })),
            },
        }
    }

    /// Inline dispatcher: `run` executes immediately, `wait` is a no-op
    pub fn synchronous() -> Self {
        Dispatcher {
            handle: DispatchHandle {
                mode: DispatchMode::Synchronous,
            },
        }
    }

    pub fn handle(&self) -> DispatchHandle {
        self.handle.clone()
    }

    pub fn run<F>(&self, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.run(work);
    }

    /// Block until every item scheduled through this group has finished.
    ///
    /// Must not be called from inside the group's own work.
    pub fn wait(&self) {
        if let DispatchMode::Concurrent(group) = &self.handle.mode {
            group.wait();
        }
    }

    pub fn is_synchronous(&self) -> bool {
        self.handle.is_synchronous()
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.wait();
    }
}
