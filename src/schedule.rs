//! Single-slot deferred task scheduling.
//!
//! Debounced persistence and refresh need exactly one pending timer at a time:
//! a request while one is pending is absorbed, the timer fires against the
//! latest in-memory state, and tests and shutdown can flush synchronously
//! instead of sleeping.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

type Task = Box<dyn Fn() + Send + Sync + 'static>;

struct State {
    deadline: Option<Instant>,
    shutdown: bool,
}

struct Inner {
    state: Mutex<State>,
    signal: Condvar,
    quiet: Duration,
    task: Task,
}

/// A debounced task with at most one pending execution.
///
/// `request` arms the timer if idle and is a no-op otherwise — the pending
/// deadline is never extended, so a burst of requests fires exactly once,
/// `quiet` after the first. The worker thread runs the task outside the lock,
/// so the task reads whatever state exists at fire time.
pub struct DebouncedTask {
    inner: Arc<Inner>,
    worker: Option<JoinHandle<()>>,
}

impl DebouncedTask {
    pub fn new(quiet: Duration, task: impl Fn() + Send + Sync + 'static) -> Self {
        let inner = Arc::new(Inner {
            state: Mutex::new(State {
                deadline: None,
                shutdown: false,
            }),
            signal: Condvar::new(),
            quiet,
            task: Box::new(task),
        });

        let worker_inner = Arc::clone(&inner);
        let worker = thread::spawn(move || worker_loop(worker_inner));

        Self {
            inner,
            worker: Some(worker),
        }
    }

    /// Arm the timer. Absorbed (not reset) while a run is already pending.
    pub fn request(&self) {
        let mut state = self.inner.state.lock();
        if state.deadline.is_some() || state.shutdown {
            return;
        }
        state.deadline = Some(Instant::now() + self.inner.quiet);
        self.inner.signal.notify_all();
    }

    pub fn is_pending(&self) -> bool {
        self.inner.state.lock().deadline.is_some()
    }

    /// Run the pending task now, on the calling thread. No-op when idle.
    pub fn flush(&self) {
        let had_pending = self.inner.state.lock().deadline.take().is_some();
        if had_pending {
            (self.inner.task)();
        }
    }

    /// Drop the pending run without executing it.
    pub fn cancel(&self) {
        self.inner.state.lock().deadline = None;
    }
}

fn worker_loop(inner: Arc<Inner>) {
    let mut state = inner.state.lock();
    loop {
        if state.shutdown {
            return;
        }
        match state.deadline {
            None => {
                inner.signal.wait(&mut state);
            }
            Some(deadline) => {
                if Instant::now() < deadline {
                    // Re-check on wake: flush/cancel may have claimed the slot.
                    let _ = inner.signal.wait_until(&mut state, deadline);
                } else {
                    state.deadline = None;
                    drop(state);
                    (inner.task)();
                    state = inner.state.lock();
                }
            }
        }
    }
}

impl Drop for DebouncedTask {
    fn drop(&mut self) {
        {
            let mut state = self.inner.state.lock();
            state.shutdown = true;
            state.deadline = None;
        }
        self.inner.signal.notify_all();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
