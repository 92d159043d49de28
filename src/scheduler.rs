//! Periodic pass runner
//!
//! Runs a task once on start and then every interval on a worker thread
//! until stopped. At most one pass runs at a time: a tick (or a manual
//! trigger) that finds a pass in progress is skipped, not queued.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info};

type Task = Arc<dyn Fn() + Send + Sync + 'static>;

/// Counters shared between the runner handle and its worker
#[derive(Debug, Default)]
struct RunnerState {
    in_pass: AtomicBool,
    completed: AtomicU64,
    skipped: AtomicU64,
}

/// Snapshot of a runner's state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerStatus {
    pub is_running: bool,
    pub in_pass: bool,
    pub completed_passes: u64,
    pub skipped_ticks: u64,
}

/// Clears the in-pass flag even if the task panics
struct PassGuard<'a>(&'a RunnerState);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.in_pass.store(false, Ordering::Release);
    }
}

fn run_guarded(state: &RunnerState, task: &Task) -> bool {
    if state
        .in_pass
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        state.skipped.fetch_add(1, Ordering::Relaxed);
        debug!("Previous pass still running, skipping tick");
        return false;
    }

    let _guard = PassGuard(state);
    task();
    state.completed.fetch_add(1, Ordering::Relaxed);
    true
}

/// Handle to a running periodic task
pub struct PeriodicRunner {
    task: Task,
    state: Arc<RunnerState>,
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl PeriodicRunner {
    /// Start running `task` now and then every `interval`
    pub fn start<F>(interval: Duration, task: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let task: Task = Arc::new(task);
        let state = Arc::new(RunnerState::default());
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let worker_task = Arc::clone(&task);
        let worker_state = Arc::clone(&state);
        let worker = thread::spawn(move || {
            info!(interval_secs = interval.as_secs(), "Periodic backup started");
            loop {
                run_guarded(&worker_state, &worker_task);
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    // stop requested or handle dropped
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            info!("Periodic backup stopped");
        });

        Self {
            task,
            state,
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        }
    }

    /// Run a pass on the calling thread unless one is already running
    ///
    /// Returns whether the pass ran.
    pub fn trigger_now(&self) -> bool {
        run_guarded(&self.state, &self.task)
    }

    /// Stop the worker, waiting for an in-flight pass to finish
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn status(&self) -> RunnerStatus {
        RunnerStatus {
            is_running: self.is_running(),
            in_pass: self.state.in_pass.load(Ordering::Acquire),
            completed_passes: self.state.completed.load(Ordering::Relaxed),
            skipped_ticks: self.state.skipped.load(Ordering::Relaxed),
        }
    }
}

impl Drop for PeriodicRunner {
    fn drop(&mut self) {
        self.stop();
    }
}
