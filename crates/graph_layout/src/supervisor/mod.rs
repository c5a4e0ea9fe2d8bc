//! Lifecycle handles of background layout computations
//!
//! A [`Supervisor`] starts, stops and kills one computation. Partial results
//! are pushed to a [`SnapshotSink`] while the computation runs.

mod worker;

pub use worker::WorkerSupervisor;

use crate::LayoutSnapshot;
use derive_more::Display;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Running,
    Stopped,
    Killed,
    Crashed,
}

impl SupervisorState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SupervisorState::Stopped | SupervisorState::Killed | SupervisorState::Crashed
        )
    }
}

/// Control surface of one background computation
///
/// `Idle` is the initial state. `Stopped`, `Killed` and `Crashed` are
/// terminal: a new computation needs a new supervisor. Transitions that
/// don't apply to the current state are no-ops. The one exception is a
/// `Stopped` computation failing in its last step, which ends `Crashed`.
pub trait Supervisor: Send {
    /// `Idle -> Running`
    fn start(&mut self);

    /// `Running -> Stopped`, the computation emits one final snapshot
    ///
    /// A step already in progress can still fail, the state then becomes
    /// `Crashed` and the sink gets `failed` instead of the final snapshot.
    fn stop(&mut self);

    /// `Idle | Running -> Killed`
    ///
    /// Does not wait for the computation to exit, but no snapshot is
    /// delivered once this returns.
    fn kill(&mut self);

    fn state(&self) -> SupervisorState;

    fn is_running(&self) -> bool {
        self.state() == SupervisorState::Running
    }
}

/// Consumer of the snapshots produced by a supervised computation
///
/// Called from the supervisor's dispatcher thread, never concurrently.
pub trait SnapshotSink: Send + Sync {
    fn snapshot(&self, snapshot: LayoutSnapshot);

    /// The computation crashed, called at most once
    fn failed(&self, _reason: &str) {}
}

// Blanket implementation for closures
impl<F> SnapshotSink for F
where
    F: Fn(LayoutSnapshot) + Send + Sync,
{
    fn snapshot(&self, snapshot: LayoutSnapshot) {
        self(snapshot)
    }
}

#[derive(Debug, Default)]
struct Latest {
    snapshot: Option<LayoutSnapshot>,
    failure: Option<String>,
}

/// Sink keeping only the most recent snapshot
#[derive(Debug, Default)]
pub struct LatestSnapshot {
    latest: Mutex<Latest>,
    changed: Condvar,
}

impl LatestSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Latest> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn latest(&self) -> Option<LayoutSnapshot> {
        self.lock().snapshot.clone()
    }

    pub fn failure(&self) -> Option<String> {
        self.lock().failure.clone()
    }

    /// Block until a final snapshot or a failure arrives, or `timeout` elapses
    ///
    /// Returns the latest snapshot received, final or not.
    pub fn wait_final(&self, timeout: Duration) -> Option<LayoutSnapshot> {
        let deadline = Instant::now() + timeout;
        let mut latest = self.lock();
        loop {
            let done = latest.failure.is_some()
                || latest.snapshot.as_ref().is_some_and(|s| s.is_final);
            let now = Instant::now();
            if done || now >= deadline {
                return latest.snapshot.clone();
            }
            latest = self
                .changed
                .wait_timeout(latest, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

impl SnapshotSink for LatestSnapshot {
    fn snapshot(&self, snapshot: LayoutSnapshot) {
        self.lock().snapshot = Some(snapshot);
        self.changed.notify_all();
    }

    fn failed(&self, reason: &str) {
        self.lock().failure = Some(reason.to_string());
        self.changed.notify_all();
    }
}
