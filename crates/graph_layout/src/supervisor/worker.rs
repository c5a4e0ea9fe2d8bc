use super::{SnapshotSink, Supervisor, SupervisorState};
use crate::config::WorkerConfig;
use crate::error::panic_message;
use crate::layout::{AlgorithmBuilder, SupervisorRequest};
use crate::{LayoutSettings, LayoutSnapshot, Progress};
use anyhow::{Context, Result};
use crossbeam::channel::{self, Receiver, Sender, TryRecvError, TrySendError};
use graphwerk_graph::GraphSnapshot;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use tracing::{debug, error, warn};

/// Messages from the supervisor to its worker thread
#[derive(Debug)]
enum Control {
    Init(LayoutSettings),
    Stop,
    Kill,
}

/// Messages from the worker thread to the dispatcher
#[derive(Debug)]
enum WorkerMessage {
    Snapshot(LayoutSnapshot),
    Failed(String),
}

const RUNNING: u8 = 0;
const COMPLETED: u8 = 1;
const CRASHED: u8 = 2;

/// Delivery gate, closed by `kill`
///
/// The lock is held while the sink runs, so closing waits for an in-flight
/// delivery and no delivery starts afterwards.
#[derive(Debug)]
struct Gate {
    open: Mutex<bool>,
}

impl Gate {
    fn new() -> Self {
        Self {
            open: Mutex::new(true),
        }
    }

    fn deliver(&self, delivery: impl FnOnce()) -> bool {
        let open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        if *open {
            delivery();
        }
        *open
    }

    fn close(&self) {
        *self.open.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }
}

/// State shared by the supervisor, the worker and the dispatcher
#[derive(Debug)]
struct Shared {
    cancelled: AtomicBool,
    outcome: AtomicU8,
    gate: Gate,
}

impl Shared {
    fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            outcome: AtomicU8::new(RUNNING),
            gate: Gate::new(),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Producer side of the single-slot snapshot channel
///
/// A full slot is emptied before sending, so the dispatcher always finds the
/// most recent message.
struct Mailbox {
    tx: Sender<WorkerMessage>,
    drain: Receiver<WorkerMessage>,
}

impl Mailbox {
    fn post(&self, message: WorkerMessage) {
        let mut message = message;
        loop {
            match self.tx.try_send(message) {
                Ok(()) => return,
                Err(TrySendError::Full(back)) => {
                    // Dropping the stale message, the dispatcher may also have taken it
                    let _ = self.drain.try_recv();
                    message = back;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}

/// Everything the supervisor needs to spawn its threads
struct Pending {
    graph: GraphSnapshot,
    settings: LayoutSettings,
    sink: Arc<dyn SnapshotSink>,
    config: WorkerConfig,
    build: AlgorithmBuilder,
}

/// [`Supervisor`] running an iterative layout on a dedicated thread
///
/// The worker thread steps the algorithm and posts snapshots to a dispatcher
/// thread, which forwards them to the sink. Neither thread is joined: after
/// `kill` they exit at their next check.
pub struct WorkerSupervisor {
    layout: String,
    state: SupervisorState,
    pending: Option<Pending>,
    shared: Arc<Shared>,
    control: Option<Sender<Control>>,
}

impl WorkerSupervisor {
    pub fn new(request: SupervisorRequest, build: AlgorithmBuilder) -> Self {
        let SupervisorRequest {
            layout,
            graph,
            settings,
            sink,
            config,
        } = request;
        Self {
            layout,
            state: SupervisorState::Idle,
            pending: Some(Pending {
                graph,
                settings,
                sink,
                config,
                build,
            }),
            shared: Arc::new(Shared::new()),
            control: None,
        }
    }

    fn spawn(&mut self, pending: Pending) -> std::io::Result<()> {
        let Pending {
            graph,
            settings,
            sink,
            config,
            build,
        } = pending;
        let (control_tx, control_rx) = channel::unbounded();
        let (snapshot_tx, snapshot_rx) = channel::bounded(1);

        let shared = self.shared.clone();
        let failure_sink = sink.clone();
        let receiver = snapshot_rx.clone();
        thread::Builder::new()
            .name(format!("{}-dispatch", self.layout))
            .spawn(move || dispatch(receiver, sink, shared))?;

        let mailbox = Mailbox {
            tx: snapshot_tx,
            drain: snapshot_rx,
        };
        let shared = self.shared.clone();
        let layout = self.layout.clone();
        let spawned = thread::Builder::new()
            .name(format!("{}-worker", self.layout))
            .spawn(move || work(layout, graph, build, config, control_rx, mailbox, shared));
        if let Err(e) = spawned {
            // The dispatcher exits once the mailbox above is dropped
            failure_sink.failed(&e.to_string());
            return Err(e);
        }

        // The worker holds the receiver until it exits, a failed send means it already did
        let _ = control_tx.send(Control::Init(settings));
        self.control = Some(control_tx);
        Ok(())
    }
}

impl Supervisor for WorkerSupervisor {
    fn start(&mut self) {
        if self.state != SupervisorState::Idle {
            warn!("Layout {}: start ignored in state {}", self.layout, self.state());
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };
        match self.spawn(pending) {
            Ok(()) => {
                debug!("Layout {}: Idle -> Running", self.layout);
                self.state = SupervisorState::Running;
            }
            Err(e) => {
                error!("Layout {}: cannot spawn worker: {e}", self.layout);
                self.state = SupervisorState::Crashed;
            }
        }
    }

    fn stop(&mut self) {
        let state = self.state();
        if state != SupervisorState::Running {
            debug!("Layout {}: stop ignored in state {state}", self.layout);
            return;
        }
        if let Some(control) = &self.control {
            let _ = control.send(Control::Stop);
        }
        debug!("Layout {}: Running -> Stopped", self.layout);
        self.state = SupervisorState::Stopped;
    }

    fn kill(&mut self) {
        let state = self.state();
        if !matches!(state, SupervisorState::Idle | SupervisorState::Running) {
            return;
        }
        self.shared.cancelled.store(true, Ordering::Release);
        if let Some(control) = self.control.take() {
            let _ = control.send(Control::Kill);
        }
        self.shared.gate.close();
        self.pending = None;
        debug!("Layout {}: {state} -> Killed", self.layout);
        self.state = SupervisorState::Killed;
    }

    fn state(&self) -> SupervisorState {
        match self.state {
            SupervisorState::Running => match self.shared.outcome.load(Ordering::Acquire) {
                COMPLETED => SupervisorState::Stopped,
                CRASHED => SupervisorState::Crashed,
                _ => SupervisorState::Running,
            },
            // A step in flight when stopped may still fail
            SupervisorState::Stopped if self.shared.outcome.load(Ordering::Acquire) == CRASHED => {
                SupervisorState::Crashed
            }
            state => state,
        }
    }
}

impl Drop for WorkerSupervisor {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Dispatcher thread body
fn dispatch(rx: Receiver<WorkerMessage>, sink: Arc<dyn SnapshotSink>, shared: Arc<Shared>) {
    for message in rx.iter() {
        if shared.is_cancelled() {
            break;
        }
        let delivered = shared.gate.deliver(|| match message {
            WorkerMessage::Snapshot(snapshot) => sink.snapshot(snapshot),
            WorkerMessage::Failed(reason) => sink.failed(&reason),
        });
        if !delivered {
            break;
        }
    }
}

/// Worker thread body
fn work(
    layout: String,
    graph: GraphSnapshot,
    build: AlgorithmBuilder,
    config: WorkerConfig,
    control: Receiver<Control>,
    mailbox: Mailbox,
    shared: Arc<Shared>,
) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        iterate(&graph, &build, &config, &control, &mailbox, &shared)
    }));
    // The outcome is published before the last message so that sinks see a
    // settled supervisor state
    match outcome {
        Ok(Ok(last)) => {
            debug!("Layout {layout}: worker finished");
            shared.outcome.store(COMPLETED, Ordering::Release);
            if let Some(snapshot) = last {
                mailbox.post(WorkerMessage::Snapshot(snapshot));
            }
        }
        Ok(Err(e)) => crashed(&layout, format!("{e:#}"), &mailbox, &shared),
        Err(payload) => crashed(
            &layout,
            format!("panicked: {}", panic_message(payload.as_ref())),
            &mailbox,
            &shared,
        ),
    }
}

fn crashed(layout: &str, reason: String, mailbox: &Mailbox, shared: &Shared) {
    if !shared.is_cancelled() {
        error!("Layout {layout}: worker crashed: {reason}");
    }
    shared.outcome.store(CRASHED, Ordering::Release);
    mailbox.post(WorkerMessage::Failed(reason));
}

/// Step the algorithm until stopped, killed or converged
///
/// Returns the final snapshot, or `None` when killed.
fn iterate(
    graph: &GraphSnapshot,
    build: &AlgorithmBuilder,
    config: &WorkerConfig,
    control: &Receiver<Control>,
    mailbox: &Mailbox,
    shared: &Shared,
) -> Result<Option<LayoutSnapshot>> {
    let settings = match control.recv() {
        Ok(Control::Init(settings)) => settings,
        _ => return Ok(None),
    };
    let mut algorithm = build(graph, &settings).context("cannot initialize the layout")?;
    let every = config.emit_every.max(1);
    let idle = config.idle();
    let mut iteration = 0;

    let snapshot = |iteration, is_final, mapping| LayoutSnapshot {
        mapping,
        iteration,
        is_final,
    };

    loop {
        if shared.is_cancelled() {
            return Ok(None);
        }
        match control.try_recv() {
            Ok(Control::Stop) => return Ok(Some(snapshot(iteration, true, algorithm.mapping()))),
            Ok(Control::Kill) | Err(TryRecvError::Disconnected) => return Ok(None),
            Ok(Control::Init(_)) => warn!("Worker already initialized"),
            Err(TryRecvError::Empty) => {}
        }

        let progress = algorithm
            .step(graph)
            .with_context(|| format!("step {iteration} failed"))?;
        iteration += 1;
        if progress == Progress::Converged {
            return Ok(Some(snapshot(iteration, true, algorithm.mapping())));
        }
        if iteration % every == 0 {
            let intermediate = snapshot(iteration, false, algorithm.mapping());
            mailbox.post(WorkerMessage::Snapshot(intermediate));
        }
        if !idle.is_zero() {
            thread::sleep(idle);
        }
    }
}
