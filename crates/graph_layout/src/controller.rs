use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::executor;
use crate::params::{self, LayoutSettings};
use crate::supervisor::{SnapshotSink, Supervisor, SupervisorState};
use crate::{Layout, LayoutDescriptor, LayoutKind, LayoutMapping, LayoutRegistry};
use graphwerk_graph::{Graph, GraphSnapshot};
use std::sync::Arc;
use tracing::{debug, info};

struct ActiveWorker {
    layout: String,
    supervisor: Box<dyn Supervisor>,
}

/// Entry point of the application into the layout framework
///
/// Validates settings before any computation and keeps at most one worker
/// alive: running any layout kills the previous worker first.
pub struct LayoutController {
    registry: Arc<LayoutRegistry>,
    config: LayoutConfig,
    active: Option<ActiveWorker>,
}

impl LayoutController {
    pub fn new(registry: Arc<LayoutRegistry>, config: LayoutConfig) -> Self {
        Self {
            registry,
            config,
            active: None,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn layouts(&self) -> impl Iterator<Item = &Layout> + '_ {
        self.registry.list()
    }

    pub fn layout(&self, id: &str) -> Result<&Layout, LayoutError> {
        Ok(self.registry.resolve(id)?)
    }

    /// Default settings of a layout, to seed or reset a settings form
    pub fn default_settings(&self, id: &str) -> Result<LayoutSettings, LayoutError> {
        Ok(params::defaults(self.layout(id)?.parameters()))
    }

    pub fn validate(
        &self,
        id: &str,
        graph: &dyn Graph,
        partial: &LayoutSettings,
    ) -> Result<LayoutSettings, LayoutError> {
        let layout = self.layout(id)?;
        Ok(params::validate(
            layout.parameters(),
            graph,
            partial,
            &self.config,
        )?)
    }

    /// Settings suggested by one of the layout's buttons
    pub fn apply_button(
        &self,
        id: &str,
        button: &str,
        settings: &LayoutSettings,
        graph: &dyn Graph,
    ) -> Result<LayoutSettings, LayoutError> {
        let layout = self.layout(id)?;
        let button = layout
            .buttons()
            .iter()
            .find(|candidate| candidate.id == button)
            .ok_or_else(|| LayoutError::UnknownButton {
                layout: id.to_string(),
                button: button.to_string(),
            })?;
        Ok(button.settings(settings, graph))
    }

    pub fn run_sync(
        &mut self,
        id: &str,
        graph: &dyn Graph,
        partial: &LayoutSettings,
    ) -> Result<LayoutMapping, LayoutError> {
        let registry = self.registry.clone();
        let Layout::Sync(layout) = registry.resolve(id)? else {
            return Err(wrong_kind(id, LayoutKind::Sync, LayoutKind::Worker));
        };
        let settings = params::validate(layout.parameters(), graph, partial, &self.config)?;

        self.kill();
        Ok(executor::run(layout, graph, &settings)?)
    }

    /// Start a worker layout on a snapshot of `graph`
    ///
    /// Snapshots are pushed to `sink` until the worker is stopped, killed,
    /// converges or crashes.
    pub fn start_worker(
        &mut self,
        id: &str,
        graph: &dyn Graph,
        partial: &LayoutSettings,
        sink: Arc<dyn SnapshotSink>,
    ) -> Result<(), LayoutError> {
        let registry = self.registry.clone();
        let Layout::Worker(layout) = registry.resolve(id)? else {
            return Err(wrong_kind(id, LayoutKind::Worker, LayoutKind::Sync));
        };
        let settings = params::validate(layout.parameters(), graph, partial, &self.config)?;

        self.kill();
        let snapshot = GraphSnapshot::capture(graph);
        let mut supervisor = layout.supervisor(snapshot, settings, sink, &self.config.worker);
        supervisor.start();
        info!("Started layout {id} on {} nodes", graph.order());
        self.active = Some(ActiveWorker {
            layout: id.to_string(),
            supervisor,
        });
        Ok(())
    }

    /// Gracefully stop the live worker, which emits a final snapshot
    pub fn stop(&mut self) {
        if let Some(active) = &mut self.active {
            active.supervisor.stop();
        }
    }

    pub fn kill(&mut self) {
        if let Some(active) = &mut self.active {
            debug!("Killing layout {}", active.layout);
            active.supervisor.kill();
        }
    }

    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.supervisor.is_running())
    }

    /// Layout id and state of the last started worker
    pub fn worker(&self) -> Option<(&str, SupervisorState)> {
        self.active
            .as_ref()
            .map(|active| (active.layout.as_str(), active.supervisor.state()))
    }

    /// Kill and forget the last started worker
    pub fn reset(&mut self) {
        self.kill();
        self.active = None;
    }
}

impl Drop for LayoutController {
    fn drop(&mut self) {
        self.kill();
    }
}

fn wrong_kind(id: &str, expected: LayoutKind, actual: LayoutKind) -> LayoutError {
    LayoutError::WrongKind {
        layout: id.to_string(),
        expected,
        actual,
    }
}
