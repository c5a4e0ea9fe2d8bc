use crate::config::WorkerConfig;
use crate::supervisor::{SnapshotSink, Supervisor, WorkerSupervisor};
use crate::{IterativeLayout, LayoutEngine, LayoutMapping, LayoutParameter, LayoutSettings};
use anyhow::Result;
use enum_dispatch::enum_dispatch;
use graphwerk_graph::{Graph, GraphSnapshot};
use std::fmt;
use std::sync::Arc;

/// Builds the algorithm state of a worker layout from validated settings
pub type AlgorithmBuilder =
    Arc<dyn Fn(&GraphSnapshot, &LayoutSettings) -> Result<Box<dyn IterativeLayout>> + Send + Sync>;

/// Constructor capability of a worker layout
pub type SupervisorFactory = Arc<dyn Fn(SupervisorRequest) -> Box<dyn Supervisor> + Send + Sync>;

/// Everything a supervisor is bound to at construction
pub struct SupervisorRequest {
    pub layout: String,
    pub graph: GraphSnapshot,
    pub settings: LayoutSettings,
    pub sink: Arc<dyn SnapshotSink>,
    pub config: WorkerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Sync,
    Worker,
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutKind::Sync => f.pad("sync"),
            LayoutKind::Worker => f.pad("worker"),
        }
    }
}

/// Action offered next to a layout's settings form
///
/// Pressing it replaces the current settings with ones computed from them
/// and from the graph, e.g. values tuned to the graph's size.
#[derive(Clone)]
pub struct LayoutButton {
    pub id: String,
    pub description: bool,
    get_settings: Arc<dyn Fn(&LayoutSettings, &dyn Graph) -> LayoutSettings + Send + Sync>,
}

impl LayoutButton {
    pub fn new(
        id: impl Into<String>,
        get_settings: impl Fn(&LayoutSettings, &dyn Graph) -> LayoutSettings + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            description: false,
            get_settings: Arc::new(get_settings),
        }
    }

    pub fn described(mut self) -> Self {
        self.description = true;
        self
    }

    pub fn settings(&self, current: &LayoutSettings, graph: &dyn Graph) -> LayoutSettings {
        (self.get_settings)(current, graph)
    }
}

impl fmt::Debug for LayoutButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutButton")
            .field("id", &self.id)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Presentation data shared by both layout kinds
#[derive(Debug, Clone)]
struct LayoutInfo {
    id: String,
    description: bool,
    parameters: Vec<LayoutParameter>,
    buttons: Vec<LayoutButton>,
}

impl LayoutInfo {
    fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: false,
            parameters: Vec::new(),
            buttons: Vec::new(),
        }
    }
}

/// Query surface common to every layout descriptor
#[enum_dispatch]
pub trait LayoutDescriptor {
    fn id(&self) -> &str;
    fn description(&self) -> bool;
    fn parameters(&self) -> &[LayoutParameter];
    fn buttons(&self) -> &[LayoutButton];
    fn kind(&self) -> LayoutKind;
}

/// Layout computed in one blocking call on the caller's thread
#[derive(Clone)]
pub struct SyncLayout {
    info: LayoutInfo,
    engine: Arc<dyn LayoutEngine>,
}

impl SyncLayout {
    pub fn new(id: impl Into<String>, engine: impl LayoutEngine + 'static) -> Self {
        Self {
            info: LayoutInfo::new(id),
            engine: Arc::new(engine),
        }
    }

    pub fn from_fn(
        id: impl Into<String>,
        run: impl Fn(&dyn Graph, &LayoutSettings) -> Result<LayoutMapping> + Send + Sync + 'static,
    ) -> Self {
        Self::new(id, run)
    }

    pub fn described(mut self) -> Self {
        self.info.description = true;
        self
    }

    pub fn with_parameter(mut self, parameter: LayoutParameter) -> Self {
        self.info.parameters.push(parameter);
        self
    }

    pub fn with_button(mut self, button: LayoutButton) -> Self {
        self.info.buttons.push(button);
        self
    }

    /// Run the algorithm, settings must already be validated
    pub fn run(&self, graph: &dyn Graph, settings: &LayoutSettings) -> Result<LayoutMapping> {
        self.engine.layout(graph, settings)
    }
}

impl LayoutDescriptor for SyncLayout {
    fn id(&self) -> &str {
        &self.info.id
    }

    fn description(&self) -> bool {
        self.info.description
    }

    fn parameters(&self) -> &[LayoutParameter] {
        &self.info.parameters
    }

    fn buttons(&self) -> &[LayoutButton] {
        &self.info.buttons
    }

    fn kind(&self) -> LayoutKind {
        LayoutKind::Sync
    }
}

impl fmt::Debug for SyncLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncLayout")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Layout computed on a background worker under a [`Supervisor`]
#[derive(Clone)]
pub struct WorkerLayout {
    info: LayoutInfo,
    factory: SupervisorFactory,
}

impl WorkerLayout {
    pub fn new(
        id: impl Into<String>,
        factory: impl Fn(SupervisorRequest) -> Box<dyn Supervisor> + Send + Sync + 'static,
    ) -> Self {
        Self {
            info: LayoutInfo::new(id),
            factory: Arc::new(factory),
        }
    }

    /// Worker layout running an [`IterativeLayout`] under a [`WorkerSupervisor`]
    pub fn iterative(
        id: impl Into<String>,
        build: impl Fn(&GraphSnapshot, &LayoutSettings) -> Result<Box<dyn IterativeLayout>>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        let build: AlgorithmBuilder = Arc::new(build);
        Self::new(id, move |request| {
            Box::new(WorkerSupervisor::new(request, build.clone()))
        })
    }

    pub fn described(mut self) -> Self {
        self.info.description = true;
        self
    }

    pub fn with_parameter(mut self, parameter: LayoutParameter) -> Self {
        self.info.parameters.push(parameter);
        self
    }

    pub fn with_button(mut self, button: LayoutButton) -> Self {
        self.info.buttons.push(button);
        self
    }

    /// Build an idle supervisor bound to `graph` and validated `settings`
    pub fn supervisor(
        &self,
        graph: GraphSnapshot,
        settings: LayoutSettings,
        sink: Arc<dyn SnapshotSink>,
        config: &WorkerConfig,
    ) -> Box<dyn Supervisor> {
        (self.factory)(SupervisorRequest {
            layout: self.info.id.clone(),
            graph,
            settings,
            sink,
            config: config.clone(),
        })
    }
}

impl LayoutDescriptor for WorkerLayout {
    fn id(&self) -> &str {
        &self.info.id
    }

    fn description(&self) -> bool {
        self.info.description
    }

    fn parameters(&self) -> &[LayoutParameter] {
        &self.info.parameters
    }

    fn buttons(&self) -> &[LayoutButton] {
        &self.info.buttons
    }

    fn kind(&self) -> LayoutKind {
        LayoutKind::Worker
    }
}

impl fmt::Debug for WorkerLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerLayout")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// A registered layout, one variant per execution model
#[enum_dispatch(LayoutDescriptor)]
#[derive(Debug, Clone)]
pub enum Layout {
    Sync(SyncLayout),
    Worker(WorkerLayout),
}
