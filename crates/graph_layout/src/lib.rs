//! Layout execution framework
//!
//! Layouts compute a 2D position for every node of a graph. They come in
//! two kinds behind one [`Layout`] descriptor:
//!
//! - [`SyncLayout`]: computed in one blocking call, see [`executor::run`]
//! - [`WorkerLayout`]: computed step by step on a background thread under a
//!   [`Supervisor`], pushing intermediate [`LayoutSnapshot`]s to a
//!   [`SnapshotSink`]
//!
//! Each layout declares typed [`LayoutParameter`]s. User settings are
//! completed and checked by [`validate`] before any computation starts.
//!
//! # Example
//!
//! ```
//! use graphwerk_graph::{DataGraph, ItemData};
//! use graphwerk_layout::{LayoutConfig, LayoutController, LayoutRegistry, LayoutSettings};
//! use std::sync::Arc;
//!
//! let mut graph = DataGraph::new();
//! graph.add_node("a", ItemData::new()).unwrap();
//! graph.add_node("b", ItemData::new()).unwrap();
//!
//! let config = LayoutConfig::default();
//! let registry = Arc::new(LayoutRegistry::with_builtins(&config).unwrap());
//! let mut controller = LayoutController::new(registry, config);
//!
//! let settings = LayoutSettings::new().with("scale", 10.0);
//! let mapping = controller.run_sync("circular", &graph, &settings).unwrap();
//! assert_eq!(mapping.len(), 2);
//! ```

mod config;
mod controller;
mod engine;
mod error;
mod geometry;
mod layout;
mod mapping;
mod registry;

pub mod builtin;
pub mod executor;
pub mod params;
pub mod script;
pub mod supervisor;

pub use config::{LayoutConfig, ScriptConfig, ValidationConfig, WorkerConfig};
pub use controller::LayoutController;
pub use engine::{IterativeLayout, LayoutEngine, Progress};
pub use error::{AlgorithmError, LayoutError, RegistryError, ValidationError, ValidationReason};
pub use geometry::{Point, Vec2};
pub use layout::{
    AlgorithmBuilder, Layout, LayoutButton, LayoutDescriptor, LayoutKind, SupervisorFactory,
    SupervisorRequest, SyncLayout, WorkerLayout,
};
pub use mapping::{LayoutMapping, LayoutSnapshot, MappingMismatch};
pub use params::{
    defaults, validate, AttributeRestriction, LayoutParameter, LayoutSettings, NumberParameter,
    ParameterKind, ParameterValue,
};
pub use registry::LayoutRegistry;
pub use script::{ScriptFunction, ScriptGuard, ScriptValidationError};
pub use supervisor::{LatestSnapshot, SnapshotSink, Supervisor, SupervisorState, WorkerSupervisor};
