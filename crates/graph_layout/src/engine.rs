use crate::{LayoutMapping, LayoutSettings};
use anyhow::Result;
use graphwerk_graph::{Graph, GraphSnapshot};

/// A layout algorithm that computes all positions in one blocking call
///
/// Settings given to [`LayoutEngine::layout`] have already been validated
/// against the layout's parameter list.
pub trait LayoutEngine: Send + Sync {
    /// Compute a position for every node of `graph`
    ///
    /// # Errors
    /// Returns an error if the algorithm cannot lay out this graph (e.g. a
    /// cycle for DAG layouts, or a failing user script)
    fn layout(&self, graph: &dyn Graph, settings: &LayoutSettings) -> Result<LayoutMapping>;
}

// Blanket implementation for closures
impl<F> LayoutEngine for F
where
    F: Fn(&dyn Graph, &LayoutSettings) -> Result<LayoutMapping> + Send + Sync,
{
    fn layout(&self, graph: &dyn Graph, settings: &LayoutSettings) -> Result<LayoutMapping> {
        self(graph, settings)
    }
}

/// Outcome of one step of an iterative layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Running,
    /// Positions won't meaningfully change anymore
    Converged,
}

/// A layout algorithm advanced step by step on a background worker
pub trait IterativeLayout: Send {
    /// Advance the computation by one step
    fn step(&mut self, graph: &GraphSnapshot) -> Result<Progress>;

    /// Current positions
    fn mapping(&self) -> LayoutMapping;
}
