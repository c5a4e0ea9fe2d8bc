use crate::config::ScriptConfig;
use crate::script::ScriptFunction;
use crate::{LayoutEngine, LayoutMapping, LayoutParameter, LayoutSettings, SyncLayout};
use anyhow::{Context, Result};
use graphwerk_graph::Graph;

pub const ID: &str = "script";

const DEFAULT_FUNCTION: &str = r#"function nodeCoordinates(id, attributes, index, graph) {
  // Archimedean spiral, one turn every ten nodes
  var angle = index * Math.PI / 5;
  var radius = 1 + index / 10;
  return { x: radius * Math.cos(angle), y: radius * Math.sin(angle) };
}"#;

const FUNCTION_DOC: &str = r#"Compute the position of one node.

@param {string} id - the node id
@param {Object} attributes - the node attributes
@param {number} index - rank of the node in the node list
@param {Object} graph - { order, size, nodes, edges } of the whole graph
@returns {{x: number, y: number}} finite coordinates"#;

/// Positions computed node by node by a user function
#[derive(Debug, Clone, Default)]
pub struct ScriptEngine {
    config: ScriptConfig,
}

impl ScriptEngine {
    pub fn new(config: ScriptConfig) -> Self {
        Self { config }
    }
}

pub fn default_function() -> ScriptFunction {
    ScriptFunction::new(DEFAULT_FUNCTION)
}

pub fn layout(config: &ScriptConfig) -> SyncLayout {
    SyncLayout::new(ID, ScriptEngine::new(config.clone()))
        .described()
        .with_parameter(LayoutParameter::script(
            "script",
            default_function(),
            FUNCTION_DOC,
        ))
}

impl LayoutEngine for ScriptEngine {
    fn layout(&self, graph: &dyn Graph, settings: &LayoutSettings) -> Result<LayoutMapping> {
        let function = settings
            .script("script")
            .context("no positioning function in settings")?;
        function.evaluate(graph, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ScriptGuard;
    use graphwerk_graph::{DataGraph, ItemData};
    use test_log::test;

    fn graph() -> DataGraph {
        let mut graph = DataGraph::new();
        for i in 0..12 {
            graph.add_node(format!("n{i}"), ItemData::new()).unwrap();
        }
        graph
    }

    #[test]
    fn default_function_passes_the_guard() {
        assert_eq!(
            ScriptGuard::default().check(&default_function(), &graph()),
            Ok(())
        );
    }

    #[test]
    fn default_function_draws_a_spiral() {
        let graph = graph();
        let settings = LayoutSettings::new().with("script", default_function());
        let mapping = ScriptEngine::default().layout(&graph, &settings).unwrap();
        assert_eq!(mapping.check_covers(&graph), Ok(()));
        assert!((mapping["n0"].x - 1.0).abs() < 1e-9);
        assert!(mapping["n11"].x.hypot(mapping["n11"].y) > mapping["n1"].x.hypot(mapping["n1"].y));
    }

    #[test]
    fn missing_function_is_an_error() {
        assert!(ScriptEngine::default()
            .layout(&graph(), &LayoutSettings::new())
            .is_err());
    }
}
