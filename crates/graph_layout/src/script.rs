//! User-authored positioning functions
//!
//! A script is the JavaScript source of a function expression such as
//! `function (id, attributes, index, graph) { return { x: index, y: 0 }; }`.
//!
//! Scripts run in an embedded `boa_engine` interpreter inside this process,
//! with the same privileges as the rest of the application. [`ScriptGuard`]
//! checks that a function honours the positioning contract before it is
//! accepted into settings; it does not isolate the function from anything.
//! The loop iteration and recursion limits only cut runaway scripts short.

use crate::config::ScriptConfig;
use crate::{LayoutMapping, Point};
use boa_engine::{Context, JsValue, Source};
use graphwerk_graph::{Graph, GraphDocument, ItemData, ItemType};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Highest arity accepted: `(id, attributes, index, graph)`
pub const MAX_PARAMETERS: usize = 4;

const BINDING: &str = "__graphwerk_position";
const CALL: &str = "__graphwerk_call";
const GRAPH: &str = "__graphwerk_graph";

/// Source of a positioning function
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptFunction {
    source: String,
}

/// Reason a script was refused, worded for display next to the editor
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScriptValidationError {
    #[error("the script doesn't compile: {0}")]
    Compile(String),

    #[error("the script must evaluate to a function")]
    NotAFunction,

    #[error("the function declares {0} parameters, at most 4 are allowed")]
    TooManyParameters(usize),

    #[error("the function threw for node {node:?}: {message}")]
    Threw { node: String, message: String },

    #[error("the function returned {returned} for node {node:?}, expected {{x, y}} with finite numbers")]
    InvalidResult { node: String, returned: String },

    #[error("the script was aborted: {0}")]
    Aborted(String),
}

impl ScriptFunction {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Position every node of `graph`
    ///
    /// Nodes are passed in enumeration order, `index` being their rank.
    pub fn evaluate(&self, graph: &dyn Graph, config: &ScriptConfig) -> anyhow::Result<LayoutMapping> {
        let mut runtime = ScriptRuntime::load(self, config)?;
        let nodes: Vec<ScriptNode> = graph
            .node_ids()
            .enumerate()
            .map(|(index, id)| ScriptNode::new(graph, id, index))
            .collect();
        let positions = runtime.run(&ScriptGraph::from_graph(graph), &nodes)?;
        Ok(positions.into_iter().collect())
    }
}

/// Contract check for positioning functions
///
/// A function is accepted when it compiles, evaluates to a function taking
/// at most [`MAX_PARAMETERS`] parameters, and returns finite `{x, y}` for the
/// first `sample_size` nodes of the graph (or for a synthetic node when the
/// graph is empty).
#[derive(Debug, Clone, Default)]
pub struct ScriptGuard {
    config: ScriptConfig,
}

impl ScriptGuard {
    pub fn new(config: ScriptConfig) -> Self {
        Self { config }
    }

    pub fn check(
        &self,
        function: &ScriptFunction,
        graph: &dyn Graph,
    ) -> Result<(), ScriptValidationError> {
        let mut runtime = ScriptRuntime::load(function, &self.config)?;

        let mut sample: Vec<ScriptNode> = graph
            .node_ids()
            .take(self.config.sample_size.max(1))
            .enumerate()
            .map(|(index, id)| ScriptNode::new(graph, id, index))
            .collect();
        if sample.is_empty() {
            sample.push(ScriptNode {
                id: "sample".to_string(),
                attributes: ItemData::new(),
                index: 0,
            });
        }

        runtime.run(&ScriptGraph::from_graph(graph), &sample)?;
        debug!("Script accepted after {} trial calls", sample.len());
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ScriptNode {
    id: String,
    attributes: ItemData,
    index: usize,
}

impl ScriptNode {
    fn new(graph: &dyn Graph, id: &str, index: usize) -> Self {
        Self {
            id: id.to_string(),
            attributes: graph
                .item_data(ItemType::Nodes, id)
                .cloned()
                .unwrap_or_default(),
            index,
        }
    }
}

/// The `graph` argument seen by scripts
#[derive(Debug, Serialize)]
struct ScriptGraph {
    order: usize,
    size: usize,
    #[serde(flatten)]
    document: GraphDocument,
}

impl ScriptGraph {
    fn from_graph(graph: &dyn Graph) -> Self {
        Self {
            order: graph.order(),
            size: graph.size(),
            document: GraphDocument::from_graph(graph),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Outcome {
    Position { x: f64, y: f64 },
    Invalid { invalid: String },
    Threw { threw: String },
}

struct ScriptRuntime {
    context: Context,
}

impl ScriptRuntime {
    fn load(function: &ScriptFunction, config: &ScriptConfig) -> Result<Self, ScriptValidationError> {
        let mut context = Context::default();
        context
            .runtime_limits_mut()
            .set_loop_iteration_limit(config.loop_iteration_limit);
        context
            .runtime_limits_mut()
            .set_recursion_limit(config.recursion_limit);

        let source = function.source().trim().trim_end_matches(';');
        let definition = format!("var {BINDING} = (\n{source}\n);");
        context
            .eval(Source::from_bytes(&definition))
            .map_err(|e| ScriptValidationError::Compile(e.to_string()))?;

        let arity = context
            .eval(Source::from_bytes(&format!(
                "typeof {BINDING} === 'function' ? {BINDING}.length : -1"
            )))
            .map_err(|e| ScriptValidationError::Compile(e.to_string()))?;
        match arity.as_number() {
            Some(n) if n < 0.0 => return Err(ScriptValidationError::NotAFunction),
            Some(n) if n as usize > MAX_PARAMETERS => {
                return Err(ScriptValidationError::TooManyParameters(n as usize))
            }
            Some(_) => {}
            None => return Err(ScriptValidationError::NotAFunction),
        }

        // Loop free, so runtime limits only ever count the user's own code
        let call = format!(
            r#"function {CALL}(node, graph) {{
    function describe(value) {{
        try {{
            var text = JSON.stringify(value);
            return text === undefined ? String(value) : text;
        }} catch (e) {{
            return String(value);
        }}
    }}
    try {{
        var p = {BINDING}(node.id, node.attributes, node.index, graph);
        if (p !== null && typeof p === 'object' && typeof p.x === 'number'
            && typeof p.y === 'number' && isFinite(p.x) && isFinite(p.y)) {{
            return JSON.stringify({{ x: p.x, y: p.y }});
        }}
        return JSON.stringify({{ invalid: describe(p) }});
    }} catch (e) {{
        return JSON.stringify({{ threw: String(e) }});
    }}
}}"#
        );
        context.eval(Source::from_bytes(&call)).map_err(aborted)?;
        Ok(Self { context })
    }

    fn eval(&mut self, code: &str) -> Result<JsValue, ScriptValidationError> {
        self.context.eval(Source::from_bytes(code)).map_err(aborted)
    }

    /// Call the function once per node, stopping at the first failure
    fn run(
        &mut self,
        graph: &ScriptGraph,
        nodes: &[ScriptNode],
    ) -> Result<Vec<(String, Point)>, ScriptValidationError> {
        // JSON is a valid JS expression, so the data is embedded as literals
        let graph = serde_json::to_string(graph).map_err(aborted)?;
        self.eval(&format!("var {GRAPH} = {graph};"))?;

        let mut positions = Vec::with_capacity(nodes.len());
        for node in nodes {
            let argument = serde_json::to_string(node).map_err(aborted)?;
            let text = self
                .eval(&format!("{CALL}({argument}, {GRAPH})"))?
                .as_string()
                .map(|s| s.to_std_string_escaped())
                .ok_or_else(|| ScriptValidationError::Aborted("no result".to_string()))?;

            match serde_json::from_str::<Outcome>(&text).map_err(aborted)? {
                Outcome::Position { x, y } => positions.push((node.id.clone(), Point::new(x, y))),
                Outcome::Invalid { invalid } => {
                    return Err(ScriptValidationError::InvalidResult {
                        node: node.id.clone(),
                        returned: invalid,
                    })
                }
                Outcome::Threw { threw } => {
                    return Err(ScriptValidationError::Threw {
                        node: node.id.clone(),
                        message: threw,
                    })
                }
            }
        }
        Ok(positions)
    }
}

fn aborted(e: impl std::fmt::Display) -> ScriptValidationError {
    ScriptValidationError::Aborted(e.to_string())
}
