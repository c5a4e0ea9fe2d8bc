use anyhow::{anyhow, bail, Context, Result};
use graphwerk_graph::{DataGraph, GraphDocument};
use graphwerk_layout::{
    LatestSnapshot, Layout, LayoutController, LayoutDescriptor, LayoutKind, LayoutMapping,
    LayoutSettings, ParameterKind,
};
use std::fmt::Write;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Time granted to a stopped worker to deliver its final snapshot
const FINAL_SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(5);

/// One line per registered layout
pub fn list(controller: &LayoutController) -> String {
    controller.layouts().fold(String::new(), |mut out, layout| {
        let _ = writeln!(
            out,
            "{:<12}{:<8}{} parameters",
            layout.id(),
            layout.kind(),
            layout.parameters().len()
        );
        out
    })
}

/// Parameters and buttons of one layout
pub fn describe(layout: &Layout) -> String {
    let mut out = format!("{} ({} layout)\n", layout.id(), layout.kind());
    for parameter in layout.parameters() {
        let details = match &parameter.kind {
            ParameterKind::Boolean { default } => format!("boolean, default {default}"),
            ParameterKind::Number(number) => {
                let mut details = format!("number, default {}", number.default);
                if let Some(min) = number.min {
                    let _ = write!(details, ", min {min}");
                }
                if let Some(max) = number.max {
                    let _ = write!(details, ", max {max}");
                }
                details
            }
            ParameterKind::Attribute {
                item_type,
                restriction,
            } => match restriction {
                Some(restriction) => format!("{restriction} attribute of {item_type}"),
                None => format!("attribute of {item_type}"),
            },
            ParameterKind::Script(script) => format!("script\n{}", script.function_doc),
        };
        let required = if parameter.required { " (required)" } else { "" };
        let _ = writeln!(out, "  {}{required}: {details}", parameter.id);
    }
    for button in layout.buttons() {
        let _ = writeln!(out, "  [{}]", button.id);
    }
    out
}

/// Split a `key=value` command line assignment
pub fn parse_assignment(text: &str) -> Result<(String, String)> {
    let (key, value) = text
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value, got {text:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("missing parameter name in {text:?}");
    }
    Ok((key.to_string(), value.to_string()))
}

/// Partial settings from command line assignments
pub fn parse_settings(layout: &Layout, assignments: &[(String, String)]) -> Result<LayoutSettings> {
    let mut settings = LayoutSettings::new();
    for (key, text) in assignments {
        let parameter = layout
            .parameters()
            .iter()
            .find(|parameter| &parameter.id == key)
            .ok_or_else(|| anyhow!("layout {} has no parameter {key:?}", layout.id()))?;
        settings.insert(key.clone(), parameter.parse_value(text)?);
    }
    Ok(settings)
}

pub fn load_graph(path: &Path) -> Result<DataGraph> {
    let text =
        fs::read_to_string(path).with_context(|| format!("cannot read graph {}", path.display()))?;
    let document: GraphDocument = serde_json::from_str(&text)
        .with_context(|| format!("invalid graph document {}", path.display()))?;
    Ok(DataGraph::try_from(document)?)
}

pub struct RunRequest<'a> {
    pub layout: &'a str,
    pub graph: &'a DataGraph,
    pub assignments: &'a [(String, String)],
    pub button: Option<&'a str>,
    /// How long a worker layout may run before being stopped
    pub duration: Duration,
}

/// Compute a layout and return its final mapping
pub fn run(controller: &mut LayoutController, request: RunRequest<'_>) -> Result<LayoutMapping> {
    let layout = controller.layout(request.layout)?;
    let kind = layout.kind();
    let mut partial = parse_settings(layout, request.assignments)?;
    if let Some(button) = request.button {
        partial = controller.apply_button(request.layout, button, &partial, request.graph)?;
    }

    match kind {
        LayoutKind::Sync => Ok(controller.run_sync(request.layout, request.graph, &partial)?),
        LayoutKind::Worker => {
            let sink = Arc::new(LatestSnapshot::new());
            controller.start_worker(request.layout, request.graph, &partial, sink.clone())?;

            let converged = sink
                .wait_final(request.duration)
                .filter(|snapshot| snapshot.is_final);
            let last = match converged {
                Some(snapshot) => Some(snapshot),
                None if sink.failure().is_some() => None,
                None => {
                    info!("Stopping {} after {:?}", request.layout, request.duration);
                    controller.stop();
                    sink.wait_final(FINAL_SNAPSHOT_TIMEOUT)
                }
            };
            controller.reset();

            if let Some(reason) = sink.failure() {
                bail!("layout {} crashed: {reason}", request.layout);
            }
            let last =
                last.ok_or_else(|| anyhow!("layout {} produced no positions", request.layout))?;
            if !last.is_final {
                warn!("Layout {} did not deliver a final snapshot", request.layout);
            }
            Ok(last.mapping)
        }
    }
}
