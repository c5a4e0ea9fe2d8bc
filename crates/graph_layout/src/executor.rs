use crate::error::{panic_message, AlgorithmError};
use crate::{LayoutDescriptor, LayoutMapping, LayoutSettings, SyncLayout};
use anyhow::anyhow;
use graphwerk_graph::Graph;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::debug;

/// Run a sync layout to completion on the calling thread
///
/// `settings` must come out of validation. Errors and panics of the
/// algorithm, as well as a mapping that doesn't position exactly the nodes
/// of `graph`, are reported as [`AlgorithmError`]. Nothing is retried.
pub fn run(
    layout: &SyncLayout,
    graph: &dyn Graph,
    settings: &LayoutSettings,
) -> Result<LayoutMapping, AlgorithmError> {
    let failed = |cause: anyhow::Error| AlgorithmError {
        layout: layout.id().to_string(),
        cause,
    };

    let started = Instant::now();
    let mapping = match panic::catch_unwind(AssertUnwindSafe(|| layout.run(graph, settings))) {
        Ok(Ok(mapping)) => mapping,
        Ok(Err(e)) => return Err(failed(e)),
        Err(payload) => {
            return Err(failed(anyhow!(
                "panicked: {}",
                panic_message(payload.as_ref())
            )))
        }
    };
    mapping.check_covers(graph).map_err(|e| failed(e.into()))?;

    debug!(
        "Layout {} positioned {} nodes in {:?}",
        layout.id(),
        mapping.len(),
        started.elapsed()
    );
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;
    use anyhow::bail;
    use graphwerk_graph::{DataGraph, ItemData};
    use test_log::test;

    fn graph() -> DataGraph {
        let mut graph = DataGraph::new();
        graph.add_node("a", ItemData::new()).unwrap();
        graph.add_node("b", ItemData::new()).unwrap();
        graph
    }

    #[test]
    fn returns_the_mapping() {
        let layout = SyncLayout::from_fn("line", |graph, _| {
            Ok(graph
                .node_ids()
                .enumerate()
                .map(|(i, id)| (id.to_string(), Point::new(i as f64, 0.0)))
                .collect())
        });
        let mapping = run(&layout, &graph(), &LayoutSettings::new()).unwrap();
        assert_eq!(mapping["b"], Point::new(1.0, 0.0));
    }

    #[test]
    fn errors_keep_their_cause() {
        let layout = SyncLayout::from_fn("broken", |_, _| bail!("no luck"));
        let err = run(&layout, &graph(), &LayoutSettings::new()).unwrap_err();
        assert_eq!(err.layout, "broken");
        assert_eq!(err.cause.to_string(), "no luck");
    }

    #[test]
    fn panics_become_errors() {
        let layout = SyncLayout::from_fn("panicky", |_, _| panic!("kaboom"));
        let err = run(&layout, &graph(), &LayoutSettings::new()).unwrap_err();
        assert!(err.to_string().contains("kaboom"), "{err}");
    }

    #[test]
    fn incomplete_mappings_are_rejected() {
        let layout = SyncLayout::from_fn("partial", |_, _| {
            Ok([("a".to_string(), Point::default())].into_iter().collect())
        });
        let err = run(&layout, &graph(), &LayoutSettings::new()).unwrap_err();
        assert!(err.cause.is::<crate::MappingMismatch>());
    }
}
