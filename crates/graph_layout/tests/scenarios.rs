use graphwerk_graph::{DataGraph, Graph, ItemData, Scalar};
use graphwerk_layout::{
    LatestSnapshot, LayoutConfig, LayoutController, LayoutDescriptor, LayoutError, LayoutKind,
    LayoutMapping, LayoutParameter, LayoutRegistry, LayoutSettings, NumberParameter,
    ParameterValue, Point, RegistryError, ScriptFunction, ScriptValidationError, SupervisorState,
    SyncLayout, ValidationReason,
};
use std::sync::Arc;
use std::time::Duration;
use test_log::test;

/// Small DAG with a numeric and a textual attribute on nodes and edges
fn graph() -> DataGraph {
    let mut graph = DataGraph::new();
    let groups = ["left", "left", "right", "right", "right", "left"];
    for (i, group) in groups.iter().enumerate() {
        let mut data = ItemData::new();
        data.insert("group".into(), Scalar::from(*group));
        data.insert("size".into(), Scalar::from(i as f64 + 1.0));
        graph.add_node(format!("n{i}"), data).unwrap();
    }
    let edges = [(0, 1), (0, 2), (1, 3), (2, 3), (3, 4), (1, 5)];
    for (i, (source, target)) in edges.iter().enumerate() {
        let mut data = ItemData::new();
        data.insert("weight".into(), Scalar::from(format!("{}", i + 1)));
        data.insert("kind".into(), Scalar::from("link"));
        graph
            .add_edge(
                format!("e{i}"),
                &format!("n{source}"),
                &format!("n{target}"),
                data,
            )
            .unwrap();
    }
    graph
}

fn controller() -> LayoutController {
    let config = LayoutConfig::default();
    let mut registry = LayoutRegistry::with_builtins(&config).unwrap();
    registry
        .register(
            SyncLayout::from_fn("bounded", |graph: &dyn Graph, settings: &LayoutSettings| {
                let param = settings.number("param").unwrap_or_default();
                Ok(graph
                    .node_ids()
                    .map(|id| (id.to_string(), Point::new(param, param)))
                    .collect::<LayoutMapping>())
            })
            .with_parameter(LayoutParameter::number(
                "param",
                NumberParameter::new(5.0).min(0.0).max(10.0),
            )),
        )
        .unwrap();
    LayoutController::new(Arc::new(registry), config)
}

#[test]
fn number_parameters_default_and_reject_out_of_bounds() {
    let controller = controller();
    let graph = graph();

    let settings = controller
        .validate("bounded", &graph, &LayoutSettings::new())
        .unwrap();
    assert_eq!(settings, LayoutSettings::new().with("param", 5.0));

    let err = controller
        .validate("bounded", &graph, &LayoutSettings::new().with("param", 15.0))
        .unwrap_err();
    match err {
        LayoutError::Validation(err) => {
            assert_eq!(err.parameter, "param");
            assert!(matches!(err.reason, ValidationReason::OutOfBounds { .. }));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn every_sync_builtin_positions_exactly_the_graph_nodes() {
    let mut controller = controller();
    let graph = graph();
    let sync: Vec<String> = controller
        .layouts()
        .filter(|layout| layout.kind() == LayoutKind::Sync)
        .map(|layout| layout.id().to_string())
        .collect();
    assert_eq!(sync.len(), 6);

    for id in sync {
        let mapping = controller
            .run_sync(&id, &graph, &LayoutSettings::new())
            .unwrap_or_else(|e| panic!("{id}: {e}"));
        assert_eq!(mapping.check_covers(&graph), Ok(()), "{id}");
        assert!(mapping.values().all(Point::is_finite), "{id}");
    }
}

#[test]
fn sync_layouts_on_an_empty_graph() {
    let mut controller = controller();
    for id in ["random", "circular", "circlepack", "layered", "script"] {
        let mapping = controller
            .run_sync(id, &DataGraph::new(), &LayoutSettings::new())
            .unwrap();
        assert!(mapping.is_empty(), "{id}");
    }
}

#[test]
fn quantitative_attribute_rejects_textual_fields() {
    let controller = controller();
    let graph = graph();

    let partial = LayoutSettings::new().with("edgeWeight", ParameterValue::Attribute("kind".into()));
    let err = controller.validate("force", &graph, &partial).unwrap_err();
    assert!(
        matches!(&err, LayoutError::Validation(e) if e.parameter == "edgeWeight"),
        "{err:?}"
    );

    // Numeric strings count as quantitative
    let partial =
        LayoutSettings::new().with("edgeWeight", ParameterValue::Attribute("weight".into()));
    assert!(controller.validate("force", &graph, &partial).is_ok());
}

#[test]
fn grouping_attribute_is_applied() {
    let mut controller = controller();
    let graph = graph();
    let partial =
        LayoutSettings::new().with("groupingAttribute", ParameterValue::Attribute("group".into()));
    let mapping = controller.run_sync("circlepack", &graph, &partial).unwrap();
    assert_eq!(mapping.len(), graph.order());
}

#[test]
fn invalid_scripts_are_rejected_before_running() {
    let mut controller = controller();
    let partial = LayoutSettings::new().with(
        "script",
        ScriptFunction::new("function (a, b, c, d, e) { return { x: 0, y: 0 }; }"),
    );
    let err = controller
        .run_sync("script", &graph(), &partial)
        .unwrap_err();
    match err {
        LayoutError::Validation(err) => assert_eq!(
            err.reason,
            ValidationReason::Script(ScriptValidationError::TooManyParameters(5))
        ),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn user_scripts_position_nodes() {
    let mut controller = controller();
    let partial = LayoutSettings::new().with(
        "script",
        ScriptFunction::new("function (id, attributes) { return { x: attributes.size, y: -attributes.size }; }"),
    );
    let mapping = controller.run_sync("script", &graph(), &partial).unwrap();
    assert_eq!(mapping["n2"], Point::new(3.0, -3.0));
}

#[test]
fn layered_layout_fails_on_cycles() {
    let mut controller = controller();
    let mut graph = graph();
    graph.add_edge("back", "n4", "n0", ItemData::new()).unwrap();
    let err = controller
        .run_sync("layered", &graph, &LayoutSettings::new())
        .unwrap_err();
    assert!(matches!(err, LayoutError::Algorithm(ref e) if e.layout == "layered"), "{err}");
}

#[test]
fn kinds_are_checked() {
    let mut controller = controller();
    let graph = graph();

    let err = controller
        .run_sync("force", &graph, &LayoutSettings::new())
        .unwrap_err();
    assert!(matches!(
        err,
        LayoutError::WrongKind {
            expected: LayoutKind::Sync,
            actual: LayoutKind::Worker,
            ..
        }
    ));

    let sink = Arc::new(LatestSnapshot::new());
    let err = controller
        .start_worker("circular", &graph, &LayoutSettings::new(), sink)
        .unwrap_err();
    assert!(matches!(err, LayoutError::WrongKind { .. }));

    let err = controller
        .run_sync("nope", &graph, &LayoutSettings::new())
        .unwrap_err();
    assert!(matches!(
        err,
        LayoutError::Registry(RegistryError::NotFound(ref id)) if id == "nope"
    ));
}

#[test]
fn buttons_compute_settings() {
    let controller = controller();
    let graph = graph();

    let settings = controller
        .apply_button("force", "autoSettings", &LayoutSettings::new(), &graph)
        .unwrap();
    assert_eq!(settings.number("repulsion"), Some(60.0));
    assert!(controller.validate("force", &graph, &settings).is_ok());

    let err = controller
        .apply_button("force", "missing", &LayoutSettings::new(), &graph)
        .unwrap_err();
    assert!(matches!(err, LayoutError::UnknownButton { .. }));
}

#[test]
fn default_settings_skip_attributes() {
    let controller = controller();
    let settings = controller.default_settings("force").unwrap();
    assert_eq!(settings.number("maxIterations"), Some(500.0));
    assert_eq!(settings.attribute("edgeWeight"), None);
}

#[test]
fn worker_lifecycle_through_the_controller() {
    let mut controller = controller();
    let graph = graph();
    let sink = Arc::new(LatestSnapshot::new());
    let partial = LayoutSettings::new().with("maxIterations", 1_000_000.0);

    controller
        .start_worker("force", &graph, &partial, sink.clone())
        .unwrap();
    assert!(controller.is_running());
    assert_eq!(controller.worker(), Some(("force", SupervisorState::Running)));

    controller.stop();
    assert!(!controller.is_running());
    let last = sink.wait_final(Duration::from_secs(5)).unwrap();
    assert!(last.is_final);
    assert_eq!(last.mapping.check_covers(&graph), Ok(()));

    controller.reset();
    assert_eq!(controller.worker(), None);
}

#[test]
fn force_layout_converges_on_its_own() {
    let mut controller = controller();
    let graph = graph();
    let sink = Arc::new(LatestSnapshot::new());
    let partial = LayoutSettings::new().with("maxIterations", 20.0);

    controller
        .start_worker("force", &graph, &partial, sink.clone())
        .unwrap();
    let last = sink.wait_final(Duration::from_secs(5)).unwrap();
    assert!(last.is_final);
    assert!(last.iteration <= 20);
    assert_eq!(
        controller.worker().map(|(_, state)| state),
        Some(SupervisorState::Stopped)
    );
}

#[test]
fn running_another_layout_kills_the_worker() {
    let mut controller = controller();
    let graph = graph();
    let first = Arc::new(LatestSnapshot::new());
    let partial = LayoutSettings::new().with("maxIterations", 1_000_000.0);

    controller
        .start_worker("force", &graph, &partial, first.clone())
        .unwrap();
    controller
        .run_sync("circular", &graph, &LayoutSettings::new())
        .unwrap();
    assert!(!controller.is_running());
    assert_eq!(
        controller.worker().map(|(_, state)| state),
        Some(SupervisorState::Killed)
    );

    let seen = first.latest().map(|snapshot| snapshot.iteration);
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(first.latest().map(|snapshot| snapshot.iteration), seen);
}

#[test]
fn validation_failures_leave_the_worker_alone() {
    let mut controller = controller();
    let graph = graph();
    let sink = Arc::new(LatestSnapshot::new());
    let partial = LayoutSettings::new().with("maxIterations", 1_000_000.0);
    controller
        .start_worker("force", &graph, &partial, sink)
        .unwrap();

    let err = controller
        .run_sync("random", &graph, &LayoutSettings::new().with("scale", -1.0))
        .unwrap_err();
    assert!(matches!(err, LayoutError::Validation(_)));
    assert!(controller.is_running());
    controller.kill();
    assert!(!controller.is_running());
}
