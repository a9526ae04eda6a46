//! Tests for merging tasks and rewriting their connections.

use crate::dataflow::domain::{
    ConnectionGraph, ConnectionPolicy, DataflowError, PortName, PortPair, TaskId,
};
use crate::merge::{MergeEngine, MergeError};
use crate::model::domain::{
    Capability, CapabilityName, ModelError, PortMapping, PortSet, TaskModel, TaskModelName,
};
use crate::plan::domain::{Plan, Task};
use rstest::{fixture, rstest};
use std::collections::BTreeMap;
use std::sync::Arc;

fn port(raw: &str) -> PortName {
    PortName::new(raw).expect("valid port name")
}

fn image_consumer() -> Arc<Capability> {
    let ports = PortSet::new()
        .with_input("frame", "Image")
        .expect("unique port");
    Arc::new(Capability::declare(
        CapabilityName::new("ImageConsumer").expect("valid name"),
        ports,
    ))
}

/// Component with the given ports and one `display` service consuming
/// images through its only image input.
fn sink_model(name: &str, ports: PortSet) -> Arc<TaskModel> {
    let mut model = TaskModel::component(TaskModelName::new(name).expect("valid name"), ports);
    model
        .provide("display", image_consumer(), &PortMapping::new())
        .expect("single image input");
    Arc::new(model)
}

fn source_model() -> Arc<TaskModel> {
    let ports = PortSet::new()
        .with_output("out1", "Image")
        .expect("unique port");
    Arc::new(TaskModel::component(
        TaskModelName::new("Source").expect("valid name"),
        ports,
    ))
}

fn feed(
    graph: &mut ConnectionGraph<TaskId>,
    source: TaskId,
    sink: TaskId,
    input: &str,
    policy: ConnectionPolicy,
) {
    graph
        .connect(
            source,
            sink,
            BTreeMap::from([(PortPair::new(port("out1"), port(input)), policy)]),
        )
        .expect("connect should succeed");
}

struct Scenario {
    plan: Plan,
    graph: ConnectionGraph<TaskId>,
    source: TaskId,
    t1: TaskId,
    t2: TaskId,
}

/// `S.out1 -> T2.in1 [buffer 4]`, with `T1` exposing the same service on
/// `inX`.
#[fixture]
fn scenario() -> Scenario {
    let mut plan = Plan::new();
    let source = plan.add_task(Task::new(source_model()));
    let t1 = plan.add_task(Task::new(sink_model(
        "Sink1",
        PortSet::new().with_input("inX", "Image").expect("unique port"),
    )));
    let t2 = plan.add_task(Task::new(sink_model(
        "Sink2",
        PortSet::new().with_input("in1", "Image").expect("unique port"),
    )));
    let mut graph = ConnectionGraph::new();
    feed(&mut graph, source, t2, "in1", ConnectionPolicy::buffer(4));
    Scenario {
        plan,
        graph,
        source,
        t1,
        t2,
    }
}

#[rstest]
fn merge_moves_edges_onto_candidate_ports(scenario: Scenario) {
    let Scenario {
        mut plan,
        mut graph,
        source,
        t1,
        t2,
    } = scenario;

    let report = MergeEngine::new()
        .merge(&mut plan, &mut graph, t1, t2)
        .expect("merge should succeed");

    assert!(graph.is_connected(&source, &port("out1"), &t1, &port("inX")));
    assert_eq!(
        graph
            .edge(&source, &t1)
            .and_then(|mappings| mappings.get(&PortPair::new(port("out1"), port("inX")))),
        Some(&ConnectionPolicy::buffer(4))
    );
    assert!(!graph.touches(&t2));
    assert!(!plan.contains(&t2));
    assert_eq!(report.removed(), t2);
    assert_eq!(report.moved_edges(), 1);
    assert_eq!(report.renamed_inputs().get("in1"), Some(&port("inX")));
    assert_eq!(
        report.service_pairs(),
        &[("display".to_owned(), "display".to_owned())]
    );
}

#[rstest]
fn rewritten_edges_reconcile_with_existing_ones(scenario: Scenario) {
    let Scenario {
        mut plan,
        mut graph,
        source,
        t1,
        t2,
    } = scenario;
    feed(&mut graph, source, t1, "inX", ConnectionPolicy::buffer(2));

    MergeEngine::new()
        .merge(&mut plan, &mut graph, t1, t2)
        .expect("merge should succeed");

    let mappings = graph.edge(&source, &t1).expect("edge kept");
    assert_eq!(mappings.len(), 1);
    assert_eq!(
        mappings.get(&PortPair::new(port("out1"), port("inX"))),
        Some(&ConnectionPolicy::buffer(4))
    );
}

#[rstest]
fn conflicting_policies_leave_plan_and_graph_untouched(scenario: Scenario) {
    let Scenario {
        mut plan,
        mut graph,
        source,
        t1,
        t2,
    } = scenario;
    feed(&mut graph, source, t1, "inX", ConnectionPolicy::data());
    let before = graph.clone();

    let result = MergeEngine::new().merge(&mut plan, &mut graph, t1, t2);

    assert!(matches!(
        result,
        Err(MergeError::Dataflow(DataflowError::PolicyConflict(_)))
    ));
    assert_eq!(graph, before);
    assert!(plan.contains(&t2));
}

#[rstest]
fn hierarchy_links_move_to_candidate(scenario: Scenario) {
    let Scenario {
        mut plan,
        mut graph,
        t1,
        t2,
        ..
    } = scenario;
    let composite = plan.add_task(Task::new(Arc::new(TaskModel::composition(
        TaskModelName::new("Pipeline").expect("valid name"),
        PortSet::new(),
    ))));
    plan.add_child(composite, t2).expect("attached");

    MergeEngine::new()
        .merge(&mut plan, &mut graph, t1, t2)
        .expect("merge should succeed");

    let parent = plan.require(&composite).expect("present");
    assert!(parent.children().contains(&t1));
    assert!(!parent.children().contains(&t2));
    assert!(plan.require(&t1).expect("present").parents().contains(&composite));
}

#[rstest]
fn ports_outside_services_keep_their_name_when_candidate_has_them() {
    let mut plan = Plan::new();
    let with_status = |name: &str| {
        sink_model(
            name,
            PortSet::new()
                .with_input("frames", "Image")
                .and_then(|ports| ports.with_output("status", "Status"))
                .expect("unique ports"),
        )
    };
    let t1 = plan.add_task(Task::new(with_status("Sink1")));
    let t2 = plan.add_task(Task::new(with_status("Sink2")));
    let monitor = plan.add_task(Task::new(sink_model(
        "Monitor",
        PortSet::new().with_input("frames", "Image").expect("unique port"),
    )));
    let mut graph = ConnectionGraph::new();
    graph
        .connect(
            t2,
            monitor,
            BTreeMap::from([(
                PortPair::new(port("status"), port("status")),
                ConnectionPolicy::unspecified(),
            )]),
        )
        .expect("connect should succeed");

    MergeEngine::new()
        .merge(&mut plan, &mut graph, t1, t2)
        .expect("merge should succeed");

    assert!(graph.is_connected(&t1, &port("status"), &monitor, &port("status")));
}

#[rstest]
fn ports_unknown_to_candidate_abort_the_merge(scenario: Scenario) {
    let Scenario {
        mut plan,
        mut graph,
        t1,
        t2,
        ..
    } = scenario;
    let extra = plan.add_task(Task::new(source_model()));
    graph
        .connect(
            extra,
            t2,
            BTreeMap::from([(
                PortPair::new(port("out1"), port("debug")),
                ConnectionPolicy::unspecified(),
            )]),
        )
        .expect("connect should succeed");

    let result = MergeEngine::new().merge(&mut plan, &mut graph, t1, t2);

    assert!(matches!(
        result,
        Err(MergeError::Model(ModelError::PortNotFound { .. }))
    ));
    assert!(plan.contains(&t2));
}

fn sink_models() -> (Arc<TaskModel>, Arc<TaskModel>) {
    (
        sink_model(
            "Sink1",
            PortSet::new().with_input("inX", "Image").expect("unique port"),
        ),
        sink_model(
            "Sink2",
            PortSet::new().with_input("in1", "Image").expect("unique port"),
        ),
    )
}

#[rstest]
fn resources_follow_the_service_pairing() {
    let (model1, model2) = sink_models();
    let display1 = model1.find_service("display").expect("declared").id();
    let display2 = model2.find_service("display").expect("declared").id();
    let mut plan = Plan::new();
    let t1 = plan.add_task(Task::new(model1));
    let t2 = plan.add_task(Task::new(model2).with_resource(display2, "screen0"));
    let mut graph = ConnectionGraph::new();

    MergeEngine::new()
        .merge(&mut plan, &mut graph, t1, t2)
        .expect("merge should succeed");

    assert_eq!(
        plan.require(&t1).expect("present").resource(display1),
        Some("screen0")
    );
}

#[rstest]
#[case::different(Some("screen0"), Some("screen1"), false)]
#[case::same(Some("screen0"), Some("screen0"), true)]
#[case::candidate_only(Some("screen0"), None, true)]
#[case::none(None, None, true)]
fn resources_conflict_only_when_both_are_set_and_differ(
    #[case] candidate_resource: Option<&str>,
    #[case] other_resource: Option<&str>,
    #[case] mergeable: bool,
) {
    let (model1, model2) = sink_models();
    let display1 = model1.find_service("display").expect("declared").id();
    let display2 = model2.find_service("display").expect("declared").id();
    let mut candidate = Task::new(model1);
    if let Some(resource) = candidate_resource {
        candidate = candidate.with_resource(display1, resource);
    }
    let mut other = Task::new(model2);
    if let Some(resource) = other_resource {
        other = other.with_resource(display2, resource);
    }
    let mut plan = Plan::new();
    let t1 = plan.add_task(candidate);
    let t2 = plan.add_task(other);

    let engine = MergeEngine::new();

    assert_eq!(engine.can_merge(&plan, t1, t2), mergeable);
    if !mergeable {
        assert!(matches!(
            engine.check_mergeable(&plan, t1, t2),
            Err(MergeError::NoCompatibleService { .. })
        ));
    }
}

#[rstest]
fn two_candidate_roots_without_name_match_are_ambiguous() {
    let ports = PortSet::new()
        .with_input("left", "Image")
        .and_then(|ports| ports.with_input("right", "Image"))
        .expect("unique ports");
    let mut stereo = TaskModel::component(TaskModelName::new("Stereo").expect("valid name"), ports);
    stereo
        .provide(
            "left",
            image_consumer(),
            &PortMapping::from_pairs([("frame", "left")]).expect("valid ports"),
        )
        .expect("left service");
    stereo
        .provide(
            "right",
            image_consumer(),
            &PortMapping::from_pairs([("frame", "right")]).expect("valid ports"),
        )
        .expect("right service");
    let (_, model2) = sink_models();
    let mut plan = Plan::new();
    let t1 = plan.add_task(Task::new(Arc::new(stereo)));
    let t2 = plan.add_task(Task::new(model2));
    let mut graph = ConnectionGraph::new();

    let engine = MergeEngine::new();
    let result = engine.merge(&mut plan, &mut graph, t1, t2);

    assert!(engine.can_merge(&plan, t1, t2));
    match result {
        Err(MergeError::AmbiguousMerge { service, candidates }) => {
            assert_eq!(service, "display");
            assert_eq!(candidates, vec!["left".to_owned(), "right".to_owned()]);
        }
        other => panic!("expected ambiguous merge, got {other:?}"),
    }
}

#[rstest]
fn same_full_name_is_preferred_among_candidates() {
    let ports = PortSet::new()
        .with_input("main", "Image")
        .and_then(|ports| ports.with_input("aux", "Image"))
        .expect("unique ports");
    let mut dual = TaskModel::component(TaskModelName::new("Dual").expect("valid name"), ports);
    dual.provide(
        "aux",
        image_consumer(),
        &PortMapping::from_pairs([("frame", "aux")]).expect("valid ports"),
    )
    .expect("aux service");
    dual.provide(
        "display",
        image_consumer(),
        &PortMapping::from_pairs([("frame", "main")]).expect("valid ports"),
    )
    .expect("display service");
    let (_, model2) = sink_models();
    let mut plan = Plan::new();
    let source = plan.add_task(Task::new(source_model()));
    let t1 = plan.add_task(Task::new(Arc::new(dual)));
    let t2 = plan.add_task(Task::new(model2));
    let mut graph = ConnectionGraph::new();
    feed(&mut graph, source, t2, "in1", ConnectionPolicy::data());

    MergeEngine::new()
        .merge(&mut plan, &mut graph, t1, t2)
        .expect("merge should succeed");

    assert!(graph.is_connected(&source, &port("out1"), &t1, &port("main")));
}

fn image_provider() -> Arc<Capability> {
    let ports = PortSet::new()
        .with_output("frame", "Image")
        .expect("unique port");
    Arc::new(Capability::declare(
        CapabilityName::new("ImageProvider").expect("valid name"),
        ports,
    ))
}

fn frame_to(port_name: &str) -> PortMapping {
    PortMapping::from_pairs([("frame", port_name)]).expect("valid ports")
}

/// Camera with a root `camera` service publishing frames on `output`.
fn camera_model(name: &str, output: &str) -> TaskModel {
    let ports = PortSet::new()
        .with_output(output, "Image")
        .expect("unique port");
    let mut model = TaskModel::component(TaskModelName::new(name).expect("valid name"), ports);
    model
        .provide("camera", image_provider(), &frame_to(output))
        .expect("camera service");
    model
}

/// Camera whose `camera` service publishes on `images` and whose
/// `camera.left` slave publishes on `left`.
fn stereo_camera_model(name: &str, left: &str) -> Arc<TaskModel> {
    let ports = PortSet::new()
        .with_output("images", "Image")
        .and_then(|ports| ports.with_output(left, "Image"))
        .expect("unique ports");
    let mut model = TaskModel::component(TaskModelName::new(name).expect("valid name"), ports);
    let camera = model
        .provide("camera", image_provider(), &frame_to("images"))
        .expect("camera service");
    model
        .provide_slave(camera, "left", image_provider(), &frame_to(left))
        .expect("left slave");
    Arc::new(model)
}

fn viewer_model() -> Arc<TaskModel> {
    sink_model(
        "Viewer",
        PortSet::new().with_input("frames", "Image").expect("unique port"),
    )
}

fn connect_output(
    graph: &mut ConnectionGraph<TaskId>,
    (source, output): (TaskId, &str),
    (sink, input): (TaskId, &str),
    policy: ConnectionPolicy,
) {
    graph
        .connect(
            source,
            sink,
            BTreeMap::from([(PortPair::new(port(output), port(input)), policy)]),
        )
        .expect("connect should succeed");
}

#[rstest]
fn outgoing_edges_follow_the_service_mapping() {
    let mut plan = Plan::new();
    let t1 = plan.add_task(Task::new(Arc::new(camera_model("CamB", "img_b"))));
    let t2 = plan.add_task(Task::new(Arc::new(camera_model("CamA", "img_a"))));
    let viewer = plan.add_task(Task::new(viewer_model()));
    let mut graph = ConnectionGraph::new();
    connect_output(
        &mut graph,
        (t2, "img_a"),
        (viewer, "frames"),
        ConnectionPolicy::buffer(3),
    );

    let report = MergeEngine::new()
        .merge(&mut plan, &mut graph, t1, t2)
        .expect("merge should succeed");

    assert_eq!(report.renamed_outputs().get("img_a"), Some(&port("img_b")));
    assert_eq!(
        graph
            .edge(&t1, &viewer)
            .and_then(|mappings| mappings.get(&PortPair::new(port("img_b"), port("frames")))),
        Some(&ConnectionPolicy::buffer(3))
    );
    assert!(!graph.touches(&t2));
}

#[rstest]
fn slave_service_ports_follow_the_slave_pairing() {
    let mut plan = Plan::new();
    let t1 = plan.add_task(Task::new(stereo_camera_model("CamA", "left_a")));
    let t2 = plan.add_task(Task::new(stereo_camera_model("CamB", "left_b")));
    let viewer = plan.add_task(Task::new(viewer_model()));
    let mut graph = ConnectionGraph::new();
    connect_output(
        &mut graph,
        (t2, "left_b"),
        (viewer, "frames"),
        ConnectionPolicy::data(),
    );
    let engine = MergeEngine::new();
    assert!(engine.can_merge(&plan, t1, t2));

    let report = engine
        .merge(&mut plan, &mut graph, t1, t2)
        .expect("merge should succeed");

    assert!(graph.is_connected(&t1, &port("left_a"), &viewer, &port("frames")));
    assert_eq!(report.renamed_outputs().get("left_b"), Some(&port("left_a")));
    assert!(
        report
            .service_pairs()
            .contains(&("camera.left".to_owned(), "camera.left".to_owned()))
    );
}

#[rstest]
fn missing_slave_on_candidate_prevents_the_merge() {
    let mut plan = Plan::new();
    let t1 = plan.add_task(Task::new(Arc::new(camera_model("Mono", "images"))));
    let t2 = plan.add_task(Task::new(stereo_camera_model("Stereo", "left")));
    let mut graph = ConnectionGraph::new();
    let engine = MergeEngine::new();

    assert!(!engine.can_merge(&plan, t1, t2));
    assert!(matches!(
        engine.merge(&mut plan, &mut graph, t1, t2),
        Err(MergeError::NoCompatibleService { .. })
    ));
    assert!(plan.contains(&t2));
}

#[rstest]
fn same_named_port_of_another_type_aborts_the_merge() {
    let mut plan = Plan::new();
    let with_status = |name: &str, status_type: &str| {
        sink_model(
            name,
            PortSet::new()
                .with_input("frames", "Image")
                .and_then(|ports| ports.with_output("status", status_type))
                .expect("unique ports"),
        )
    };
    let t1 = plan.add_task(Task::new(with_status("Thermal", "Temperature")));
    let t2 = plan.add_task(Task::new(with_status("Health", "Status")));
    let monitor = plan.add_task(Task::new(viewer_model()));
    let mut graph = ConnectionGraph::new();
    connect_output(
        &mut graph,
        (t2, "status"),
        (monitor, "status"),
        ConnectionPolicy::unspecified(),
    );
    let before = graph.clone();

    let result = MergeEngine::new().merge(&mut plan, &mut graph, t1, t2);

    assert!(matches!(
        result,
        Err(MergeError::Model(ModelError::PortTypeMismatch { .. }))
    ));
    assert_eq!(graph, before);
    assert!(plan.contains(&t2));
}
