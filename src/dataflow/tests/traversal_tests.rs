//! Tests for composition-aware connection resolution.

use crate::dataflow::domain::{
    ConnectionGraph, ConnectionPolicy, DataflowError, PortEndpoint, PortName, PortPair, TaskId,
};
use rstest::rstest;
use std::collections::{BTreeMap, BTreeSet};

fn port(raw: &str) -> PortName {
    PortName::new(raw).expect("valid port name")
}

fn link(
    graph: &mut ConnectionGraph<TaskId>,
    source: (TaskId, &str),
    sink: (TaskId, &str),
    policy: ConnectionPolicy,
) {
    graph
        .connect(
            source.0,
            sink.0,
            BTreeMap::from([(PortPair::new(port(source.1), port(sink.1)), policy)]),
        )
        .expect("connect should succeed");
}

fn endpoint(task: TaskId, name: &str) -> PortEndpoint<TaskId> {
    PortEndpoint::new(task, port(name))
}

#[rstest]
fn composite_forwarding_resolves_to_the_leaf() {
    let (source, composite, leaf) = (TaskId::new(), TaskId::new(), TaskId::new());
    let composites = BTreeSet::from([composite]);
    let mut graph = ConnectionGraph::new();
    link(&mut graph, (source, "out"), (composite, "p"), ConnectionPolicy::buffer(2));
    link(&mut graph, (composite, "p"), (leaf, "q"), ConnectionPolicy::buffer(6));

    let outputs = graph
        .resolve_concrete_outputs(&source, &port("out"), |task| composites.contains(task))
        .expect("policies reconcile");
    let inputs = graph
        .resolve_concrete_inputs(&leaf, &port("q"), |task| composites.contains(task))
        .expect("policies reconcile");

    assert_eq!(
        outputs,
        BTreeMap::from([(endpoint(leaf, "q"), ConnectionPolicy::buffer(6))])
    );
    assert_eq!(
        inputs,
        BTreeMap::from([(endpoint(source, "out"), ConnectionPolicy::buffer(6))])
    );
}

#[rstest]
fn nested_composites_are_walked_through() {
    let (source, outer, inner, leaf) = (TaskId::new(), TaskId::new(), TaskId::new(), TaskId::new());
    let composites = BTreeSet::from([outer, inner]);
    let mut graph = ConnectionGraph::new();
    link(&mut graph, (source, "out"), (outer, "p"), ConnectionPolicy::data());
    link(&mut graph, (outer, "p"), (inner, "r"), ConnectionPolicy::unspecified());
    link(&mut graph, (inner, "r"), (leaf, "q"), ConnectionPolicy::unspecified());

    let outputs = graph
        .resolve_concrete_outputs(&source, &port("out"), |task| composites.contains(task))
        .expect("policies reconcile");

    assert_eq!(
        outputs,
        BTreeMap::from([(endpoint(leaf, "q"), ConnectionPolicy::data())])
    );
}

#[rstest]
fn forwarding_fans_out_to_every_leaf() {
    let (source, composite) = (TaskId::new(), TaskId::new());
    let (left, right) = (TaskId::new(), TaskId::new());
    let composites = BTreeSet::from([composite]);
    let mut graph = ConnectionGraph::new();
    link(&mut graph, (source, "out"), (composite, "p"), ConnectionPolicy::unspecified());
    link(&mut graph, (composite, "p"), (left, "q"), ConnectionPolicy::data());
    link(&mut graph, (composite, "p"), (right, "q"), ConnectionPolicy::buffer(1));

    let outputs = graph
        .resolve_concrete_outputs(&source, &port("out"), |task| composites.contains(task))
        .expect("policies reconcile");

    assert_eq!(outputs.len(), 2);
    assert_eq!(
        outputs.get(&endpoint(left, "q")),
        Some(&ConnectionPolicy::data())
    );
    assert_eq!(
        outputs.get(&endpoint(right, "q")),
        Some(&ConnectionPolicy::buffer(1))
    );
}

#[rstest]
fn paths_reaching_the_same_leaf_are_reconciled() {
    let (source, composite, leaf) = (TaskId::new(), TaskId::new(), TaskId::new());
    let composites = BTreeSet::from([composite]);
    let mut graph = ConnectionGraph::new();
    link(&mut graph, (source, "out"), (composite, "p"), ConnectionPolicy::buffer(2));
    link(&mut graph, (composite, "p"), (leaf, "q"), ConnectionPolicy::unspecified());
    link(&mut graph, (source, "out"), (leaf, "q"), ConnectionPolicy::buffer(5));

    let outputs = graph
        .resolve_concrete_outputs(&source, &port("out"), |task| composites.contains(task))
        .expect("policies reconcile");

    assert_eq!(
        outputs,
        BTreeMap::from([(endpoint(leaf, "q"), ConnectionPolicy::buffer(5))])
    );
}

#[rstest]
fn conflicts_report_the_walked_path() {
    let (source, composite, leaf) = (TaskId::new(), TaskId::new(), TaskId::new());
    let composites = BTreeSet::from([composite]);
    let mut graph = ConnectionGraph::new();
    link(&mut graph, (source, "out"), (composite, "p"), ConnectionPolicy::data());
    link(&mut graph, (composite, "p"), (leaf, "q"), ConnectionPolicy::buffer(4));

    let result =
        graph.resolve_concrete_outputs(&source, &port("out"), |task| composites.contains(task));

    let Err(DataflowError::PolicyConflict(conflict)) = result else {
        panic!("expected a policy conflict");
    };
    assert_eq!(conflict.field(), "type");
    assert_eq!(
        conflict.path(),
        &[
            format!("{source}.out"),
            format!("{composite}.p"),
            format!("{leaf}.q")
        ]
    );
}

#[rstest]
fn flatten_keeps_only_leaf_to_leaf_connections() {
    let (source, composite, leaf) = (TaskId::new(), TaskId::new(), TaskId::new());
    let composites = BTreeSet::from([composite]);
    let mut graph = ConnectionGraph::new();
    link(&mut graph, (source, "out"), (composite, "p"), ConnectionPolicy::buffer(3));
    link(&mut graph, (composite, "p"), (leaf, "q"), ConnectionPolicy::unspecified());

    let concrete = graph
        .flatten(|task| composites.contains(task))
        .expect("policies reconcile");

    assert_eq!(concrete.edge_count(), 1);
    assert!(concrete.is_connected(&source, &port("out"), &leaf, &port("q")));
    assert!(!concrete.touches(&composite));
}

#[rstest]
fn plain_graphs_flatten_to_themselves() {
    let (source, sink) = (TaskId::new(), TaskId::new());
    let mut graph = ConnectionGraph::new();
    link(&mut graph, (source, "out"), (sink, "in"), ConnectionPolicy::data());

    let concrete = graph.flatten(|_| false).expect("nothing to resolve");

    assert_eq!(concrete, graph);
}
