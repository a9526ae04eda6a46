//! Differences between the required and the actual concrete dataflow.

use super::{
    ConnectionGraph, ConnectionMappings, ConnectionPolicy, DataflowResult, PortName, PortPair,
    TaskId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One port-to-port connection between two leaf tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConcreteEdge {
    /// Task owning the output port.
    pub source: TaskId,
    /// Output port name.
    pub source_port: PortName,
    /// Task owning the input port.
    pub sink: TaskId,
    /// Input port name.
    pub sink_port: PortName,
    /// Policy the connection is established with.
    pub policy: ConnectionPolicy,
}

impl ConcreteEdge {
    /// Creates a concrete edge.
    #[must_use]
    pub const fn new(
        source: TaskId,
        source_port: PortName,
        sink: TaskId,
        sink_port: PortName,
        policy: ConnectionPolicy,
    ) -> Self {
        Self {
            source,
            source_port,
            sink,
            sink_port,
            policy,
        }
    }

    /// Returns the port pair of this edge.
    #[must_use]
    pub fn port_pair(&self) -> PortPair {
        PortPair::new(self.source_port.clone(), self.sink_port.clone())
    }
}

impl fmt::Display for ConcreteEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{} [{}]",
            self.source, self.source_port, self.sink, self.sink_port, self.policy
        )
    }
}

impl ConnectionGraph<TaskId> {
    /// Lists every connection as a concrete edge, sorted.
    #[must_use]
    pub fn concrete_edges(&self) -> Vec<ConcreteEdge> {
        self.sorted_edges()
            .into_iter()
            .flat_map(|(source, sink, mappings)| {
                mappings.iter().map(move |(pair, policy)| {
                    ConcreteEdge::new(
                        *source,
                        pair.source.clone(),
                        *sink,
                        pair.sink.clone(),
                        policy.clone(),
                    )
                })
            })
            .collect()
    }

    /// Builds a graph from a list of concrete edges.
    ///
    /// # Errors
    ///
    /// Returns [`super::DataflowError::PolicyConflict`] when the list holds
    /// the same port pair twice with incompatible policies.
    pub fn from_concrete_edges(
        edges: impl IntoIterator<Item = ConcreteEdge>,
    ) -> DataflowResult<Self> {
        let mut graph = Self::new();
        for edge in edges {
            let mappings: ConnectionMappings =
                BTreeMap::from([(edge.port_pair(), edge.policy)]);
            graph.connect(edge.source, edge.sink, mappings)?;
        }
        Ok(graph)
    }
}

/// Connection changes needed to turn the actual dataflow into the required
/// one.
///
/// A connection whose policy changed appears in both lists: it is removed
/// and re-established.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDiff {
    /// Connections to establish.
    pub added: Vec<ConcreteEdge>,
    /// Connections to tear down.
    pub removed: Vec<ConcreteEdge>,
}

impl ConnectionDiff {
    /// Computes `required - actual` and `actual - required`.
    #[must_use]
    pub fn between(required: &ConnectionGraph<TaskId>, actual: &ConnectionGraph<TaskId>) -> Self {
        let required_edges: BTreeSet<ConcreteEdge> = required.concrete_edges().into_iter().collect();
        let actual_edges: BTreeSet<ConcreteEdge> = actual.concrete_edges().into_iter().collect();

        Self {
            added: required_edges.difference(&actual_edges).cloned().collect(),
            removed: actual_edges.difference(&required_edges).cloned().collect(),
        }
    }

    /// Returns whether no change is needed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Replays the diff on `graph`: removals first, then additions.
    ///
    /// # Errors
    ///
    /// Returns [`super::DataflowError::PolicyConflict`] when an added edge
    /// conflicts with a connection `graph` still holds.
    pub fn apply_to(&self, graph: &mut ConnectionGraph<TaskId>) -> DataflowResult<()> {
        let mut staged = graph.clone();
        for edge in &self.removed {
            staged.disconnect(&edge.source, &edge.sink, [edge.port_pair()]);
        }
        for edge in &self.added {
            let mappings: ConnectionMappings =
                BTreeMap::from([(edge.port_pair(), edge.policy.clone())]);
            staged.connect(edge.source, edge.sink, mappings)?;
        }
        *graph = staged;
        Ok(())
    }
}
