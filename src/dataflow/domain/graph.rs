//! Directed connection multigraph keyed by ordered node pairs.

use super::{ConnectionPolicy, DataflowError, DataflowResult, PortName, PortPair};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::hash::Hash;
use tracing::debug;

/// Port pairs carried by one edge, each with its reconciled policy.
pub type ConnectionMappings = BTreeMap<PortPair, ConnectionPolicy>;

/// Key types usable as connection graph nodes.
pub trait GraphNode: Clone + Eq + Hash + Ord + fmt::Display {}

impl<T: Clone + Eq + Hash + Ord + fmt::Display> GraphNode for T {}

/// Directed multigraph of port-to-port connections.
///
/// Every edge `(source, sink)` owns a non-empty set of port pairs. Removing
/// the last pair of an edge removes the edge itself, so an edge record
/// exists exactly when at least one connection exists between the two
/// nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionGraph<N: GraphNode> {
    edges: HashMap<(N, N), ConnectionMappings>,
    successors: HashMap<N, BTreeSet<N>>,
    predecessors: HashMap<N, BTreeSet<N>>,
}

impl<N: GraphNode> Default for ConnectionGraph<N> {
    fn default() -> Self {
        Self {
            edges: HashMap::new(),
            successors: HashMap::new(),
            predecessors: HashMap::new(),
        }
    }
}

impl<N: GraphNode> ConnectionGraph<N> {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds connections from `source` to `sink`.
    ///
    /// Port pairs already present on the edge are reconciled with the new
    /// policy. Every pair is reconciled before any is stored, so a conflict
    /// leaves the graph unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`DataflowError::EmptyMappings`] when `mappings` is empty and
    /// [`DataflowError::PolicyConflict`] when a pair's policies cannot be
    /// reconciled.
    pub fn connect(&mut self, source: N, sink: N, mappings: ConnectionMappings) -> DataflowResult<()> {
        if mappings.is_empty() {
            return Err(DataflowError::EmptyMappings {
                from: source.to_string(),
                to: sink.to_string(),
            });
        }

        let key = (source, sink);
        let mut staged = self.edges.get(&key).cloned().unwrap_or_default();
        for (pair, policy) in mappings {
            let reconciled = match staged.get(&pair) {
                Some(current) => current.merge(&policy).map_err(|conflict| {
                    conflict.along([
                        format!("{}.{}", key.0, pair.source),
                        format!("{}.{}", key.1, pair.sink),
                    ])
                })?,
                None => policy,
            };
            staged.insert(pair, reconciled);
        }

        debug!(source = %key.0, sink = %key.1, pairs = staged.len(), "connected");
        self.successors
            .entry(key.0.clone())
            .or_default()
            .insert(key.1.clone());
        self.predecessors
            .entry(key.1.clone())
            .or_default()
            .insert(key.0.clone());
        self.edges.insert(key, staged);
        Ok(())
    }

    /// Removes the given port pairs from the edge `source -> sink`.
    ///
    /// Pairs that are not connected are ignored. Returns the number of pairs
    /// actually removed.
    pub fn disconnect(
        &mut self,
        source: &N,
        sink: &N,
        pairs: impl IntoIterator<Item = PortPair>,
    ) -> usize {
        let key = (source.clone(), sink.clone());
        let Some(mappings) = self.edges.get_mut(&key) else {
            return 0;
        };

        let removed = pairs
            .into_iter()
            .filter(|pair| mappings.remove(pair).is_some())
            .count();
        let now_empty = mappings.is_empty();
        if now_empty {
            self.remove_edge(source, sink);
        }
        debug!(%source, %sink, removed, edge_removed = now_empty, "disconnected");
        removed
    }

    /// Removes the whole edge `source -> sink`, returning its mappings.
    pub fn remove_edge(&mut self, source: &N, sink: &N) -> Option<ConnectionMappings> {
        let mappings = self.edges.remove(&(source.clone(), sink.clone()))?;
        prune(&mut self.successors, source, sink);
        prune(&mut self.predecessors, sink, source);
        Some(mappings)
    }

    /// Removes every edge touching `node` and returns them as
    /// `(source, sink, mappings)` triples.
    pub fn remove_node(&mut self, node: &N) -> Vec<(N, N, ConnectionMappings)> {
        let sinks: Vec<N> = self
            .successors
            .get(node)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        let sources: Vec<N> = self
            .predecessors
            .get(node)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();

        let mut removed = Vec::new();
        for sink in sinks {
            if let Some(mappings) = self.remove_edge(node, &sink) {
                removed.push((node.clone(), sink, mappings));
            }
        }
        for source in sources {
            if let Some(mappings) = self.remove_edge(&source, node) {
                removed.push((source, node.clone(), mappings));
            }
        }
        removed
    }

    /// Returns whether `source.source_port` is connected to
    /// `sink.sink_port`.
    #[must_use]
    pub fn is_connected(
        &self,
        source: &N,
        source_port: &PortName,
        sink: &N,
        sink_port: &PortName,
    ) -> bool {
        self.edge(source, sink).is_some_and(|mappings| {
            mappings.contains_key(&PortPair::new(source_port.clone(), sink_port.clone()))
        })
    }

    /// Returns whether any edge leaves `node` from output `port`.
    #[must_use]
    pub fn has_outgoing(&self, node: &N, port: &PortName) -> bool {
        self.outgoing(node)
            .any(|(_, mappings)| mappings.keys().any(|pair| pair.source == *port))
    }

    /// Returns whether any edge reaches `node` on input `port`.
    #[must_use]
    pub fn has_incoming(&self, node: &N, port: &PortName) -> bool {
        self.incoming(node)
            .any(|(_, mappings)| mappings.keys().any(|pair| pair.sink == *port))
    }

    /// Returns the mappings of the edge `source -> sink`, if it exists.
    #[must_use]
    pub fn edge(&self, source: &N, sink: &N) -> Option<&ConnectionMappings> {
        self.edges.get(&(source.clone(), sink.clone()))
    }

    /// Returns whether an edge `source -> sink` exists.
    #[must_use]
    pub fn contains_edge(&self, source: &N, sink: &N) -> bool {
        self.edge(source, sink).is_some()
    }

    /// Iterates over all edges as `(source, sink, mappings)` in no
    /// particular order.
    pub fn edges(&self) -> impl Iterator<Item = (&N, &N, &ConnectionMappings)> {
        self.edges
            .iter()
            .map(|((source, sink), mappings)| (source, sink, mappings))
    }

    /// Iterates over the edges leaving `node` as `(sink, mappings)`.
    pub fn outgoing<'a>(
        &'a self,
        node: &'a N,
    ) -> impl Iterator<Item = (&'a N, &'a ConnectionMappings)> {
        self.successors
            .get(node)
            .into_iter()
            .flatten()
            .filter_map(move |sink| self.edge(node, sink).map(|mappings| (sink, mappings)))
    }

    /// Iterates over the edges reaching `node` as `(source, mappings)`.
    pub fn incoming<'a>(
        &'a self,
        node: &'a N,
    ) -> impl Iterator<Item = (&'a N, &'a ConnectionMappings)> {
        self.predecessors
            .get(node)
            .into_iter()
            .flatten()
            .filter_map(move |source| self.edge(source, node).map(|mappings| (source, mappings)))
    }

    /// Returns every node touched by at least one edge.
    #[must_use]
    pub fn nodes(&self) -> BTreeSet<N> {
        self.successors
            .keys()
            .chain(self.predecessors.keys())
            .cloned()
            .collect()
    }

    /// Returns whether `node` takes part in any edge.
    #[must_use]
    pub fn touches(&self, node: &N) -> bool {
        self.successors.contains_key(node) || self.predecessors.contains_key(node)
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns whether the graph has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Copies every connection onto another node space.
    ///
    /// Each node of this graph is looked up in `roles`; the connections are
    /// added to `target`, reconciling policies with what `target` already
    /// holds. `target` is only modified when every connection succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`DataflowError::UnknownRole`] when a node has no entry in
    /// `roles`, or the first reconciliation error.
    pub fn instantiate<M: GraphNode>(
        &self,
        roles: &BTreeMap<N, M>,
        target: &mut ConnectionGraph<M>,
    ) -> DataflowResult<()> {
        let lookup = |node: &N| {
            roles
                .get(node)
                .cloned()
                .ok_or_else(|| DataflowError::UnknownRole(node.to_string()))
        };

        let mut staged = target.clone();
        for (source, sink, mappings) in self.sorted_edges() {
            staged.connect(lookup(source)?, lookup(sink)?, mappings.clone())?;
        }
        *target = staged;
        Ok(())
    }

    pub(super) fn sorted_edges(&self) -> Vec<(&N, &N, &ConnectionMappings)> {
        let mut edges: Vec<_> = self.edges().collect();
        edges.sort_by(|left, right| (left.0, left.1).cmp(&(right.0, right.1)));
        edges
    }
}

fn prune<N: GraphNode>(index: &mut HashMap<N, BTreeSet<N>>, key: &N, value: &N) {
    if let Some(set) = index.get_mut(key) {
        set.remove(value);
        if set.is_empty() {
            index.remove(key);
        }
    }
}

impl<N: GraphNode> fmt::Display for ConnectionGraph<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (source, sink, mappings) in self.sorted_edges() {
            for (pair, policy) in mappings {
                writeln!(
                    f,
                    "{source}.{} -> {sink}.{} [{policy}]",
                    pair.source, pair.sink
                )?;
            }
        }
        Ok(())
    }
}
