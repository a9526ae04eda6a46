//! Composition-aware resolution of connections.
//!
//! A composite node only forwards data: its ports are connected to ports of
//! its children, which may themselves be composites. Resolving a port walks
//! through such forwarding edges until it reaches leaf nodes, reconciling
//! the policies met on the way.
//!
//! The walk does not detect cycles. Composite hierarchies are acyclic by
//! construction and are validated when they are assembled.

use super::{
    ConnectionGraph, ConnectionMappings, ConnectionPolicy, DataflowResult, GraphNode,
    PortEndpoint, PortName, PortPair,
};
use std::collections::{BTreeMap, BTreeSet};

/// Leaf endpoints reached by a walk, with the reconciled policy of the path
/// (or paths) leading to each of them.
pub type ResolvedEndpoints<N> = BTreeMap<PortEndpoint<N>, ConnectionPolicy>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Upstream,
    Downstream,
}

struct Walk<'g, N: GraphNode, F> {
    graph: &'g ConnectionGraph<N>,
    direction: Direction,
    is_composite: F,
    path: Vec<PortEndpoint<N>>,
    resolved: ResolvedEndpoints<N>,
}

impl<N, F> Walk<'_, N, F>
where
    N: GraphNode,
    F: Fn(&N) -> bool,
{
    fn neighbours(&self, node: &N, port: &PortName) -> Vec<(PortEndpoint<N>, ConnectionPolicy)> {
        match self.direction {
            Direction::Upstream => self
                .graph
                .incoming(node)
                .flat_map(|(source, mappings)| {
                    mappings
                        .iter()
                        .filter(|(pair, _)| pair.sink == *port)
                        .map(move |(pair, policy)| {
                            (PortEndpoint::new(source.clone(), pair.source.clone()), policy.clone())
                        })
                })
                .collect(),
            Direction::Downstream => self
                .graph
                .outgoing(node)
                .flat_map(|(sink, mappings)| {
                    mappings
                        .iter()
                        .filter(|(pair, _)| pair.source == *port)
                        .map(move |(pair, policy)| {
                            (PortEndpoint::new(sink.clone(), pair.sink.clone()), policy.clone())
                        })
                })
                .collect(),
        }
    }

    fn visit(&mut self, node: &N, port: &PortName, carried: &ConnectionPolicy) -> DataflowResult<()> {
        for (next, policy) in self.neighbours(node, port) {
            self.path.push(next.clone());
            let merged = carried
                .merge(&policy)
                .map_err(|conflict| conflict.along(&self.path))?;

            if (self.is_composite)(&next.task) {
                self.visit(&next.task, &next.port, &merged)?;
            } else {
                let combined = match self.resolved.get(&next) {
                    Some(existing) => existing
                        .merge(&merged)
                        .map_err(|conflict| conflict.along(&self.path))?,
                    None => merged,
                };
                self.resolved.insert(next, combined);
            }
            self.path.pop();
        }
        Ok(())
    }
}

impl<N: GraphNode> ConnectionGraph<N> {
    /// Resolves the leaf outputs feeding `node.port`.
    ///
    /// Edges whose source is composite are followed through the composite's
    /// own forwarding edges. Policies are reconciled along each path and
    /// between paths reaching the same leaf output.
    ///
    /// # Errors
    ///
    /// Returns [`super::DataflowError::PolicyConflict`] annotated with the
    /// endpoints walked when policies along a path cannot be reconciled.
    pub fn resolve_concrete_inputs<F>(
        &self,
        node: &N,
        port: &PortName,
        is_composite: F,
    ) -> DataflowResult<ResolvedEndpoints<N>>
    where
        F: Fn(&N) -> bool,
    {
        self.resolve(Direction::Upstream, node, port, is_composite)
    }

    /// Resolves the leaf inputs fed by `node.port`.
    ///
    /// This is the mirror of [`Self::resolve_concrete_inputs`].
    ///
    /// # Errors
    ///
    /// Returns [`super::DataflowError::PolicyConflict`] annotated with the
    /// endpoints walked when policies along a path cannot be reconciled.
    pub fn resolve_concrete_outputs<F>(
        &self,
        node: &N,
        port: &PortName,
        is_composite: F,
    ) -> DataflowResult<ResolvedEndpoints<N>>
    where
        F: Fn(&N) -> bool,
    {
        self.resolve(Direction::Downstream, node, port, is_composite)
    }

    /// Builds the concrete graph: leaf-to-leaf connections only, with every
    /// composite forwarding resolved.
    ///
    /// # Errors
    ///
    /// Returns the first reconciliation error met while resolving.
    pub fn flatten<F>(&self, is_composite: F) -> DataflowResult<Self>
    where
        F: Fn(&N) -> bool,
    {
        let leaf_inputs: BTreeSet<PortEndpoint<N>> = self
            .edges()
            .filter(|(_, sink, _)| !is_composite(*sink))
            .flat_map(|(_, sink, mappings)| {
                mappings
                    .keys()
                    .map(move |pair| PortEndpoint::new(sink.clone(), pair.sink.clone()))
            })
            .collect();

        let mut concrete = Self::new();
        for input in leaf_inputs {
            let sources = self.resolve_concrete_inputs(&input.task, &input.port, &is_composite)?;
            for (output, policy) in sources {
                let mappings: ConnectionMappings =
                    BTreeMap::from([(PortPair::new(output.port, input.port.clone()), policy)]);
                concrete.connect(output.task, input.task.clone(), mappings)?;
            }
        }
        Ok(concrete)
    }

    fn resolve<F>(
        &self,
        direction: Direction,
        node: &N,
        port: &PortName,
        is_composite: F,
    ) -> DataflowResult<ResolvedEndpoints<N>>
    where
        F: Fn(&N) -> bool,
    {
        let mut walk = Walk {
            graph: self,
            direction,
            is_composite,
            path: vec![PortEndpoint::new(node.clone(), port.clone())],
            resolved: BTreeMap::new(),
        };
        walk.visit(node, port, &ConnectionPolicy::unspecified())?;
        Ok(walk.resolved)
    }
}
