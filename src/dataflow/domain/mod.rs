//! Domain model for task-to-task dataflow.
//!
//! Connection graphs are directed multigraphs keyed by ordered node pairs.
//! Each edge stores the set of port pairs it connects together with the
//! reconciled policy of every pair. Three graph instances with identical
//! structure describe the model-level, required and actual dataflow.

mod diff;
mod error;
mod graph;
mod graphs;
mod ids;
mod policy;
mod port;
mod traversal;

pub use diff::{ConcreteEdge, ConnectionDiff};
pub use error::{DataflowError, DataflowResult, ParsePolicyKindError, PolicyConflict};
pub use graph::{ConnectionGraph, ConnectionMappings, GraphNode};
pub use graphs::DataflowGraphs;
pub use ids::{RoleName, TaskId};
pub use policy::{ConnectionPolicy, PolicyKind};
pub use port::{PortEndpoint, PortName, PortPair};
pub use traversal::ResolvedEndpoints;
