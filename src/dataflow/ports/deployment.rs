//! Deployment port for pushing connection changes to running components.

use crate::dataflow::domain::{ConcreteEdge, ConnectionDiff};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for deployment operations.
pub type DeploymentResult<T> = Result<T, DeploymentError>;

/// Contract of the layer that actually wires deployed components.
///
/// Failures are reported as-is; retrying is left to the caller driving the
/// planning cycle.
#[async_trait]
pub trait DeploymentLayer: Send + Sync {
    /// Returns the connections currently established between deployed
    /// components.
    async fn current_actual_topology(&self) -> DeploymentResult<Vec<ConcreteEdge>>;

    /// Tears down `diff.removed` and establishes `diff.added`.
    async fn apply(&self, diff: &ConnectionDiff) -> DeploymentResult<()>;
}

/// Errors returned by deployment adapters.
#[derive(Debug, Clone, Error)]
pub enum DeploymentError {
    /// The deployment layer refused to establish a connection.
    #[error("deployment rejected connection {edge}: {reason}")]
    Rejected {
        /// Rejected connection, rendered.
        edge: String,
        /// Reason reported by the deployment layer.
        reason: String,
    },

    /// Generic runtime failure.
    #[error("deployment runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl DeploymentError {
    /// Wraps a runtime error from a deployment adapter.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
