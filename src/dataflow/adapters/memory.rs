//! In-memory deployment adapter for dataflow synchronisation tests.

use crate::dataflow::{
    domain::{ConcreteEdge, ConnectionDiff, TaskId},
    ports::{DeploymentError, DeploymentLayer, DeploymentResult},
};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

/// In-memory deployment layer.
///
/// This adapter records established connections without talking to any
/// transport. It is suitable for unit and integration tests and for
/// previewing deployment changes locally.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDeployment {
    state: Arc<RwLock<InMemoryDeploymentState>>,
}

#[derive(Debug, Default)]
struct InMemoryDeploymentState {
    connections: BTreeSet<ConcreteEdge>,
    rejected_sinks: BTreeMap<TaskId, String>,
    applied: Vec<ConnectionDiff>,
}

impl InMemoryDeployment {
    /// Creates a deployment with no established connection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a deployment that already reports `connections`.
    #[must_use]
    pub fn with_connections(connections: impl IntoIterator<Item = ConcreteEdge>) -> Self {
        let state = InMemoryDeploymentState {
            connections: connections.into_iter().collect(),
            ..InMemoryDeploymentState::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Makes every later attempt to connect into `task` fail with `reason`.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn reject_connections_to(
        &self,
        task: TaskId,
        reason: impl Into<String>,
    ) -> DeploymentResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| DeploymentError::runtime(std::io::Error::other(err.to_string())))?;
        state.rejected_sinks.insert(task, reason.into());
        Ok(())
    }

    /// Returns the established connections, sorted.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn connections(&self) -> DeploymentResult<Vec<ConcreteEdge>> {
        let state = self
            .state
            .read()
            .map_err(|err| DeploymentError::runtime(std::io::Error::other(err.to_string())))?;
        Ok(state.connections.iter().cloned().collect())
    }

    /// Returns every diff applied so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn applied_diffs(&self) -> DeploymentResult<Vec<ConnectionDiff>> {
        let state = self
            .state
            .read()
            .map_err(|err| DeploymentError::runtime(std::io::Error::other(err.to_string())))?;
        Ok(state.applied.clone())
    }
}

#[async_trait]
impl DeploymentLayer for InMemoryDeployment {
    async fn current_actual_topology(&self) -> DeploymentResult<Vec<ConcreteEdge>> {
        self.connections()
    }

    async fn apply(&self, diff: &ConnectionDiff) -> DeploymentResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| DeploymentError::runtime(std::io::Error::other(err.to_string())))?;

        if let Some((edge, reason)) = diff.added.iter().find_map(|edge| {
            state
                .rejected_sinks
                .get(&edge.sink)
                .map(|reason| (edge, reason))
        }) {
            return Err(DeploymentError::Rejected {
                edge: edge.to_string(),
                reason: reason.clone(),
            });
        }

        for edge in &diff.removed {
            state.connections.remove(edge);
        }
        state.connections.extend(diff.added.iter().cloned());
        state.applied.push(diff.clone());
        Ok(())
    }
}
