//! Service pushing the required dataflow to the deployment layer.

use crate::config::PlannerConfig;
use crate::dataflow::{
    domain::{ConnectionDiff, ConnectionGraph, DataflowError, DataflowGraphs},
    ports::{DeploymentError, DeploymentLayer},
};
use crate::plan::domain::Plan;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Service-level errors for dataflow synchronisation.
#[derive(Debug, Error)]
pub enum DataflowSyncError {
    /// The required graph could not be resolved into concrete edges.
    #[error(transparent)]
    Dataflow(#[from] DataflowError),
    /// The deployment layer failed.
    #[error(transparent)]
    Deployment(#[from] DeploymentError),
}

/// Result type for synchronisation operations.
pub type DataflowSyncResult<T> = Result<T, DataflowSyncError>;

/// Outcome of one synchronisation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    diff: ConnectionDiff,
    applied: bool,
    synchronised_at: DateTime<Utc>,
}

impl SyncReport {
    /// Returns the computed diff.
    #[must_use]
    pub const fn diff(&self) -> &ConnectionDiff {
        &self.diff
    }

    /// Returns whether the diff was pushed to the deployment layer.
    #[must_use]
    pub const fn applied(&self) -> bool {
        self.applied
    }

    /// Returns when the pass completed.
    #[must_use]
    pub const fn synchronised_at(&self) -> DateTime<Utc> {
        self.synchronised_at
    }
}

/// Dataflow synchronisation service.
///
/// One call computes the concrete form of the required graph, refreshes the
/// actual graph from the deployment layer, and pushes the difference.
#[derive(Clone)]
pub struct DataflowSyncService<D, C>
where
    D: DeploymentLayer,
    C: Clock + Send + Sync,
{
    deployment: Arc<D>,
    clock: Arc<C>,
    config: PlannerConfig,
}

impl<D, C> DataflowSyncService<D, C>
where
    D: DeploymentLayer,
    C: Clock + Send + Sync,
{
    /// Creates a new synchronisation service.
    #[must_use]
    pub const fn new(deployment: Arc<D>, clock: Arc<C>, config: PlannerConfig) -> Self {
        Self {
            deployment,
            clock,
            config,
        }
    }

    /// Brings the deployed connections in line with the required graph.
    ///
    /// `graphs.actual` is replaced by the topology reported by the
    /// deployment layer and, once the diff has been applied, updated to
    /// match. With [`PlannerConfig::dry_run_sync`] set, the diff is computed
    /// and reported but not applied.
    ///
    /// # Errors
    ///
    /// Returns [`DataflowSyncError::Dataflow`] when composite resolution
    /// fails and [`DataflowSyncError::Deployment`] when the deployment layer
    /// fails. On a deployment failure `graphs.actual` reflects the topology
    /// read before the attempt.
    pub async fn synchronise(
        &self,
        plan: &Plan,
        graphs: &mut DataflowGraphs,
    ) -> DataflowSyncResult<SyncReport> {
        let concrete = graphs.required.flatten(|task| plan.is_composite(task))?;

        let topology = self.deployment.current_actual_topology().await?;
        graphs.actual = ConnectionGraph::from_concrete_edges(topology)?;

        let diff = ConnectionDiff::between(&concrete, &graphs.actual);
        if diff.is_empty() || self.config.dry_run_sync {
            info!(
                added = diff.added.len(),
                removed = diff.removed.len(),
                dry_run = self.config.dry_run_sync,
                "dataflow not pushed"
            );
            return Ok(self.report(diff, false));
        }

        if let Err(err) = self.deployment.apply(&diff).await {
            warn!(error = %err, "deployment rejected dataflow changes");
            return Err(err.into());
        }
        diff.apply_to(&mut graphs.actual)?;
        info!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            "dataflow synchronised"
        );
        Ok(self.report(diff, true))
    }

    fn report(&self, diff: ConnectionDiff, applied: bool) -> SyncReport {
        SyncReport {
            diff,
            applied,
            synchronised_at: self.clock.utc(),
        }
    }
}
