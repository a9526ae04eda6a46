//! The three dataflow graphs maintained during planning.

use super::{ConnectionDiff, ConnectionGraph, DataflowResult, RoleName, TaskId};
use std::collections::BTreeMap;

/// Model-level, required and actual dataflow graphs.
///
/// The graphs share one structure but carry different meanings. They are
/// owned by the orchestration driver and passed explicitly to every
/// planning step; nothing in this crate keeps them in global state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataflowGraphs {
    /// Requirements between child roles, before instantiation.
    pub model: ConnectionGraph<RoleName>,
    /// Requirements between task instances as the plan evolves.
    pub required: ConnectionGraph<TaskId>,
    /// Connections the deployment layer reports as established.
    pub actual: ConnectionGraph<TaskId>,
}

impl DataflowGraphs {
    /// Creates three empty graphs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the model-level requirements onto the tasks instantiated for
    /// each role.
    ///
    /// # Errors
    ///
    /// Returns [`super::DataflowError::UnknownRole`] when a connected role
    /// has no task, or a policy conflict with existing requirements. The
    /// required graph is left unchanged on error.
    pub fn instantiate_model(&mut self, roles: &BTreeMap<RoleName, TaskId>) -> DataflowResult<()> {
        self.model.instantiate(roles, &mut self.required)
    }

    /// Drops every required and actual connection of `task`.
    pub fn remove_task(&mut self, task: &TaskId) {
        self.required.remove_node(task);
        self.actual.remove_node(task);
    }

    /// Computes the changes needed to bring the actual graph in line with
    /// the concrete form of the required graph.
    ///
    /// # Errors
    ///
    /// Returns reconciliation errors raised while flattening composites.
    pub fn pending_changes<F>(&self, is_composite: F) -> DataflowResult<ConnectionDiff>
    where
        F: Fn(&TaskId) -> bool,
    {
        let concrete = self.required.flatten(is_composite)?;
        Ok(ConnectionDiff::between(&concrete, &self.actual))
    }
}
