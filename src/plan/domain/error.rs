//! Error types for plan operations.

use crate::dataflow::domain::{DataflowError, TaskId};
use crate::model::domain::{ModelError, TaskModelName};
use thiserror::Error;

/// Result type for plan operations.
pub type PlanResult<T> = Result<T, PlanError>;

/// Errors returned by plan operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanError {
    /// The task is not part of the plan.
    #[error("task {0} is not part of the plan")]
    UnknownTask(TaskId),

    /// The catalog has no task model with this name.
    #[error("task model {0} is not in the catalog")]
    UnknownTaskModel(TaskModelName),

    /// A child was attached to a task that is not a composite.
    #[error("task {0} is not a composite")]
    NotComposite(TaskId),

    /// Attaching the child would make a task its own ancestor.
    #[error("adding {child} under {parent} would create a composition cycle")]
    CompositionCycle {
        /// Composite receiving the child.
        parent: TaskId,
        /// Task being attached.
        child: TaskId,
    },

    /// A model lookup or port resolution failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A graph operation failed.
    #[error(transparent)]
    Dataflow(#[from] DataflowError),
}
