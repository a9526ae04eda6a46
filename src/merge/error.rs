//! Error types for task merging.

use crate::dataflow::domain::{DataflowError, TaskId};
use crate::model::domain::{CapabilityName, ModelError};
use crate::plan::domain::PlanError;
use thiserror::Error;

/// Result type for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// Errors returned when checking or performing a merge.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MergeError {
    /// The tasks cannot merge regardless of their services.
    #[error("cannot merge {other} into {candidate}: {reason}")]
    StructuralMergeViolation {
        /// Task that would remain.
        candidate: TaskId,
        /// Task that would be removed.
        other: TaskId,
        /// Violated prerequisite.
        reason: String,
    },

    /// A root service of the merged task has no counterpart.
    #[error("{candidate} has no service compatible with {service} ({capability})")]
    NoCompatibleService {
        /// Task that would remain.
        candidate: TaskId,
        /// Full name of the unmatched service.
        service: String,
        /// Capability of the unmatched service.
        capability: CapabilityName,
    },

    /// Several services could take over a service and none is preferred.
    #[error("several services could take over {service}: {}", .candidates.join(", "))]
    AmbiguousMerge {
        /// Full name of the service being taken over.
        service: String,
        /// Full names of the compatible services.
        candidates: Vec<String>,
    },

    /// A port rename or lookup failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Rewritten connections could not be reconciled.
    #[error(transparent)]
    Dataflow(#[from] DataflowError),

    /// A task is missing from the plan.
    #[error(transparent)]
    Plan(#[from] PlanError),
}
