//! Component-description port: lookup of declared models by name.

use crate::model::domain::{Capability, CapabilityName, TaskModel, TaskModelName};
use std::sync::Arc;

/// Read access to the capabilities and task models known to the planner.
///
/// Implementations load descriptions from wherever components are
/// described; the planner only needs lookups by name.
pub trait ComponentCatalog: Send + Sync {
    /// Returns the task model named `name`.
    fn task_model(&self, name: &TaskModelName) -> Option<Arc<TaskModel>>;

    /// Returns the capability named `name`.
    fn capability(&self, name: &CapabilityName) -> Option<Arc<Capability>>;
}
