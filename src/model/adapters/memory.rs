//! In-memory component catalog.

use crate::model::{
    domain::{Capability, CapabilityName, ModelError, ModelResult, TaskModel, TaskModelName},
    ports::ComponentCatalog,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Catalog holding declared capabilities and task models in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryComponentCatalog {
    capabilities: HashMap<CapabilityName, Arc<Capability>>,
    task_models: HashMap<TaskModelName, Arc<TaskModel>>,
}

impl InMemoryComponentCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a capability and returns the shared handle.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateCapability`] when a capability with
    /// the same name is already registered.
    pub fn declare_capability(&mut self, capability: Capability) -> ModelResult<Arc<Capability>> {
        if self.capabilities.contains_key(capability.name()) {
            return Err(ModelError::DuplicateCapability(capability.name().clone()));
        }
        let shared = Arc::new(capability);
        self.capabilities
            .insert(shared.name().clone(), Arc::clone(&shared));
        Ok(shared)
    }

    /// Registers a task model and returns the shared handle.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateTaskModel`] when a task model with the
    /// same name is already registered.
    pub fn register_task_model(&mut self, model: TaskModel) -> ModelResult<Arc<TaskModel>> {
        if self.task_models.contains_key(model.name()) {
            return Err(ModelError::DuplicateTaskModel(model.name().clone()));
        }
        let shared = Arc::new(model);
        self.task_models
            .insert(shared.name().clone(), Arc::clone(&shared));
        Ok(shared)
    }

    /// Returns the number of registered task models.
    #[must_use]
    pub fn task_model_count(&self) -> usize {
        self.task_models.len()
    }
}

impl ComponentCatalog for InMemoryComponentCatalog {
    fn task_model(&self, name: &TaskModelName) -> Option<Arc<TaskModel>> {
        self.task_models.get(name).cloned()
    }

    fn capability(&self, name: &CapabilityName) -> Option<Arc<Capability>> {
        self.capabilities.get(name).cloned()
    }
}
