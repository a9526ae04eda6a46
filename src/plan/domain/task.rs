//! Task instances.

use crate::dataflow::domain::TaskId;
use crate::model::domain::{ServiceId, TaskModel};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// An instance of a task model within a plan.
///
/// The label is informative only and may be shared by several tasks; the
/// [`TaskId`] is the identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    id: TaskId,
    label: String,
    model: Arc<TaskModel>,
    arguments: BTreeMap<String, Value>,
    resources: BTreeMap<ServiceId, String>,
    parents: BTreeSet<TaskId>,
    children: BTreeSet<TaskId>,
    mission: bool,
}

impl Task {
    /// Creates a task of `model` with a fresh id, labelled after the model.
    #[must_use]
    pub fn new(model: Arc<TaskModel>) -> Self {
        Self {
            id: TaskId::new(),
            label: model.name().to_string(),
            model,
            arguments: BTreeMap::new(),
            resources: BTreeMap::new(),
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
            mission: false,
        }
    }

    /// Sets the instance label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets an argument value.
    #[must_use]
    pub fn with_argument(mut self, name: impl Into<String>, value: Value) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    /// Assigns an external resource (a device, a bus) to one of the task's
    /// services.
    #[must_use]
    pub fn with_resource(mut self, service: ServiceId, resource: impl Into<String>) -> Self {
        self.resources.insert(service, resource.into());
        self
    }

    /// Marks the task as explicitly required by the planner's caller.
    #[must_use]
    pub const fn as_mission(mut self) -> Self {
        self.mission = true;
        self
    }

    /// Returns the task id.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the instance label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the task model.
    #[must_use]
    pub const fn model(&self) -> &Arc<TaskModel> {
        &self.model
    }

    /// Returns whether the task is a composite.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        self.model.is_composite()
    }

    /// Returns every set argument.
    #[must_use]
    pub const fn arguments(&self) -> &BTreeMap<String, Value> {
        &self.arguments
    }

    /// Returns one argument value.
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }

    /// Returns the resources assigned per service.
    #[must_use]
    pub const fn resources(&self) -> &BTreeMap<ServiceId, String> {
        &self.resources
    }

    /// Returns the resource assigned to `service`.
    #[must_use]
    pub fn resource(&self, service: ServiceId) -> Option<&str> {
        self.resources.get(&service).map(String::as_str)
    }

    /// Returns the composites this task belongs to.
    #[must_use]
    pub const fn parents(&self) -> &BTreeSet<TaskId> {
        &self.parents
    }

    /// Returns the children of this composite.
    #[must_use]
    pub const fn children(&self) -> &BTreeSet<TaskId> {
        &self.children
    }

    /// Returns whether the task is a mission.
    #[must_use]
    pub const fn is_mission(&self) -> bool {
        self.mission
    }

    pub(super) const fn parents_mut(&mut self) -> &mut BTreeSet<TaskId> {
        &mut self.parents
    }

    pub(super) const fn children_mut(&mut self) -> &mut BTreeSet<TaskId> {
        &mut self.children
    }

    pub(super) const fn arguments_mut(&mut self) -> &mut BTreeMap<String, Value> {
        &mut self.arguments
    }

    pub(super) const fn resources_mut(&mut self) -> &mut BTreeMap<ServiceId, String> {
        &mut self.resources
    }

    pub(super) const fn set_mission(&mut self, mission: bool) {
        self.mission = mission;
    }
}
