//! The plan: task registry and composite hierarchy.

use super::{PlanError, PlanResult, ServiceBinding, Task, TaskEndpoint};
use crate::config::PlannerConfig;
use crate::dataflow::domain::TaskId;
use crate::model::domain::{CapabilityName, ServiceId, TaskModelName};
use crate::model::ports::ComponentCatalog;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use tracing::debug;

/// Set of tasks the planner works on.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    tasks: HashMap<TaskId, Task>,
    config: PlannerConfig,
}

impl Plan {
    /// Creates an empty plan with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty plan with `config`.
    #[must_use]
    pub fn with_config(config: PlannerConfig) -> Self {
        Self {
            tasks: HashMap::new(),
            config,
        }
    }

    /// Returns the planner configuration.
    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Adds a task and returns its id.
    pub fn add_task(&mut self, task: Task) -> TaskId {
        let id = task.id();
        debug!(task = %id, model = %task.model().name(), "task added");
        self.tasks.insert(id, task);
        id
    }

    /// Instantiates the task model `name` found in `catalog`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::UnknownTaskModel`] when the catalog has no such
    /// model.
    pub fn instantiate<C>(&mut self, catalog: &C, name: &TaskModelName) -> PlanResult<TaskId>
    where
        C: ComponentCatalog + ?Sized,
    {
        let model = catalog
            .task_model(name)
            .ok_or_else(|| PlanError::UnknownTaskModel(name.clone()))?;
        Ok(self.add_task(Task::new(model)))
    }

    /// Returns the task with the given id.
    #[must_use]
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Returns the task with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::UnknownTask`] when the task is not in the plan.
    pub fn require(&self, id: &TaskId) -> PlanResult<&Task> {
        self.tasks.get(id).ok_or(PlanError::UnknownTask(*id))
    }

    /// Iterates over every task, in no particular order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Returns whether the task is in the plan.
    #[must_use]
    pub fn contains(&self, id: &TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    /// Returns the number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns whether the plan has no task.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns whether `id` is a composite task of this plan.
    #[must_use]
    pub fn is_composite(&self, id: &TaskId) -> bool {
        self.tasks.get(id).is_some_and(Task::is_composite)
    }

    /// Attaches `child` under the composite `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::UnknownTask`] for a missing task,
    /// [`PlanError::NotComposite`] when `parent` is not a composite and
    /// [`PlanError::CompositionCycle`] when `child` is `parent` or one of
    /// its ancestors.
    pub fn add_child(&mut self, parent: TaskId, child: TaskId) -> PlanResult<()> {
        if !self.require(&parent)?.is_composite() {
            return Err(PlanError::NotComposite(parent));
        }
        self.require(&child)?;
        if parent == child || self.is_ancestor(&child, &parent) {
            return Err(PlanError::CompositionCycle { parent, child });
        }

        self.task_mut(&parent)?.children_mut().insert(child);
        self.task_mut(&child)?.parents_mut().insert(parent);
        Ok(())
    }

    /// Returns whether `ancestor` is a (transitive) parent of `task`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: &TaskId, task: &TaskId) -> bool {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<TaskId> = self
            .tasks
            .get(task)
            .map(|task| task.parents().iter().copied().collect())
            .unwrap_or_default();
        while let Some(current) = queue.pop_front() {
            if current == *ancestor {
                return true;
            }
            if seen.insert(current)
                && let Some(next) = self.tasks.get(&current)
            {
                queue.extend(next.parents().iter().copied());
            }
        }
        false
    }

    /// Binds the service of `task` to use as `capability`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::UnknownTask`] for a missing task and
    /// [`PlanError::Model`] when no single service can be selected.
    pub fn bind(
        &self,
        task: TaskId,
        capability: &CapabilityName,
        name_pattern: Option<&str>,
    ) -> PlanResult<ServiceBinding> {
        let service = self
            .require(&task)?
            .model()
            .find_matching(capability, name_pattern)?;
        Ok(ServiceBinding::new(task, service.clone()))
    }

    /// Returns an endpoint naming the real ports of `task`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::UnknownTask`] for a missing task.
    pub fn endpoint(&self, task: TaskId) -> PlanResult<TaskEndpoint> {
        let model = self.require(&task)?.model().clone();
        Ok(TaskEndpoint::new(
            task,
            model,
            self.config.allow_dynamic_ports,
        ))
    }

    /// Removes `task` from the plan and from its parents and children.
    ///
    /// Graphs are owned separately; callers drop the task's edges with
    /// [`crate::dataflow::domain::DataflowGraphs::remove_task`].
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::UnknownTask`] when the task is not in the plan.
    pub fn remove_task(&mut self, id: &TaskId) -> PlanResult<Task> {
        let task = self.tasks.remove(id).ok_or(PlanError::UnknownTask(*id))?;
        for parent in task.parents() {
            if let Some(parent_task) = self.tasks.get_mut(parent) {
                parent_task.children_mut().remove(id);
            }
        }
        for child in task.children() {
            if let Some(child_task) = self.tasks.get_mut(child) {
                child_task.parents_mut().remove(id);
            }
        }
        debug!(task = %id, "task removed");
        Ok(task)
    }

    /// Moves the hierarchy links, arguments and mission flag of `other`
    /// onto `candidate`, records `resources` on `candidate` and removes
    /// `other`.
    pub(crate) fn absorb(
        &mut self,
        candidate: TaskId,
        other: TaskId,
        resources: BTreeMap<ServiceId, String>,
    ) -> PlanResult<Task> {
        self.require(&candidate)?;
        let removed = self.remove_task(&other)?;

        for parent in removed.parents() {
            if let Some(task) = self.tasks.get_mut(parent) {
                task.children_mut().insert(candidate);
            }
        }
        for child in removed.children() {
            if let Some(task) = self.tasks.get_mut(child) {
                task.parents_mut().insert(candidate);
            }
        }

        let target = self.task_mut(&candidate)?;
        target.parents_mut().extend(removed.parents().iter().copied());
        target
            .children_mut()
            .extend(removed.children().iter().copied());
        for (name, value) in removed.arguments() {
            target
                .arguments_mut()
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
        target.resources_mut().extend(resources);
        if removed.is_mission() {
            target.set_mission(true);
        }
        Ok(removed)
    }

    fn task_mut(&mut self, id: &TaskId) -> PlanResult<&mut Task> {
        self.tasks.get_mut(id).ok_or(PlanError::UnknownTask(*id))
    }
}
