//! Connection endpoints: anything that can name ports of a task.

use super::{PlanError, PlanResult};
use crate::dataflow::domain::{
    ConnectionGraph, ConnectionMappings, ConnectionPolicy, DataflowError, PortName, PortPair,
    TaskId,
};
use crate::model::domain::{ModelError, PortDirection, TaskModel};
use std::collections::btree_map::Entry;
use std::sync::Arc;

/// One side of a connection declaration.
///
/// Endpoints translate the port names a caller uses into real port names of
/// their task.
pub trait ConnectionEndpoint {
    /// Returns the task the endpoint designates.
    fn task(&self) -> TaskId;

    /// Resolves an output port name.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Model`] wrapping
    /// [`ModelError::PortNotFound`] when the name cannot be resolved.
    fn resolve_output(&self, name: &str) -> PlanResult<PortName>;

    /// Resolves an input port name.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Model`] wrapping
    /// [`ModelError::PortNotFound`] when the name cannot be resolved.
    fn resolve_input(&self, name: &str) -> PlanResult<PortName>;

    /// Records connections from this endpoint's outputs to `sink`'s inputs
    /// in `graph`.
    ///
    /// Each mapping is `(output name, input name, policy)`, named the way
    /// each endpoint understands them. Every name is resolved before the
    /// graph is touched.
    ///
    /// # Errors
    ///
    /// Returns resolution errors, [`DataflowError::EmptyMappings`] for an
    /// empty mapping list and [`DataflowError::PolicyConflict`] when
    /// policies cannot be reconciled. The graph is unchanged on error.
    fn connect_to<'a, E>(
        &self,
        sink: &E,
        mappings: impl IntoIterator<Item = (&'a str, &'a str, ConnectionPolicy)>,
        graph: &mut ConnectionGraph<TaskId>,
    ) -> PlanResult<()>
    where
        E: ConnectionEndpoint + ?Sized,
    {
        let mut resolved = ConnectionMappings::new();
        for (output, input, policy) in mappings {
            let pair = PortPair::new(self.resolve_output(output)?, sink.resolve_input(input)?);
            match resolved.entry(pair) {
                Entry::Vacant(slot) => {
                    slot.insert(policy);
                }
                Entry::Occupied(mut slot) => {
                    let merged = slot
                        .get()
                        .merge(&policy)
                        .map_err(|conflict| DataflowError::from(conflict.along([slot.key()])))?;
                    slot.insert(merged);
                }
            }
        }
        graph.connect(self.task(), sink.task(), resolved)?;
        Ok(())
    }
}

/// Endpoint naming a task's real ports directly.
#[derive(Debug, Clone)]
pub struct TaskEndpoint {
    task: TaskId,
    model: Arc<TaskModel>,
    allow_dynamic_ports: bool,
}

impl TaskEndpoint {
    /// Creates an endpoint over `task`, an instance of `model`.
    ///
    /// With `allow_dynamic_ports`, undeclared names matching one of the
    /// model's dynamic port patterns are accepted. Ports of a composite
    /// forward in both directions: an input is also the source of the edges
    /// feeding its children.
    #[must_use]
    pub const fn new(task: TaskId, model: Arc<TaskModel>, allow_dynamic_ports: bool) -> Self {
        Self {
            task,
            model,
            allow_dynamic_ports,
        }
    }

    fn resolve(&self, name: &str, direction: PortDirection) -> PlanResult<PortName> {
        let declared = if self.model.is_composite() {
            self.model.ports().get(name)
        } else {
            self.model.port(name, direction)
        };
        if let Some(port) = declared {
            return Ok(port.name().clone());
        }
        let dynamic = match direction {
            PortDirection::Input => self.model.has_dynamic_input(name),
            PortDirection::Output => self.model.has_dynamic_output(name),
        };
        if self.allow_dynamic_ports && dynamic {
            return Ok(PortName::new(name)?);
        }
        Err(PlanError::Model(ModelError::PortNotFound {
            owner: format!("{} ({})", self.model.name(), self.task),
            port: name.to_owned(),
        }))
    }
}

impl ConnectionEndpoint for TaskEndpoint {
    fn task(&self) -> TaskId {
        self.task
    }

    fn resolve_output(&self, name: &str) -> PlanResult<PortName> {
        self.resolve(name, PortDirection::Output)
    }

    fn resolve_input(&self, name: &str) -> PlanResult<PortName> {
        self.resolve(name, PortDirection::Input)
    }
}
