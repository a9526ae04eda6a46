//! Service bindings: a service model selected on a concrete task.

use super::{ConnectionEndpoint, PlanResult};
use crate::dataflow::domain::{PortName, TaskId};
use crate::model::domain::{Capability, ModelError, PortDirection, ServiceModel};
use std::fmt;
use std::sync::Arc;

/// A task viewed through one of its services.
///
/// Port names used on a binding are the port names of the service's
/// capability. Two bindings are equal when they designate the same task and
/// the same service model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceBinding {
    task: TaskId,
    service: ServiceModel,
}

impl ServiceBinding {
    /// Binds `service` on `task`.
    #[must_use]
    pub const fn new(task: TaskId, service: ServiceModel) -> Self {
        Self { task, service }
    }

    /// Returns the bound service model.
    #[must_use]
    pub const fn service(&self) -> &ServiceModel {
        &self.service
    }

    /// Returns the real port behind the capability input `name`.
    #[must_use]
    pub fn input_port(&self, name: &str) -> Option<PortName> {
        self.port(name, PortDirection::Input)
    }

    /// Returns the real port behind the capability output `name`.
    #[must_use]
    pub fn output_port(&self, name: &str) -> Option<PortName> {
        self.port(name, PortDirection::Output)
    }

    /// Like [`Self::input_port`], failing when the port does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::PortNotFound`] when the capability has no input
    /// named `name`.
    pub fn require_input(&self, name: &str) -> PlanResult<PortName> {
        self.input_port(name).ok_or_else(|| self.not_found(name))
    }

    /// Like [`Self::output_port`], failing when the port does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::PortNotFound`] when the capability has no
    /// output named `name`.
    pub fn require_output(&self, name: &str) -> PlanResult<PortName> {
        self.output_port(name).ok_or_else(|| self.not_found(name))
    }

    /// Returns the binding viewed as `capability`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::CapabilityNotProvided`] when the service does
    /// not fulfil `capability`.
    pub fn narrow(&self, capability: &Arc<Capability>) -> PlanResult<Self> {
        Ok(Self {
            task: self.task,
            service: self.service.narrow(capability)?,
        })
    }

    fn port(&self, name: &str, direction: PortDirection) -> Option<PortName> {
        self.service
            .capability()
            .ports()
            .get(name)
            .filter(|port| port.direction() == direction)
            .and_then(|_| self.service.real_port(name))
            .cloned()
    }

    fn not_found(&self, name: &str) -> super::PlanError {
        ModelError::PortNotFound {
            owner: self.to_string(),
            port: name.to_owned(),
        }
        .into()
    }
}

impl ConnectionEndpoint for ServiceBinding {
    fn task(&self) -> TaskId {
        self.task
    }

    fn resolve_output(&self, name: &str) -> PlanResult<PortName> {
        self.require_output(name)
    }

    fn resolve_input(&self, name: &str) -> PlanResult<PortName> {
        self.require_input(name)
    }
}

impl fmt::Display for ServiceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.task, self.service.full_name())
    }
}
