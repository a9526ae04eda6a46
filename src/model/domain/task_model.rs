//! Task models: component and composition descriptions with their services.

use super::{
    Capability, CapabilityName, DynamicPort, MappingTable, ModelError, ModelResult,
    PortDeclaration, PortDirection, PortMapping, PortSet, ServiceId, ServiceModel, ServiceName,
    TaskModelName,
};
use crate::dataflow::domain::PortName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Whether a task model runs code or only groups children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskModelKind {
    /// A leaf component.
    Component,
    /// A composite whose ports forward to its children.
    Composition,
}

/// Description of a kind of task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskModel {
    name: TaskModelName,
    kind: TaskModelKind,
    ports: PortSet,
    dynamic_inputs: Vec<DynamicPort>,
    dynamic_outputs: Vec<DynamicPort>,
    services: Vec<ServiceModel>,
}

impl TaskModel {
    /// Creates a component model.
    #[must_use]
    pub const fn component(name: TaskModelName, ports: PortSet) -> Self {
        Self::new(name, TaskModelKind::Component, ports)
    }

    /// Creates a composition model.
    #[must_use]
    pub const fn composition(name: TaskModelName, ports: PortSet) -> Self {
        Self::new(name, TaskModelKind::Composition, ports)
    }

    const fn new(name: TaskModelName, kind: TaskModelKind, ports: PortSet) -> Self {
        Self {
            name,
            kind,
            ports,
            dynamic_inputs: Vec::new(),
            dynamic_outputs: Vec::new(),
            services: Vec::new(),
        }
    }

    /// Adds a pattern of input ports created on demand.
    #[must_use]
    pub fn with_dynamic_input(mut self, port: DynamicPort) -> Self {
        self.dynamic_inputs.push(port);
        self
    }

    /// Adds a pattern of output ports created on demand.
    #[must_use]
    pub fn with_dynamic_output(mut self, port: DynamicPort) -> Self {
        self.dynamic_outputs.push(port);
        self
    }

    /// Returns the model name.
    #[must_use]
    pub const fn name(&self) -> &TaskModelName {
        &self.name
    }

    /// Returns the model kind.
    #[must_use]
    pub const fn kind(&self) -> TaskModelKind {
        self.kind
    }

    /// Returns whether tasks of this model are composites.
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self.kind, TaskModelKind::Composition)
    }

    /// Returns the statically declared ports.
    #[must_use]
    pub const fn ports(&self) -> &PortSet {
        &self.ports
    }

    /// Returns the dynamic input patterns.
    #[must_use]
    pub fn dynamic_inputs(&self) -> &[DynamicPort] {
        &self.dynamic_inputs
    }

    /// Returns the dynamic output patterns.
    #[must_use]
    pub fn dynamic_outputs(&self) -> &[DynamicPort] {
        &self.dynamic_outputs
    }

    /// Returns whether an input port named `name` can be created on demand.
    #[must_use]
    pub fn has_dynamic_input(&self, name: &str) -> bool {
        self.dynamic_inputs.iter().any(|port| port.matches(name))
    }

    /// Returns whether an output port named `name` can be created on demand.
    #[must_use]
    pub fn has_dynamic_output(&self, name: &str) -> bool {
        self.dynamic_outputs.iter().any(|port| port.matches(name))
    }

    /// Returns the declared port `name` if it has the given direction.
    #[must_use]
    pub fn port(&self, name: &str, direction: PortDirection) -> Option<&PortDeclaration> {
        self.ports
            .get(name)
            .filter(|port| port.direction() == direction)
    }

    /// Returns every service in declaration order.
    #[must_use]
    pub fn services(&self) -> &[ServiceModel] {
        &self.services
    }

    /// Returns the service with the given id.
    #[must_use]
    pub fn service(&self, id: ServiceId) -> Option<&ServiceModel> {
        self.services.get(id.index())
    }

    /// Iterates over services without a master.
    pub fn root_services(&self) -> impl Iterator<Item = &ServiceModel> {
        self.services.iter().filter(|service| service.is_root())
    }

    /// Looks up a service by full name.
    #[must_use]
    pub fn find_service(&self, full_name: &str) -> Option<&ServiceModel> {
        self.services
            .iter()
            .find(|service| service.full_name() == full_name)
    }

    /// Returns whether any service fulfils `capability`.
    #[must_use]
    pub fn fullfills(&self, capability: &CapabilityName) -> bool {
        self.services
            .iter()
            .any(|service| service.fullfills(capability))
    }

    /// Declares a root service named `name` providing `capability`.
    ///
    /// `mapping` maps capability port names onto model ports. Unmapped
    /// capability ports resolve to the model port of the same name, then to
    /// the only model port with the same direction and type, then to a
    /// dynamic port of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateService`] when the name is taken,
    /// [`ModelError::PortNotFound`] when a capability port cannot be
    /// resolved and [`ModelError::PortTypeMismatch`] when its target has the
    /// wrong direction or type.
    pub fn provide(
        &mut self,
        name: &str,
        capability: Arc<Capability>,
        mapping: &PortMapping,
    ) -> ModelResult<ServiceId> {
        self.declare_service(None, name, capability, mapping)
    }

    /// Declares a slave service of `master`.
    ///
    /// The slave's full name is `<master full name>.<name>`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ServiceNotFound`] when `master` is not a
    /// service of this model, plus every error of [`Self::provide`].
    pub fn provide_slave(
        &mut self,
        master: ServiceId,
        name: &str,
        capability: Arc<Capability>,
        mapping: &PortMapping,
    ) -> ModelResult<ServiceId> {
        self.declare_service(Some(master), name, capability, mapping)
    }

    /// Selects the service to use as `capability`.
    ///
    /// Candidates are the services fulfilling `capability`, restricted by
    /// `name_pattern` (a dot-aligned suffix of the full name) when given.
    /// Among several candidates the only root service wins.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ServiceNotFound`] when nothing matches and
    /// [`ModelError::AmbiguousService`] when several candidates remain.
    pub fn find_matching(
        &self,
        capability: &CapabilityName,
        name_pattern: Option<&str>,
    ) -> ModelResult<&ServiceModel> {
        let candidates: Vec<&ServiceModel> = self
            .services
            .iter()
            .filter(|service| service.fullfills(capability))
            .filter(|service| name_pattern.is_none_or(|pattern| service.matches_pattern(pattern)))
            .collect();

        match candidates.as_slice() {
            [] => Err(ModelError::ServiceNotFound {
                model: self.name.clone(),
                query: name_pattern.map_or_else(
                    || capability.to_string(),
                    |pattern| format!("{capability} named {pattern}"),
                ),
            }),
            [only] => Ok(*only),
            _ => {
                let mut roots = candidates.iter().filter(|service| service.is_root());
                match (roots.next(), roots.next()) {
                    (Some(root), None) => Ok(*root),
                    _ => Err(ModelError::AmbiguousService {
                        model: self.name.clone(),
                        capability: capability.clone(),
                        candidates: candidates
                            .iter()
                            .map(|service| service.full_name().to_owned())
                            .collect(),
                    }),
                }
            }
        }
    }

    fn declare_service(
        &mut self,
        master: Option<ServiceId>,
        name: &str,
        capability: Arc<Capability>,
        mapping: &PortMapping,
    ) -> ModelResult<ServiceId> {
        let service_name = ServiceName::new(name)?;
        let full_name = match master {
            Some(master_id) => {
                let master_service = self.service(master_id).ok_or_else(|| ModelError::ServiceNotFound {
                    model: self.name.clone(),
                    query: master_id.to_string(),
                })?;
                format!("{}.{service_name}", master_service.full_name())
            }
            None => service_name.to_string(),
        };
        if self.find_service(&full_name).is_some() {
            return Err(ModelError::DuplicateService {
                model: self.name.clone(),
                service: full_name,
            });
        }

        if let Some((unknown, _)) = mapping
            .iter()
            .find(|(from, _)| !capability.ports().contains(from.as_str()))
        {
            return Err(ModelError::PortNotFound {
                owner: capability.name().to_string(),
                port: unknown.to_string(),
            });
        }

        let mut to_model = PortMapping::new();
        for declared in capability.ports().iter() {
            let real = self.resolve_real_port(declared, mapping)?;
            to_model = to_model.with(declared.name().clone(), real);
        }
        let port_mappings: MappingTable = capability
            .port_mappings()
            .iter()
            .map(|(ancestor, ancestor_mapping)| (ancestor.clone(), ancestor_mapping.then(&to_model)))
            .collect();

        let id = ServiceId::from_index(self.services.len());
        debug!(
            model = %self.name,
            service = %full_name,
            capability = %capability.name(),
            "service declared"
        );
        self.services.push(ServiceModel::new(
            id,
            service_name,
            full_name,
            master,
            capability,
            port_mappings,
        ));
        Ok(id)
    }

    fn resolve_real_port(
        &self,
        declared: &PortDeclaration,
        mapping: &PortMapping,
    ) -> ModelResult<PortName> {
        if let Some(target) = mapping.get(declared.name().as_str()) {
            return self.check_real_port(declared, target);
        }
        if self.ports.contains(declared.name().as_str()) {
            return self.check_real_port(declared, declared.name());
        }

        let mut same_type = self.ports.by_direction(declared.direction()).filter(|port| {
            port.type_name() == declared.type_name()
        });
        if let (Some(only), None) = (same_type.next(), same_type.next()) {
            return Ok(only.name().clone());
        }
        self.check_real_port(declared, declared.name())
    }

    fn check_real_port(&self, declared: &PortDeclaration, target: &PortName) -> ModelResult<PortName> {
        if let Some(real) = self.ports.get(target.as_str()) {
            if !real.is_compatible_with(declared) {
                return Err(ModelError::PortTypeMismatch {
                    owner: self.name.to_string(),
                    port: target.clone(),
                    expected: declared.signature(),
                    actual: real.signature(),
                });
            }
            return Ok(target.clone());
        }

        let dynamic = match declared.direction() {
            PortDirection::Input => &self.dynamic_inputs,
            PortDirection::Output => &self.dynamic_outputs,
        };
        if dynamic
            .iter()
            .any(|port| port.accepts(target.as_str(), declared.type_name()))
        {
            return Ok(target.clone());
        }
        Err(ModelError::PortNotFound {
            owner: self.name.to_string(),
            port: target.to_string(),
        })
    }
}

impl fmt::Display for TaskModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            TaskModelKind::Component => "component",
            TaskModelKind::Composition => "composition",
        };
        writeln!(f, "{kind} {}", self.name)?;
        for port in self.ports.iter() {
            writeln!(f, "  {port}")?;
        }
        for port in &self.dynamic_inputs {
            writeln!(f, "  dynamic input {port}")?;
        }
        for port in &self.dynamic_outputs {
            writeln!(f, "  dynamic output {port}")?;
        }
        for service in &self.services {
            writeln!(f, "  service {service}")?;
        }
        Ok(())
    }
}
