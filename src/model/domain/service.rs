//! Service models: capabilities bound onto task models.

use super::{
    Capability, CapabilityName, MappingTable, ModelError, ModelResult, PortMapping, ServiceName,
};
use crate::dataflow::domain::PortName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Index of a service within its task model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceId(usize);

impl ServiceId {
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Returns the position of the service in its task model.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A capability as provided by a task model.
///
/// `port_mappings` maps the port names of every fulfilled capability onto
/// the real ports of the task model. Service models never change once
/// declared; [`Self::narrow`] derives restricted copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceModel {
    id: ServiceId,
    name: ServiceName,
    full_name: String,
    master: Option<ServiceId>,
    capability: Arc<Capability>,
    port_mappings: MappingTable,
}

impl ServiceModel {
    pub(crate) fn new(
        id: ServiceId,
        name: ServiceName,
        full_name: String,
        master: Option<ServiceId>,
        capability: Arc<Capability>,
        port_mappings: MappingTable,
    ) -> Self {
        Self {
            id,
            name,
            full_name,
            master,
            capability,
            port_mappings,
        }
    }

    /// Returns the service id.
    #[must_use]
    pub const fn id(&self) -> ServiceId {
        self.id
    }

    /// Returns the local service name.
    #[must_use]
    pub const fn name(&self) -> &ServiceName {
        &self.name
    }

    /// Returns the dot-qualified name (`master.slave`).
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Returns the master service, if this is a slave.
    #[must_use]
    pub const fn master(&self) -> Option<ServiceId> {
        self.master
    }

    /// Returns whether the service has no master.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.master.is_none()
    }

    /// Returns the capability this service is viewed as.
    #[must_use]
    pub fn capability(&self) -> &Arc<Capability> {
        &self.capability
    }

    /// Returns the mapping table onto the task model's ports.
    #[must_use]
    pub const fn port_mappings(&self) -> &MappingTable {
        &self.port_mappings
    }

    /// Returns whether the service fulfils `capability`.
    #[must_use]
    pub fn fullfills(&self, capability: &CapabilityName) -> bool {
        self.port_mappings.contains_key(capability)
    }

    /// Returns the mapping from `capability`'s port names onto real ports.
    #[must_use]
    pub fn mapping_for(&self, capability: &CapabilityName) -> Option<&PortMapping> {
        self.port_mappings.get(capability)
    }

    /// Translates a port name of the service's capability into the real
    /// task model port.
    #[must_use]
    pub fn real_port(&self, capability_port: &str) -> Option<&PortName> {
        self.mapping_for(self.capability.name())
            .and_then(|mapping| mapping.get(capability_port))
    }

    /// Returns a view of this service as `capability`.
    ///
    /// The view keeps the mappings of the capabilities `capability` itself
    /// fulfils.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::CapabilityNotProvided`] when the service does
    /// not fulfil `capability`.
    pub fn narrow(&self, capability: &Arc<Capability>) -> ModelResult<Self> {
        if !self.fullfills(capability.name()) {
            return Err(ModelError::CapabilityNotProvided {
                service: self.full_name.clone(),
                capability: capability.name().clone(),
            });
        }
        let port_mappings = self
            .port_mappings
            .iter()
            .filter(|(ancestor, _)| capability.fullfills(ancestor))
            .map(|(ancestor, mapping)| (ancestor.clone(), mapping.clone()))
            .collect();
        Ok(Self {
            capability: Arc::clone(capability),
            port_mappings,
            ..self.clone()
        })
    }

    /// Returns whether `pattern` is a dot-aligned suffix of the full name.
    ///
    /// `camera` matches `camera` and `driver.camera`, but not `webcamera`.
    #[must_use]
    pub fn matches_pattern(&self, pattern: &str) -> bool {
        self.full_name == pattern
            || self
                .full_name
                .strip_suffix(pattern)
                .is_some_and(|head| head.ends_with('.'))
    }
}

impl fmt::Display for ServiceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.full_name, self.capability.name())
    }
}
