//! Capabilities: named, typed port interfaces that services provide.

use super::{CapabilityName, MappingTable, ModelError, ModelResult, PortMapping, PortSet};
use std::fmt;

/// A service type.
///
/// A capability declares ports and records, for every ancestor capability
/// it fulfils (itself included), how the ancestor's port names map onto its
/// own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    name: CapabilityName,
    ports: PortSet,
    port_mappings: MappingTable,
}

impl Capability {
    /// Declares a capability fulfilling only itself.
    #[must_use]
    pub fn declare(name: CapabilityName, ports: PortSet) -> Self {
        let identity = PortMapping::identity(ports.iter().map(|port| port.name()));
        let port_mappings = MappingTable::from([(name.clone(), identity)]);
        Self {
            name,
            ports,
            port_mappings,
        }
    }

    /// Returns the capability name.
    #[must_use]
    pub const fn name(&self) -> &CapabilityName {
        &self.name
    }

    /// Returns the declared ports.
    #[must_use]
    pub const fn ports(&self) -> &PortSet {
        &self.ports
    }

    /// Returns the mapping table of every fulfilled capability.
    #[must_use]
    pub const fn port_mappings(&self) -> &MappingTable {
        &self.port_mappings
    }

    /// Returns the mapping from `capability`'s port names onto this
    /// capability's ports.
    #[must_use]
    pub fn mapping_for(&self, capability: &CapabilityName) -> Option<&PortMapping> {
        self.port_mappings.get(capability)
    }

    /// Returns whether this capability fulfils `capability`.
    #[must_use]
    pub fn fullfills(&self, capability: &CapabilityName) -> bool {
        self.port_mappings.contains_key(capability)
    }

    /// Makes this capability fulfil `other` and every capability `other`
    /// fulfils.
    ///
    /// Ports of `other` resolve through `extra` and otherwise by name. Every
    /// target must be a port of this capability with the same direction and
    /// type.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::PortNotFound`] when `extra` names a port
    /// `other` lacks or a target is missing here,
    /// [`ModelError::PortTypeMismatch`] when a target differs in direction
    /// or type, and [`ModelError::PortMappingConflict`] when a fulfilled
    /// capability would gain a second target for one of its ports. The
    /// capability is left untouched on error.
    pub fn provide(&mut self, other: &Self, extra: &PortMapping) -> ModelResult<()> {
        if let Some((unknown, _)) = extra
            .iter()
            .find(|(from, _)| !other.ports.contains(from.as_str()))
        {
            return Err(ModelError::PortNotFound {
                owner: other.name.to_string(),
                port: unknown.to_string(),
            });
        }

        for declared in other.ports.iter() {
            let target = extra.resolve(declared.name());
            let own = self
                .ports
                .get(target.as_str())
                .ok_or_else(|| ModelError::PortNotFound {
                    owner: self.name.to_string(),
                    port: target.to_string(),
                })?;
            if !own.is_compatible_with(declared) {
                return Err(ModelError::PortTypeMismatch {
                    owner: self.name.to_string(),
                    port: target,
                    expected: declared.signature(),
                    actual: own.signature(),
                });
            }
        }

        let mut staged = self.port_mappings.clone();
        for (ancestor, mapping) in &other.port_mappings {
            let composed = mapping.then(extra);
            composed.merge_into(staged.entry(ancestor.clone()).or_default(), ancestor)?;
        }
        self.port_mappings = staged;
        Ok(())
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "capability {}", self.name)?;
        for port in self.ports.iter() {
            writeln!(f, "  {port}")?;
        }
        for (ancestor, mapping) in &self.port_mappings {
            if ancestor != &self.name {
                writeln!(f, "  provides {ancestor} [{mapping}]")?;
            }
        }
        Ok(())
    }
}
