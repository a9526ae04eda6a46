//! Port mapping tables between capabilities and their providers.

use super::{CapabilityName, ModelError, ModelResult};
use crate::dataflow::domain::PortName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Mapping from the port names of an ancestor capability to the port names
/// of its provider.
///
/// Ports absent from the mapping keep their name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortMapping(BTreeMap<PortName, PortName>);

/// Port mappings of every capability a provider fulfils, keyed by
/// capability.
pub type MappingTable = BTreeMap<CapabilityName, PortMapping>;

impl PortMapping {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mapping from `(from, to)` name pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Dataflow`] for an invalid port name.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> ModelResult<Self> {
        pairs
            .into_iter()
            .map(|(from, to)| Ok((PortName::new(from)?, PortName::new(to)?)))
            .collect::<ModelResult<BTreeMap<_, _>>>()
            .map(Self)
    }

    /// Builds the identity mapping over `ports`.
    #[must_use]
    pub fn identity<'a>(ports: impl IntoIterator<Item = &'a PortName>) -> Self {
        Self(
            ports
                .into_iter()
                .map(|port| (port.clone(), port.clone()))
                .collect(),
        )
    }

    /// Adds or replaces one entry.
    #[must_use]
    pub fn with(mut self, from: PortName, to: PortName) -> Self {
        self.0.insert(from, to);
        self
    }

    /// Returns the explicit target of `port`, if any.
    #[must_use]
    pub fn get(&self, port: &str) -> Option<&PortName> {
        self.0.get(port)
    }

    /// Returns the target of `port`, defaulting to the same name.
    #[must_use]
    pub fn resolve(&self, port: &PortName) -> PortName {
        self.0.get(port).cloned().unwrap_or_else(|| port.clone())
    }

    /// Composes this mapping with `next`: each entry `a -> b` becomes
    /// `a -> next(b)`.
    #[must_use]
    pub fn then(&self, next: &Self) -> Self {
        Self(
            self.0
                .iter()
                .map(|(from, to)| (from.clone(), next.resolve(to)))
                .collect(),
        )
    }

    /// Merges this mapping into `existing`, the table entry recorded for
    /// `capability`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::PortMappingConflict`] when a port already has a
    /// different target. `existing` is left untouched on error.
    pub fn merge_into(&self, existing: &mut Self, capability: &CapabilityName) -> ModelResult<()> {
        for (port, target) in &self.0 {
            if let Some(current) = existing.0.get(port)
                && current != target
            {
                return Err(ModelError::PortMappingConflict {
                    capability: capability.clone(),
                    port: port.clone(),
                    existing: current.clone(),
                    requested: target.clone(),
                });
            }
        }
        existing
            .0
            .extend(self.0.iter().map(|(from, to)| (from.clone(), to.clone())));
        Ok(())
    }

    /// Iterates over explicit entries in port order.
    pub fn iter(&self) -> impl Iterator<Item = (&PortName, &PortName)> {
        self.0.iter()
    }

    /// Returns the number of explicit entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the mapping has no explicit entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (from, to) in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{from} -> {to}")?;
            first = false;
        }
        Ok(())
    }
}
