//! Typed port declarations and dynamic port patterns.

use super::{ModelError, ModelResult};
use crate::dataflow::domain::PortName;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Direction of a port relative to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    /// Data flows into the owner.
    Input,
    /// Data flows out of the owner.
    Output,
}

impl PortDirection {
    /// Returns the lowercase label for this direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed and directed port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortDeclaration {
    name: PortName,
    type_name: String,
    direction: PortDirection,
}

impl PortDeclaration {
    /// Creates an input port declaration.
    #[must_use]
    pub fn input(name: PortName, type_name: impl Into<String>) -> Self {
        Self {
            name,
            type_name: type_name.into(),
            direction: PortDirection::Input,
        }
    }

    /// Creates an output port declaration.
    #[must_use]
    pub fn output(name: PortName, type_name: impl Into<String>) -> Self {
        Self {
            name,
            type_name: type_name.into(),
            direction: PortDirection::Output,
        }
    }

    /// Returns the port name.
    #[must_use]
    pub const fn name(&self) -> &PortName {
        &self.name
    }

    /// Returns the name of the data type carried by the port.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the port direction.
    #[must_use]
    pub const fn direction(&self) -> PortDirection {
        self.direction
    }

    /// Returns whether `other` has the same direction and data type.
    #[must_use]
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        self.direction == other.direction && self.type_name == other.type_name
    }

    pub(crate) fn signature(&self) -> String {
        format!("{} of type {}", self.direction, self.type_name)
    }
}

impl fmt::Display for PortDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.direction, self.name, self.type_name)
    }
}

/// Set of port declarations keyed by name.
///
/// Input and output ports share one namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSet {
    ports: BTreeMap<PortName, PortDeclaration>,
}

impl PortSet {
    /// Creates an empty port set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an input port.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Dataflow`] for an invalid name and
    /// [`ModelError::DuplicatePort`] when the name is already used.
    pub fn with_input(self, name: &str, type_name: impl Into<String>) -> ModelResult<Self> {
        self.with_port(PortDeclaration::input(PortName::new(name)?, type_name))
    }

    /// Adds an output port.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Dataflow`] for an invalid name and
    /// [`ModelError::DuplicatePort`] when the name is already used.
    pub fn with_output(self, name: &str, type_name: impl Into<String>) -> ModelResult<Self> {
        self.with_port(PortDeclaration::output(PortName::new(name)?, type_name))
    }

    /// Adds a port declaration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicatePort`] when the name is already used.
    pub fn with_port(mut self, port: PortDeclaration) -> ModelResult<Self> {
        if self.ports.contains_key(port.name()) {
            return Err(ModelError::DuplicatePort {
                owner: "port set".to_owned(),
                port: port.name().clone(),
            });
        }
        self.ports.insert(port.name().clone(), port);
        Ok(self)
    }

    /// Looks up a port by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PortDeclaration> {
        self.ports.get(name)
    }

    /// Returns whether a port named `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.ports.contains_key(name)
    }

    /// Iterates over every declaration in name order.
    pub fn iter(&self) -> impl Iterator<Item = &PortDeclaration> {
        self.ports.values()
    }

    /// Iterates over input declarations.
    pub fn inputs(&self) -> impl Iterator<Item = &PortDeclaration> {
        self.by_direction(PortDirection::Input)
    }

    /// Iterates over output declarations.
    pub fn outputs(&self) -> impl Iterator<Item = &PortDeclaration> {
        self.by_direction(PortDirection::Output)
    }

    /// Iterates over declarations with the given direction.
    pub fn by_direction(&self, direction: PortDirection) -> impl Iterator<Item = &PortDeclaration> {
        self.ports
            .values()
            .filter(move |port| port.direction() == direction)
    }

    /// Returns the number of declared ports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Returns whether no port is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

/// Pattern of port names a component creates on demand.
#[derive(Debug, Clone)]
pub struct DynamicPort {
    pattern: Regex,
    source: String,
    type_name: Option<String>,
}

impl DynamicPort {
    /// Compiles a dynamic port pattern.
    ///
    /// The pattern must match the whole port name. `type_name` restricts the
    /// data type of created ports; `None` accepts any type.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPortPattern`] when the pattern does not
    /// compile.
    pub fn new(pattern: &str, type_name: Option<&str>) -> ModelResult<Self> {
        let compiled =
            Regex::new(&format!("^(?:{pattern})$")).map_err(|err| ModelError::InvalidPortPattern {
                pattern: pattern.to_owned(),
                reason: err.to_string(),
            })?;
        Ok(Self {
            pattern: compiled,
            source: pattern.to_owned(),
            type_name: type_name.map(str::to_owned),
        })
    }

    /// Returns the pattern as written.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.source
    }

    /// Returns the type restriction, if any.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Returns whether a port named `name` can be created from this pattern.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    /// Returns whether a port named `name` carrying `type_name` can be
    /// created from this pattern.
    #[must_use]
    pub fn accepts(&self, name: &str, type_name: &str) -> bool {
        self.matches(name) && self.type_name.as_deref().is_none_or(|ty| ty == type_name)
    }
}

impl PartialEq for DynamicPort {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.type_name == other.type_name
    }
}

impl Eq for DynamicPort {}

impl fmt::Display for DynamicPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_name {
            Some(ty) => write!(f, "/{}/: {ty}", self.source),
            None => write!(f, "/{}/", self.source),
        }
    }
}
