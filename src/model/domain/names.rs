//! Validated names for capabilities, services and task models.

use super::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a capability (service type), possibly namespaced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityName(String);

impl CapabilityName {
    /// Creates a validated capability name.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptyCapabilityName`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let normalized = value.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(ModelError::EmptyCapabilityName);
        }
        Ok(Self(normalized))
    }

    /// Returns the capability name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Local name of a service on a task model.
///
/// Dots are reserved: they join a slave service's name to its master's in
/// the service's full name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceName(String);

impl ServiceName {
    /// Creates a validated service name.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidServiceName`] when the value is empty
    /// after trimming or contains a dot or whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let raw = value.into();
        let normalized = raw.trim();
        let is_valid = !normalized.is_empty()
            && !normalized.contains('.')
            && !normalized.contains(char::is_whitespace);
        if !is_valid {
            return Err(ModelError::InvalidServiceName(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the service name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a task model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskModelName(String);

impl TaskModelName {
    /// Creates a validated task model name.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptyTaskModelName`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let normalized = value.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(ModelError::EmptyTaskModelName);
        }
        Ok(Self(normalized))
    }

    /// Returns the task model name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
