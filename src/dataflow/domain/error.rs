//! Error types for dataflow graph operations.

use std::fmt;
use thiserror::Error;

/// Result type for dataflow graph operations.
pub type DataflowResult<T> = Result<T, DataflowError>;

/// Two connection policies that cannot be reconciled.
///
/// The conflict names the offending field and both values. When raised
/// while walking composite forwarding, `path` lists the `task.port`
/// endpoints visited from the port the walk started at.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("incompatible connection policy {field}: {left} vs {right}{}", via(.path))]
pub struct PolicyConflict {
    field: String,
    left: String,
    right: String,
    path: Vec<String>,
}

impl PolicyConflict {
    /// Creates a conflict for `field` between two rendered values.
    #[must_use]
    pub fn new(field: impl Into<String>, left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            left: left.into(),
            right: right.into(),
            path: Vec::new(),
        }
    }

    /// Records the port path that led to the conflict.
    ///
    /// The first recorded path wins so that nested walks keep the most
    /// precise location.
    #[must_use]
    pub fn along<T: fmt::Display>(mut self, path: impl IntoIterator<Item = T>) -> Self {
        if self.path.is_empty() {
            self.path = path.into_iter().map(|step| step.to_string()).collect();
        }
        self
    }

    /// Returns the name of the conflicting field.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the value already recorded.
    #[must_use]
    pub fn left(&self) -> &str {
        &self.left
    }

    /// Returns the value being merged in.
    #[must_use]
    pub fn right(&self) -> &str {
        &self.right
    }

    /// Returns the endpoints walked before the conflict was detected.
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }
}

fn via(path: &[String]) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" (via {})", path.join(" <> "))
    }
}

/// Errors returned by connection graph operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DataflowError {
    /// Two requirements on the same port pair carry incompatible policies.
    #[error(transparent)]
    PolicyConflict(#[from] PolicyConflict),

    /// A connection request named no port pair.
    #[error("connection {from} -> {to} must map at least one port pair")]
    EmptyMappings {
        /// Source node, rendered.
        from: String,
        /// Sink node, rendered.
        to: String,
    },

    /// A model-level role has no task to instantiate onto.
    #[error("role {0} has no instantiated task")]
    UnknownRole(String),

    /// A port name is empty or contains whitespace.
    #[error("invalid port name '{0}'")]
    InvalidPortName(String),

    /// A role name is empty or contains whitespace.
    #[error("invalid role name '{0}'")]
    InvalidRoleName(String),
}

/// Error returned while parsing a policy kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown connection policy type: {0}")]
pub struct ParsePolicyKindError(pub String);
