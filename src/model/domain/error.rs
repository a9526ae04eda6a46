//! Error types for capability and task model declarations.

use super::{CapabilityName, TaskModelName};
use crate::dataflow::domain::{DataflowError, PortName};
use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors returned while declaring or querying capabilities and services.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A capability name is empty after trimming.
    #[error("capability name must not be empty")]
    EmptyCapabilityName,

    /// A task model name is empty after trimming.
    #[error("task model name must not be empty")]
    EmptyTaskModelName,

    /// A service name is empty or contains a dot or whitespace.
    #[error("invalid service name '{0}' (dots separate master and slave services)")]
    InvalidServiceName(String),

    /// A dynamic port pattern is not a valid regular expression.
    #[error("invalid dynamic port pattern '{pattern}': {reason}")]
    InvalidPortPattern {
        /// Offending pattern.
        pattern: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// A port set already holds a port with this name.
    #[error("port {port} is declared twice on {owner}")]
    DuplicatePort {
        /// Capability or task model declaring the ports.
        owner: String,
        /// Duplicated port name.
        port: PortName,
    },

    /// A task model already provides a service with this full name.
    #[error("task model {model} already provides a service named {service}")]
    DuplicateService {
        /// Task model name.
        model: TaskModelName,
        /// Full name of the duplicated service.
        service: String,
    },

    /// A capability with this name is already registered.
    #[error("capability {0} is already declared")]
    DuplicateCapability(CapabilityName),

    /// A task model with this name is already registered.
    #[error("task model {0} is already declared")]
    DuplicateTaskModel(TaskModelName),

    /// No service on the model matches the query.
    #[error("no service of task model {model} matches {query}")]
    ServiceNotFound {
        /// Task model name.
        model: TaskModelName,
        /// Rendered query (capability, name pattern or service id).
        query: String,
    },

    /// Several services match and none can be preferred.
    #[error(
        "several services of task model {model} provide {capability}: {}",
        .candidates.join(", ")
    )]
    AmbiguousService {
        /// Task model name.
        model: TaskModelName,
        /// Requested capability.
        capability: CapabilityName,
        /// Full names of every remaining candidate.
        candidates: Vec<String>,
    },

    /// A service was asked to act as a capability it does not provide.
    #[error("service {service} does not provide {capability}")]
    CapabilityNotProvided {
        /// Full name of the service.
        service: String,
        /// Requested capability.
        capability: CapabilityName,
    },

    /// A port does not exist and cannot be created dynamically.
    #[error("port {port} does not exist on {owner}")]
    PortNotFound {
        /// Capability, task model or task searched.
        owner: String,
        /// Searched port name.
        port: String,
    },

    /// A port exists but with the wrong direction or type.
    #[error("port {port} on {owner} is {actual}, expected {expected}")]
    PortTypeMismatch {
        /// Capability or task model owning the port.
        owner: String,
        /// Port name.
        port: PortName,
        /// Expected direction and type, rendered.
        expected: String,
        /// Declared direction and type, rendered.
        actual: String,
    },

    /// Two different targets are recorded for the same ancestor port.
    #[error(
        "conflicting mappings for port {port} of {capability}: {existing} vs {requested}"
    )]
    PortMappingConflict {
        /// Ancestor capability whose port is mapped.
        capability: CapabilityName,
        /// Ancestor port name.
        port: PortName,
        /// Target already recorded.
        existing: PortName,
        /// Target being merged in.
        requested: PortName,
    },

    /// A port name failed validation.
    #[error(transparent)]
    Dataflow(#[from] DataflowError),
}
