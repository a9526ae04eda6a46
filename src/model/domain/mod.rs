//! Domain model for capabilities and the services task models provide.
//!
//! Capabilities compose: a capability may provide other capabilities, and
//! the mapping from every ancestor's port names onto its own is kept
//! transitively. Service models bind a capability onto a task model and
//! extend those mappings down to the model's real port names.

mod capability;
mod error;
mod mapping;
mod names;
mod port;
mod service;
mod task_model;

pub use capability::Capability;
pub use error::{ModelError, ModelResult};
pub use mapping::{MappingTable, PortMapping};
pub use names::{CapabilityName, ServiceName, TaskModelName};
pub use port::{DynamicPort, PortDeclaration, PortDirection, PortSet};
pub use service::{ServiceId, ServiceModel};
pub use task_model::{TaskModel, TaskModelKind};
