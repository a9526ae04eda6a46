//! Port contracts for dataflow deployment.
//!
//! Ports define infrastructure-agnostic interfaces used by the dataflow
//! synchronisation service.

mod deployment;

pub use deployment::{DeploymentError, DeploymentLayer, DeploymentResult};
