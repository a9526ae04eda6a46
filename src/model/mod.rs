//! Capabilities, task models and service port mappings for Flowplan.
//!
//! A capability is an abstract bundle of ports (a "service type"). Task
//! models declare the capabilities they provide together with the mapping
//! from capability port names onto their own port names, and the planner
//! selects services on a model by capability and name. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
