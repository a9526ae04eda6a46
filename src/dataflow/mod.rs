//! Connection graphs and deployment synchronisation for Flowplan.
//!
//! This module implements the dataflow side of planning: reconciling
//! connection policies, recording port-to-port requirements between tasks,
//! flattening composite forwarding into concrete edges, and diffing the
//! required graph against what is actually deployed. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
