//! Flowplan: dataflow planning for networks of port-connected tasks.
//!
//! This crate models software components ("tasks") exchanging typed data
//! over named ports, lets a planner describe the network in terms of the
//! services tasks provide, and resolves that description into concrete
//! port-to-port wiring ready to be handed to a deployment layer.
//!
//! # Architecture
//!
//! Flowplan follows hexagonal architecture principles:
//!
//! - **Domain**: Pure planning logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external collaborators
//! - **Adapters**: Concrete implementations of ports (in-memory deployment,
//!   component catalogs)
//!
//! # Modules
//!
//! - [`dataflow`]: Connection graphs, policy reconciliation, composition
//!   traversal and deployment synchronisation
//! - [`model`]: Capabilities, task models and service port mappings
//! - [`plan`]: Task instances, composite hierarchy and service bindings
//! - [`merge`]: Collapsing redundant task instances
//! - [`config`]: Planner configuration

pub mod config;
pub mod dataflow;
pub mod merge;
pub mod model;
pub mod plan;
