//! Port contracts for the component-description layer.
//!
//! Task models and capabilities are described outside this crate; planning
//! only looks them up by name.

mod catalog;

pub use catalog::ComponentCatalog;
