//! Task merging: collapsing two tasks that provide the same services.
//!
//! The planner often ends up with several tasks doing the same job, for
//! instance two instances of a camera driver required by different parts of
//! the network. [`MergeEngine`] checks whether one task can stand in for
//! another and, if so, moves the other task's connections, hierarchy links
//! and resource assignments onto it.

mod engine;
mod error;
mod pairing;
mod rename;

pub use engine::{MergeEngine, MergeReport};
pub use error::{MergeError, MergeResult};

#[cfg(test)]
mod tests;
