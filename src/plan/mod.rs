//! Plans: task instances, their composite hierarchy and service bindings.
//!
//! A plan owns every task instantiated from a task model. Tasks are
//! identified by [`crate::dataflow::domain::TaskId`] and may be grouped
//! under composite tasks. Service bindings select a service on a task and
//! translate capability port names into the task's real port names when
//! connections are declared.
//!
//! - Domain types in [`domain`]

pub mod domain;

#[cfg(test)]
mod tests;
