//! Step definitions for task merge BDD scenarios.

mod given;
mod then;
mod when;
pub mod world;
