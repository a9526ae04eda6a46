//! Adapter implementations for dataflow ports.

pub mod memory;
