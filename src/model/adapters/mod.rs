//! Adapter implementations for component-description ports.

pub mod memory;
