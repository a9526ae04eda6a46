//! Unit tests for the plan module.
