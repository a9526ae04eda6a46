//! Unit tests for the model module.
//!
//! Tests cover capability composition, service declaration on task models
//! and service selection.
