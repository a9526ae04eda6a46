//! Unit tests for the dataflow module.
//!
//! Tests are organised by domain concept: policy reconciliation, graph
//! mutation, composite traversal and required-versus-actual diffs.

mod traversal_tests;
