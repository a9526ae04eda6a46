//! Unit tests for the merge engine.

mod merge_tests;
