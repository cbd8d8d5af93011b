//! Property-based tests for the sync engine

mod determinism;
