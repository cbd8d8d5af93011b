//! Integration tests for the repository sync engine

mod test_utils;
