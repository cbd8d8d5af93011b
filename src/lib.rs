//! Reposync: End-to-End-Encrypted Repository Synchronization
//!
//! Client-side engine for an offline-first key-value document store that
//! synchronizes against a remote server while keeping contents and file names
//! opaque to it. Documents live under content-addressed names derived from a
//! symmetric key; local edits are staged in a changes overlay atop the
//! last-known server state; a push/pull protocol reconciles the two against a
//! hash-chained version cursor.

pub mod config;
pub mod error;
pub mod logging;
pub mod naming;
pub mod repo;
pub mod sync;
pub mod types;
pub mod vfs;
