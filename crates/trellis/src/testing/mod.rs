//! Utilities for testing input routing against an instrumented tree.

/// Test tree helpers.
pub mod ttree;
