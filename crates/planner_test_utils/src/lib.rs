//! # Planner Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Opening positions and scenario fixtures
//! - Determinism harness for the search
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
