//! # Planner Tools
//!
//! Command-line tools around the planning core:
//! - Scenario loading and offline build-order planning
//! - Tech-tree validation

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod plan;
pub mod scenario;
pub mod validate;

pub use error::{Result, ToolError};
pub use scenario::Scenario;
