//! # Planner Core
//!
//! Deterministic build-order planning for a resource-gathering strategy game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO (tech trees and scenarios arrive as RON text)
//! - No system randomness (search jitter comes from a seeded RNG)
//! - No floating-point in the simulated economy (uses fixed-point)
//!
//! The core is a forward economic simulator, [`WorldState`], paired with an
//! anytime tree search, [`Planner`], that picks the next action minimizing
//! the time to reach a target composition of units, techs and upgrades.
//!
//! ## Crate Structure
//!
//! - [`data`] - Tech-tree definitions and the built-in catalog
//! - [`world`] - The simulated economy snapshot
//! - [`economy`] - Gathering and time advance
//! - [`production`] - Producing units and structures, research
//! - [`feasibility`] - Structural preconditions of actions
//! - [`dependency`] - Prerequisite closure of goals
//! - [`planner`] - The search tree and planning loop
//! - [`snapshot`] - Game observations in, production orders out
//! - [`agent`] - Planner driver reacting to game events

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod agent;
pub mod data;
pub mod dependency;
pub mod economy;
pub mod error;
pub mod feasibility;
pub mod goal;
pub mod math;
pub mod moves;
pub mod planner;
pub mod production;
pub mod race;
pub mod snapshot;
pub mod world;

pub use error::{PlanningError, Result};
pub use planner::Planner;
pub use world::WorldState;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::agent::{BuildOrderAgent, GameEvent, ProductionSink};
    pub use crate::data::{TechTree, TechType, UnitType, UpgradeType};
    pub use crate::error::{PlanningError, Result};
    pub use crate::goal::{Goal, GoalByName};
    pub use crate::math::Fixed;
    pub use crate::moves::Move;
    pub use crate::planner::{BuildOrder, Planner, PlannerConfig, PlannerStats, StepOutcome};
    pub use crate::race::Race;
    pub use crate::snapshot::{Observation, ObservedUnit, OrderKind, ProductionOrder};
    pub use crate::world::{Frame, WorldState};
}
