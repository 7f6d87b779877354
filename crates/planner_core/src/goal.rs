//! Target composition the planner works towards.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::data::{TechTree, TechType, UnitType, UpgradeType};
use crate::error::Result;
use crate::world::WorldState;

/// Target unit counts, techs and upgrade levels.
///
/// Unit counts are absolute: a goal of 6 workers in a world with 4 asks for
/// two more. In-flight production counts towards the target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    /// Unit count targets.
    pub units: BTreeMap<UnitType, usize>,
    /// Techs that must be researched.
    pub techs: BTreeSet<TechType>,
    /// Upgrade level targets.
    pub upgrades: BTreeMap<UpgradeType, u8>,
}

impl Goal {
    /// Create an empty goal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require at least `count` instances of `unit_type`.
    #[must_use]
    pub fn with_units(mut self, unit_type: UnitType, count: usize) -> Self {
        self.units.insert(unit_type, count);
        self
    }

    /// Require `tech`.
    #[must_use]
    pub fn with_tech(mut self, tech: TechType) -> Self {
        self.techs.insert(tech);
        self
    }

    /// Require `upgrade` at `level` or above.
    #[must_use]
    pub fn with_upgrade(mut self, upgrade: UpgradeType, level: u8) -> Self {
        self.upgrades.insert(upgrade, level);
        self
    }

    /// Build a goal from type names.
    ///
    /// # Errors
    ///
    /// [`PlanningError::UnknownType`](crate::PlanningError::UnknownType) if
    /// a name is not in `tree`.
    pub fn from_names(tree: &TechTree, named: &GoalByName) -> Result<Self> {
        let mut goal = Self::new();
        for (name, &count) in &named.units {
            goal.units.insert(tree.unit_by_name(name)?, count);
        }
        for name in &named.techs {
            goal.techs.insert(tree.tech_by_name(name)?);
        }
        for (name, &level) in &named.upgrades {
            goal.upgrades.insert(tree.upgrade_by_name(name)?, level);
        }
        Ok(goal)
    }

    /// Whether `world` has started everything the goal asks for.
    #[must_use]
    pub fn is_met(&self, world: &WorldState) -> bool {
        self.units
            .iter()
            .all(|(&unit_type, &count)| world.count(unit_type) >= count)
            && self
                .techs
                .iter()
                .all(|&tech| world.tech_available_at(tech).is_some())
            && self
                .upgrades
                .iter()
                .all(|(&upgrade, &level)| world.upgrade_level(upgrade) >= level)
    }

    /// Unit types still below their target count, in id order.
    pub fn deficient_units<'a>(
        &'a self,
        world: &'a WorldState,
    ) -> impl Iterator<Item = UnitType> + 'a {
        self.units
            .iter()
            .filter(|(&unit_type, &count)| world.count(unit_type) < count)
            .map(|(&unit_type, _)| unit_type)
    }
}

/// A [`Goal`] spelled with type names, as written in scenario files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalByName {
    /// Unit count targets by name.
    pub units: BTreeMap<String, usize>,
    /// Tech names.
    pub techs: BTreeSet<String>,
    /// Upgrade level targets by name.
    pub upgrades: BTreeMap<String, u8>,
}
