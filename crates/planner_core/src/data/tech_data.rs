//! Tech, upgrade and race-role data for data-driven tech trees.

use serde::{Deserialize, Serialize};

use super::unit_data::UnitData;
use crate::race::{BuilderPolicy, Race};

/// Data-driven definition of a one-off technology.
///
/// # Example RON
///
/// ```ron
/// TechData(
///     name: "StimPacks",
///     race: Terran,
///     minerals: 100,
///     gas: 100,
///     research_time: 1200,
///     researcher: "Academy",
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechData {
    /// Unique name.
    pub name: String,

    /// Race that can research it.
    pub race: Race,

    /// Mineral price.
    #[serde(default)]
    pub minerals: i32,

    /// Gas price.
    #[serde(default)]
    pub gas: i32,

    /// Research time in frames.
    pub research_time: u32,

    /// Structure that performs the research.
    pub researcher: String,

    /// Extra unit type that must exist.
    #[serde(default)]
    pub requires: Option<String>,
}

/// Data-driven definition of a levelled upgrade.
///
/// The price of level `n` is `base + factor * (n - 1)`, likewise for time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeData {
    /// Unique name.
    pub name: String,

    /// Race that can research it.
    pub race: Race,

    /// Mineral price of level 1.
    #[serde(default)]
    pub minerals: i32,

    /// Mineral price increase per level.
    #[serde(default)]
    pub mineral_factor: i32,

    /// Gas price of level 1.
    #[serde(default)]
    pub gas: i32,

    /// Gas price increase per level.
    #[serde(default)]
    pub gas_factor: i32,

    /// Research time of level 1 in frames.
    pub upgrade_time: u32,

    /// Research time increase per level.
    #[serde(default)]
    pub time_factor: u32,

    /// Highest reachable level.
    #[serde(default = "default_max_level")]
    pub max_level: u8,

    /// Structure that performs the research.
    pub researcher: String,

    /// Unit type that must exist to research levels above 1.
    #[serde(default)]
    pub higher_level_requires: Option<String>,
}

/// Default max level for upgrades without explicit max.
const fn default_max_level() -> u8 {
    1
}

/// Which unit types fill the fixed economic roles for a race.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceData {
    /// Race these roles apply to.
    pub race: Race,
    /// Gathering and building unit.
    pub worker: String,
    /// Cheapest supply source.
    pub supply_provider: String,
    /// Main base structure.
    pub resource_depot: String,
    /// Gas extraction structure.
    pub refinery: String,
    /// Builder behaviour; the race's usual one when absent.
    #[serde(default)]
    pub builder_policy: Option<BuilderPolicy>,
}

/// A complete tech tree document.
///
/// # Example RON
///
/// ```ron
/// TechTreeData(
///     units: [...],
///     techs: [...],
///     upgrades: [...],
///     races: [...],
/// )
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechTreeData {
    /// All unit and structure types.
    pub units: Vec<UnitData>,
    /// All technologies.
    #[serde(default)]
    pub techs: Vec<TechData>,
    /// All upgrades.
    #[serde(default)]
    pub upgrades: Vec<UpgradeData>,
    /// Economic roles per race.
    pub races: Vec<RaceData>,
}
