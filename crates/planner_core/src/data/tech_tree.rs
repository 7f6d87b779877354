//! Resolved tech-tree registry.
//!
//! Specs reference each other by numeric id so the engine never does string
//! lookups while simulating.

use std::collections::HashMap;

use super::tech_data::{RaceData, TechData, TechTreeData, UpgradeData};
use super::unit_data::{UnitData, UnitTraits};
use super::{TechType, UnitType, UpgradeType};
use crate::error::{PlanningError, Result};
use crate::race::{BuilderPolicy, Race};

/// Resolved definition of a unit or structure type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSpec {
    /// Unique name.
    pub name: String,
    /// Race that can build this type.
    pub race: Race,
    /// Mineral price.
    pub mineral_price: i32,
    /// Gas price.
    pub gas_price: i32,
    /// Build time in frames.
    pub build_time: u32,
    /// Supply consumed (half-units).
    pub supply_required: i32,
    /// Supply provided once complete (half-units).
    pub supply_provided: i32,
    /// Economic roles.
    pub traits: UnitTraits,
    /// Producing type: a worker for structures, the parent for add-ons.
    pub producer: Option<UnitType>,
    /// Prerequisite unit types other than the producer.
    pub required_units: Vec<UnitType>,
    /// Prerequisite technology.
    pub required_tech: Option<TechType>,
    /// Add-on the producer must carry.
    pub required_addon: Option<UnitType>,
}

impl UnitSpec {
    /// Create a spec with no producer, prerequisites or traits.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        race: Race,
        mineral_price: i32,
        gas_price: i32,
        build_time: u32,
        supply_required: i32,
    ) -> Self {
        Self {
            name: name.into(),
            race,
            mineral_price,
            gas_price,
            build_time,
            supply_required,
            supply_provided: 0,
            traits: UnitTraits::empty(),
            producer: None,
            required_units: Vec::new(),
            required_tech: None,
            required_addon: None,
        }
    }

    /// Set the producing type.
    #[must_use]
    pub fn produced_by(mut self, producer: UnitType) -> Self {
        self.producer = Some(producer);
        self
    }

    /// Add prerequisite unit types.
    #[must_use]
    pub fn requires(mut self, units: &[UnitType]) -> Self {
        self.required_units.extend_from_slice(units);
        self
    }

    /// Set a prerequisite technology.
    #[must_use]
    pub fn requires_tech(mut self, tech: TechType) -> Self {
        self.required_tech = Some(tech);
        self
    }

    /// Require the producer to carry an add-on.
    #[must_use]
    pub fn requires_addon(mut self, addon: UnitType) -> Self {
        self.required_addon = Some(addon);
        self
    }

    /// Set the supply this type provides.
    #[must_use]
    pub fn provides_supply(mut self, supply: i32) -> Self {
        self.supply_provided = supply;
        self
    }

    /// Add economic role traits.
    #[must_use]
    pub fn with_traits(mut self, traits: UnitTraits) -> Self {
        self.traits = self.traits.union(traits);
        self
    }

    /// Whether this is a structure.
    #[must_use]
    pub const fn is_building(&self) -> bool {
        self.traits.contains(UnitTraits::BUILDING)
    }

    /// Whether this is an add-on.
    #[must_use]
    pub const fn is_addon(&self) -> bool {
        self.traits.contains(UnitTraits::ADDON)
    }

    /// Whether this is a worker.
    #[must_use]
    pub const fn is_worker(&self) -> bool {
        self.traits.contains(UnitTraits::WORKER)
    }

    /// Whether this is a refinery.
    #[must_use]
    pub const fn is_refinery(&self) -> bool {
        self.traits.contains(UnitTraits::REFINERY)
    }

    /// Whether this is a resource depot.
    #[must_use]
    pub const fn is_resource_depot(&self) -> bool {
        self.traits.contains(UnitTraits::RESOURCE_DEPOT)
    }
}

/// Resolved definition of a technology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechSpec {
    /// Unique name.
    pub name: String,
    /// Race that can research it.
    pub race: Race,
    /// Mineral price.
    pub mineral_price: i32,
    /// Gas price.
    pub gas_price: i32,
    /// Research time in frames.
    pub research_time: u32,
    /// Structure that performs the research.
    pub researcher: UnitType,
    /// Extra unit type that must exist.
    pub required_unit: Option<UnitType>,
}

/// Resolved definition of a levelled upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeSpec {
    /// Unique name.
    pub name: String,
    /// Race that can research it.
    pub race: Race,
    /// Mineral price of level 1.
    pub mineral_price: i32,
    /// Mineral price increase per level.
    pub mineral_factor: i32,
    /// Gas price of level 1.
    pub gas_price: i32,
    /// Gas price increase per level.
    pub gas_factor: i32,
    /// Research time of level 1.
    pub upgrade_time: u32,
    /// Research time increase per level.
    pub time_factor: u32,
    /// Highest reachable level.
    pub max_level: u8,
    /// Structure that performs the research.
    pub researcher: UnitType,
    /// Unit type required for levels above 1.
    pub higher_level_requires: Option<UnitType>,
}

impl UpgradeSpec {
    /// Mineral price of reaching `level` (1-based).
    #[must_use]
    pub fn mineral_price_at(&self, level: u8) -> i32 {
        self.mineral_price + self.mineral_factor * i32::from(level.saturating_sub(1))
    }

    /// Gas price of reaching `level` (1-based).
    #[must_use]
    pub fn gas_price_at(&self, level: u8) -> i32 {
        self.gas_price + self.gas_factor * i32::from(level.saturating_sub(1))
    }

    /// Research time of reaching `level` (1-based).
    #[must_use]
    pub fn time_at(&self, level: u8) -> u32 {
        self.upgrade_time + self.time_factor * u32::from(level.saturating_sub(1))
    }
}

/// Unit types filling the fixed economic roles of one race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceSpec {
    /// Race these roles apply to.
    pub race: Race,
    /// Gathering and building unit.
    pub worker: UnitType,
    /// Cheapest supply source.
    pub supply_provider: UnitType,
    /// Main base structure.
    pub resource_depot: UnitType,
    /// Gas extraction structure.
    pub refinery: UnitType,
    /// What happens to a worker that starts a structure.
    pub builder_policy: BuilderPolicy,
}

/// Registry of every type the planner can reason about.
///
/// Shared between all world states of a search behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct TechTree {
    units: Vec<UnitSpec>,
    techs: Vec<TechSpec>,
    upgrades: Vec<UpgradeSpec>,
    races: Vec<RaceSpec>,
    unit_index: HashMap<String, UnitType>,
    tech_index: HashMap<String, TechType>,
    upgrade_index: HashMap<String, UpgradeType>,
}

impl TechTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit spec; returns its id.
    pub(crate) fn push_unit(&mut self, spec: UnitSpec) -> UnitType {
        let id = UnitType(self.units.len() as u16);
        self.unit_index.insert(spec.name.clone(), id);
        self.units.push(spec);
        id
    }

    /// Register a tech spec; returns its id.
    pub(crate) fn push_tech(&mut self, spec: TechSpec) -> TechType {
        let id = TechType(self.techs.len() as u16);
        self.tech_index.insert(spec.name.clone(), id);
        self.techs.push(spec);
        id
    }

    /// Register an upgrade spec; returns its id.
    pub(crate) fn push_upgrade(&mut self, spec: UpgradeSpec) -> UpgradeType {
        let id = UpgradeType(self.upgrades.len() as u16);
        self.upgrade_index.insert(spec.name.clone(), id);
        self.upgrades.push(spec);
        id
    }

    /// Register the role table for a race.
    pub(crate) fn push_race(&mut self, spec: RaceSpec) {
        self.races.retain(|r| r.race != spec.race);
        self.races.push(spec);
    }

    /// Parse and resolve a RON tech tree document.
    pub fn from_ron_str(source_name: &str, text: &str) -> Result<Self> {
        let data: TechTreeData =
            ron::from_str(text).map_err(|e| PlanningError::DataParseError {
                source_name: source_name.to_string(),
                message: e.to_string(),
            })?;
        Self::from_data(source_name, &data)
    }

    /// Resolve name references and validate role assignments.
    pub fn from_data(source_name: &str, data: &TechTreeData) -> Result<Self> {
        let parse_error = |message: String| PlanningError::DataParseError {
            source_name: source_name.to_string(),
            message,
        };

        let mut tree = Self::new();

        // Names first so forward references resolve.
        for (i, unit) in data.units.iter().enumerate() {
            if tree
                .unit_index
                .insert(unit.name.clone(), UnitType(i as u16))
                .is_some()
            {
                return Err(parse_error(format!("duplicate unit '{}'", unit.name)));
            }
        }
        for (i, tech) in data.techs.iter().enumerate() {
            tree.tech_index.insert(tech.name.clone(), TechType(i as u16));
        }

        for unit in &data.units {
            let spec = tree.resolve_unit(unit).map_err(|e| match e {
                PlanningError::DataParseError { message, .. } => parse_error(message),
                other => other,
            })?;
            tree.units.push(spec);
        }
        for tech in &data.techs {
            let spec = tree.resolve_tech(tech)?;
            tree.techs.push(spec);
        }
        for upgrade in &data.upgrades {
            let spec = tree.resolve_upgrade(upgrade)?;
            tree.push_upgrade(spec);
        }
        for race in &data.races {
            let spec = tree.resolve_race(race).map_err(|e| match e {
                PlanningError::DataParseError { message, .. } => parse_error(message),
                other => other,
            })?;
            tree.push_race(spec);
        }

        for spec in &tree.units {
            if spec.is_addon() && spec.producer.is_none() {
                return Err(parse_error(format!(
                    "add-on '{}' has no parent structure",
                    spec.name
                )));
            }
        }

        Ok(tree)
    }

    fn resolve_unit(&self, data: &UnitData) -> Result<UnitSpec> {
        let traits = UnitTraits::from_tags(&data.tags).map_err(|tag| {
            PlanningError::DataParseError {
                source_name: String::new(),
                message: format!("unknown tag '{tag}' on '{}'", data.name),
            }
        })?;
        let mut spec = UnitSpec::new(
            data.name.clone(),
            data.race,
            data.minerals,
            data.gas,
            data.build_time,
            data.supply_required,
        )
        .provides_supply(data.supply_provided)
        .with_traits(traits);
        spec.producer = data
            .producer
            .as_deref()
            .map(|name| self.unit_by_name(name))
            .transpose()?;
        spec.required_units = data
            .requires
            .iter()
            .map(|name| self.unit_by_name(name))
            .collect::<Result<_>>()?;
        spec.required_tech = data
            .required_tech
            .as_deref()
            .map(|name| self.tech_by_name(name))
            .transpose()?;
        spec.required_addon = data
            .required_addon
            .as_deref()
            .map(|name| self.unit_by_name(name))
            .transpose()?;
        Ok(spec)
    }

    fn resolve_tech(&self, data: &TechData) -> Result<TechSpec> {
        Ok(TechSpec {
            name: data.name.clone(),
            race: data.race,
            mineral_price: data.minerals,
            gas_price: data.gas,
            research_time: data.research_time,
            researcher: self.unit_by_name(&data.researcher)?,
            required_unit: data
                .requires
                .as_deref()
                .map(|name| self.unit_by_name(name))
                .transpose()?,
        })
    }

    fn resolve_upgrade(&self, data: &UpgradeData) -> Result<UpgradeSpec> {
        Ok(UpgradeSpec {
            name: data.name.clone(),
            race: data.race,
            mineral_price: data.minerals,
            mineral_factor: data.mineral_factor,
            gas_price: data.gas,
            gas_factor: data.gas_factor,
            upgrade_time: data.upgrade_time,
            time_factor: data.time_factor,
            max_level: data.max_level,
            researcher: self.unit_by_name(&data.researcher)?,
            higher_level_requires: data
                .higher_level_requires
                .as_deref()
                .map(|name| self.unit_by_name(name))
                .transpose()?,
        })
    }

    fn resolve_race(&self, data: &RaceData) -> Result<RaceSpec> {
        let spec = RaceSpec {
            race: data.race,
            worker: self.unit_by_name(&data.worker)?,
            supply_provider: self.unit_by_name(&data.supply_provider)?,
            resource_depot: self.unit_by_name(&data.resource_depot)?,
            refinery: self.unit_by_name(&data.refinery)?,
            builder_policy: data
                .builder_policy
                .unwrap_or_else(|| data.race.default_builder_policy()),
        };
        let check = |id: UnitType, ok: bool, role: &str| {
            if ok {
                Ok(())
            } else {
                Err(PlanningError::DataParseError {
                    source_name: String::new(),
                    message: format!(
                        "'{}' cannot be the {role} of {}",
                        self.units[id.index()].name,
                        data.race.display_name()
                    ),
                })
            }
        };
        check(spec.worker, self.units[spec.worker.index()].is_worker(), "worker")?;
        check(
            spec.refinery,
            self.units[spec.refinery.index()].is_refinery(),
            "refinery",
        )?;
        check(
            spec.resource_depot,
            self.units[spec.resource_depot.index()].is_resource_depot(),
            "resource depot",
        )?;
        check(
            spec.supply_provider,
            self.units[spec.supply_provider.index()].supply_provided > 0,
            "supply provider",
        )?;
        Ok(spec)
    }

    /// Get a unit spec.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    #[must_use]
    pub fn unit(&self, id: UnitType) -> &UnitSpec {
        &self.units[id.index()]
    }

    /// Get a unit spec, if the id belongs to this tree.
    #[must_use]
    pub fn get_unit(&self, id: UnitType) -> Option<&UnitSpec> {
        self.units.get(id.index())
    }

    /// Get a tech spec.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    #[must_use]
    pub fn tech(&self, id: TechType) -> &TechSpec {
        &self.techs[id.index()]
    }

    /// Get a tech spec, if the id belongs to this tree.
    #[must_use]
    pub fn get_tech(&self, id: TechType) -> Option<&TechSpec> {
        self.techs.get(id.index())
    }

    /// Get an upgrade spec.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    #[must_use]
    pub fn upgrade(&self, id: UpgradeType) -> &UpgradeSpec {
        &self.upgrades[id.index()]
    }

    /// Get an upgrade spec, if the id belongs to this tree.
    #[must_use]
    pub fn get_upgrade(&self, id: UpgradeType) -> Option<&UpgradeSpec> {
        self.upgrades.get(id.index())
    }

    /// Look up a unit type by name.
    pub fn unit_by_name(&self, name: &str) -> Result<UnitType> {
        self.unit_index
            .get(name)
            .copied()
            .ok_or_else(|| PlanningError::UnknownType(name.to_string()))
    }

    /// Look up a tech by name.
    pub fn tech_by_name(&self, name: &str) -> Result<TechType> {
        self.tech_index
            .get(name)
            .copied()
            .ok_or_else(|| PlanningError::UnknownType(name.to_string()))
    }

    /// Look up an upgrade by name.
    pub fn upgrade_by_name(&self, name: &str) -> Result<UpgradeType> {
        self.upgrade_index
            .get(name)
            .copied()
            .ok_or_else(|| PlanningError::UnknownType(name.to_string()))
    }

    /// Role table for a race.
    pub fn race(&self, race: Race) -> Result<RaceSpec> {
        self.races
            .iter()
            .find(|r| r.race == race)
            .copied()
            .ok_or_else(|| PlanningError::UnknownType(race.display_name().to_string()))
    }

    /// All unit type ids in load order.
    pub fn unit_types(&self) -> impl Iterator<Item = UnitType> + '_ {
        (0..self.units.len()).map(|i| UnitType(i as u16))
    }

    /// Number of unit types.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Number of techs.
    #[must_use]
    pub fn tech_count(&self) -> usize {
        self.techs.len()
    }

    /// Number of upgrades.
    #[must_use]
    pub fn upgrade_count(&self) -> usize {
        self.upgrades.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINI_TREE: &str = r#"
TechTreeData(
    units: [
        UnitData(name: "Drone", race: Zerg, minerals: 50, build_time: 300, supply_required: 2, tags: ["worker"], producer: Some("Hatchery")),
        UnitData(name: "Hatchery", race: Zerg, minerals: 300, build_time: 1800, supply_provided: 2, tags: ["resource_depot"], producer: Some("Drone")),
        UnitData(name: "Overlord", race: Zerg, minerals: 100, build_time: 600, supply_provided: 16, producer: Some("Hatchery")),
        UnitData(name: "Extractor", race: Zerg, minerals: 50, build_time: 600, tags: ["refinery"], producer: Some("Drone")),
        UnitData(name: "EvolutionChamber", race: Zerg, minerals: 75, build_time: 600, tags: ["building"], producer: Some("Drone"), requires: ["Hatchery"]),
        UnitData(name: "Lair", race: Zerg, minerals: 150, gas: 100, build_time: 1500, tags: ["building"], producer: Some("Drone"), requires: ["Hatchery"]),
    ],
    upgrades: [
        UpgradeData(name: "Carapace", race: Zerg, minerals: 150, mineral_factor: 75, gas: 150, gas_factor: 75, upgrade_time: 4000, time_factor: 480, max_level: 3, researcher: "EvolutionChamber", higher_level_requires: Some("Lair")),
    ],
    races: [
        RaceData(race: Zerg, worker: "Drone", supply_provider: "Overlord", resource_depot: "Hatchery", refinery: "Extractor"),
    ],
)
"#;

    #[test]
    fn test_from_ron_resolves_references() {
        let tree = TechTree::from_ron_str("mini", MINI_TREE).unwrap();
        assert_eq!(tree.unit_count(), 6);

        let drone = tree.unit_by_name("Drone").unwrap();
        let hatchery = tree.unit_by_name("Hatchery").unwrap();
        assert_eq!(tree.unit(drone).producer, Some(hatchery));
        assert!(tree.unit(drone).is_worker());
        assert!(tree.unit(hatchery).is_building());
        assert!(tree.unit(hatchery).is_resource_depot());

        let roles = tree.race(Race::Zerg).unwrap();
        assert_eq!(roles.worker, drone);
        assert!(tree.race(Race::Terran).is_err());
    }

    #[test]
    fn test_upgrade_level_pricing() {
        let tree = TechTree::from_ron_str("mini", MINI_TREE).unwrap();
        let carapace = tree.upgrade(tree.upgrade_by_name("Carapace").unwrap());
        assert_eq!(carapace.mineral_price_at(1), 150);
        assert_eq!(carapace.mineral_price_at(2), 225);
        assert_eq!(carapace.gas_price_at(3), 300);
        assert_eq!(carapace.time_at(2), 4480);
        assert_eq!(
            carapace.higher_level_requires,
            Some(tree.unit_by_name("Lair").unwrap())
        );
    }

    #[test]
    fn test_unknown_reference_is_rejected() {
        let text = r#"TechTreeData(
            units: [UnitData(name: "Drone", race: Zerg, build_time: 300, tags: ["worker"], producer: Some("Larva"))],
            races: [],
        )"#;
        let err = TechTree::from_ron_str("bad", text).unwrap_err();
        assert_eq!(err, PlanningError::UnknownType("Larva".to_string()));
    }

    #[test]
    fn test_builder_policy_defaults_per_race() {
        let tree = TechTree::from_ron_str("mini", MINI_TREE).unwrap();
        assert_eq!(
            tree.race(Race::Zerg).unwrap().builder_policy,
            BuilderPolicy::Consumed
        );

        let text = MINI_TREE.replace(
            r#"refinery: "Extractor")"#,
            r#"refinery: "Extractor", builder_policy: Some(BusyWhileTravelling))"#,
        );
        let tree = TechTree::from_ron_str("mini", &text).unwrap();
        assert_eq!(
            tree.race(Race::Zerg).unwrap().builder_policy,
            BuilderPolicy::BusyWhileTravelling
        );
    }

    #[test]
    fn test_wrong_role_is_rejected() {
        let text = r#"TechTreeData(
            units: [
                UnitData(name: "Drone", race: Zerg, build_time: 300, tags: ["worker"]),
                UnitData(name: "Pool", race: Zerg, build_time: 300, tags: ["building"], producer: Some("Drone")),
            ],
            races: [RaceData(race: Zerg, worker: "Drone", supply_provider: "Pool", resource_depot: "Pool", refinery: "Pool")],
        )"#;
        let err = TechTree::from_ron_str("bad", text).unwrap_err();
        assert!(matches!(err, PlanningError::DataParseError { source_name, .. } if source_name == "bad"));
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = TechTree::from_ron_str("broken", "TechTreeData(units: [").unwrap_err();
        assert!(matches!(err, PlanningError::DataParseError { .. }));
    }
}
