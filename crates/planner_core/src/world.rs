//! Simulated economy snapshot.
//!
//! A [`WorldState`] is the record the planner branches on: banked resources,
//! supply, every unit instance produced in this branch, and the frames at
//! which techs and upgrade levels become available. Cloning produces a
//! fully independent copy; the only shared part is the immutable
//! [`TechTree`] behind an `Arc`.
//!
//! Transition operations live in [`economy`](crate::economy) and
//! [`production`](crate::production); feasibility predicates in
//! [`feasibility`](crate::feasibility).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::{RaceSpec, TechTree, TechType, UnitType, UpgradeType};
use crate::error::Result;
use crate::race::Race;

/// Simulated time, in game frames.
pub type Frame = u32;

/// Supply ceiling in half-units.
pub const MAX_SUPPLY: i32 = 400;

/// Index of a unit instance in a world state's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

/// One produced unit or structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitInstance {
    /// Type of the instance.
    pub unit_type: UnitType,
    /// Frame production began.
    pub started_at: Frame,
    /// Frame production finishes.
    pub completed_at: Frame,
    /// Frame the instance is free to act.
    ///
    /// Producers, researchers and builders have this pushed forward while
    /// they are busy.
    pub available_at: Frame,
    /// Supply not yet folded into the supply total.
    pub supply_provided: i32,
    /// Attached add-on.
    pub addon: Option<UnitType>,
}

/// Research progress of one upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpgradeState {
    /// Frame the latest level started.
    pub started_at: Frame,
    /// Frame the latest level completes.
    pub available_at: Frame,
    /// Latest level started (completed once `available_at` is reached).
    pub level: u8,
}

/// Snapshot of a simulated economy.
#[derive(Clone)]
pub struct WorldState {
    tree: Arc<TechTree>,
    roles: RaceSpec,
    pub(crate) frame: Frame,
    pub(crate) minerals: i32,
    pub(crate) gas: i32,
    pub(crate) supply_used: i32,
    pub(crate) supply_total: i32,
    /// Arena of every instance produced in this branch.
    instances: Vec<UnitInstance>,
    /// Live instance ids per unit type, indexed by `UnitType::index`.
    by_type: Vec<Vec<InstanceId>>,
    /// Instances whose supply has not been folded in yet.
    pending_supply: Vec<InstanceId>,
    pub(crate) tech_researched: BTreeMap<TechType, Frame>,
    pub(crate) upgrades: BTreeMap<UpgradeType, UpgradeState>,
}

impl WorldState {
    /// Create an empty world for `race` at frame 0.
    pub fn new(tree: Arc<TechTree>, race: Race) -> Result<Self> {
        let roles = tree.race(race)?;
        let by_type = vec![Vec::new(); tree.unit_count()];
        Ok(Self {
            tree,
            roles,
            frame: 0,
            minerals: 0,
            gas: 0,
            supply_used: 0,
            supply_total: 0,
            instances: Vec::new(),
            by_type,
            pending_supply: Vec::new(),
            tech_researched: BTreeMap::new(),
            upgrades: BTreeMap::new(),
        })
    }

    /// Set the starting frame. Only meaningful before any operation runs.
    #[must_use]
    pub fn at_frame(mut self, frame: Frame) -> Self {
        self.frame = frame;
        self
    }

    /// Set banked resources.
    #[must_use]
    pub fn with_resources(mut self, minerals: i32, gas: i32) -> Self {
        self.minerals = minerals;
        self.gas = gas;
        self
    }

    /// Add `count` completed instances of `unit_type`, counting their supply.
    #[must_use]
    pub fn with_units(mut self, unit_type: UnitType, count: usize) -> Self {
        for _ in 0..count {
            self.spawn_completed(unit_type);
        }
        self
    }

    /// Add a completed instance, counting its supply cost and supply provided.
    pub fn spawn_completed(&mut self, unit_type: UnitType) -> InstanceId {
        let spec = self.tree.unit(unit_type);
        self.supply_used += spec.supply_required;
        self.supply_total = (self.supply_total + spec.supply_provided).min(MAX_SUPPLY);
        self.insert(UnitInstance {
            unit_type,
            started_at: self.frame,
            completed_at: self.frame,
            available_at: self.frame,
            supply_provided: 0,
            addon: None,
        })
    }

    /// Add an instance still in production, completing in `remaining` frames.
    ///
    /// Its supply cost is counted now; the supply it provides is folded in on
    /// completion.
    pub fn spawn_in_progress(&mut self, unit_type: UnitType, remaining: Frame) -> InstanceId {
        let spec = self.tree.unit(unit_type);
        let started_at = (self.frame + remaining).saturating_sub(spec.build_time);
        self.supply_used += spec.supply_required;
        let supply_provided = spec.supply_provided;
        self.register(unit_type, started_at, self.frame + remaining, supply_provided)
    }

    /// Register a new instance in production; returns its id.
    pub(crate) fn register(
        &mut self,
        unit_type: UnitType,
        started_at: Frame,
        available_at: Frame,
        supply_provided: i32,
    ) -> InstanceId {
        let id = self.insert(UnitInstance {
            unit_type,
            started_at,
            completed_at: available_at,
            available_at,
            supply_provided,
            addon: None,
        });
        if supply_provided > 0 {
            self.pending_supply.push(id);
        }
        id
    }

    fn insert(&mut self, instance: UnitInstance) -> InstanceId {
        let id = InstanceId(self.instances.len() as u32);
        self.by_type[instance.unit_type.index()].push(id);
        self.instances.push(instance);
        id
    }

    /// Remove an instance from its type's live list. The arena slot stays.
    pub(crate) fn retire(&mut self, id: InstanceId) {
        let unit_type = self.instances[id.0 as usize].unit_type;
        self.by_type[unit_type.index()].retain(|&i| i != id);
        self.pending_supply.retain(|&i| i != id);
    }

    /// Attach an add-on to an instance.
    pub fn set_addon(&mut self, id: InstanceId, addon: UnitType) {
        self.instances[id.0 as usize].addon = Some(addon);
    }

    /// Mark a tech as available from `frame` on.
    pub fn set_tech(&mut self, tech: TechType, frame: Frame) {
        self.tech_researched.insert(tech, frame);
    }

    /// Set an upgrade's progress.
    pub fn set_upgrade(&mut self, upgrade: UpgradeType, state: UpgradeState) {
        self.upgrades.insert(upgrade, state);
    }

    /// Fold the supply of every provider completed by the current frame.
    pub(crate) fn fold_supply(&mut self) {
        let frame = self.frame;
        let mut total = self.supply_total;
        let instances = &mut self.instances;
        self.pending_supply.retain(|id| {
            let instance = &mut instances[id.0 as usize];
            if instance.completed_at <= frame {
                total = (total + instance.supply_provided).min(MAX_SUPPLY);
                instance.supply_provided = 0;
                false
            } else {
                true
            }
        });
        self.supply_total = total;
    }

    // ========================================
    // Queries
    // ========================================

    /// Tech tree this world is simulated against.
    #[must_use]
    pub fn tree(&self) -> &Arc<TechTree> {
        &self.tree
    }

    /// Race being simulated.
    #[must_use]
    pub const fn race(&self) -> Race {
        self.roles.race
    }

    /// Role table of the simulated race.
    #[must_use]
    pub const fn roles(&self) -> &RaceSpec {
        &self.roles
    }

    /// Current simulated frame.
    #[must_use]
    pub const fn frame(&self) -> Frame {
        self.frame
    }

    /// Banked minerals.
    #[must_use]
    pub const fn minerals(&self) -> i32 {
        self.minerals
    }

    /// Banked gas.
    #[must_use]
    pub const fn gas(&self) -> i32 {
        self.gas
    }

    /// Supply in use (half-units).
    #[must_use]
    pub const fn supply_used(&self) -> i32 {
        self.supply_used
    }

    /// Supply available from completed providers (half-units, capped).
    #[must_use]
    pub const fn supply_total(&self) -> i32 {
        self.supply_total
    }

    /// Supply of providers still in production.
    #[must_use]
    pub fn pending_supply(&self) -> i32 {
        self.pending_supply
            .iter()
            .map(|id| self.instances[id.0 as usize].supply_provided)
            .sum()
    }

    /// Earliest completion frame among pending supply providers.
    #[must_use]
    pub fn next_supply_completion(&self) -> Option<Frame> {
        self.pending_supply
            .iter()
            .map(|id| self.instances[id.0 as usize].completed_at)
            .min()
    }

    /// Look up an instance.
    #[must_use]
    pub fn instance(&self, id: InstanceId) -> &UnitInstance {
        &self.instances[id.0 as usize]
    }

    pub(crate) fn instance_mut(&mut self, id: InstanceId) -> &mut UnitInstance {
        &mut self.instances[id.0 as usize]
    }

    /// Live instances of a type, completed or not.
    pub fn instances_of(&self, unit_type: UnitType) -> impl Iterator<Item = &UnitInstance> + '_ {
        self.by_type[unit_type.index()]
            .iter()
            .map(|id| &self.instances[id.0 as usize])
    }

    /// Number of live instances of a type, completed or not.
    #[must_use]
    pub fn count(&self, unit_type: UnitType) -> usize {
        self.by_type[unit_type.index()].len()
    }

    /// Number of instances of a type completed by the current frame.
    #[must_use]
    pub fn completed_count(&self, unit_type: UnitType) -> usize {
        self.instances_of(unit_type)
            .filter(|u| u.completed_at <= self.frame)
            .count()
    }

    /// Frame the first instance of a type completes, if any exists.
    #[must_use]
    pub fn first_completion(&self, unit_type: UnitType) -> Option<Frame> {
        self.instances_of(unit_type).map(|u| u.completed_at).min()
    }

    /// Live instance of `unit_type` matching `filter` that frees up first.
    pub fn earliest_available(
        &self,
        unit_type: UnitType,
        filter: impl Fn(&UnitInstance) -> bool,
    ) -> Option<InstanceId> {
        self.by_type[unit_type.index()]
            .iter()
            .copied()
            .filter(|id| filter(&self.instances[id.0 as usize]))
            .min_by_key(|id| self.instances[id.0 as usize].available_at)
    }

    /// Workers free to gather right now.
    #[must_use]
    pub fn available_workers(&self) -> u32 {
        self.instances_of(self.roles.worker)
            .filter(|u| u.available_at <= self.frame)
            .count() as u32
    }

    /// Next frame at which a busy or unfinished worker frees up.
    #[must_use]
    pub fn next_worker_free(&self) -> Option<Frame> {
        self.instances_of(self.roles.worker)
            .map(|u| u.available_at)
            .filter(|&at| at > self.frame)
            .min()
    }

    /// Refineries that can take gatherers right now.
    #[must_use]
    pub fn completed_refineries(&self) -> u32 {
        self.instances_of(self.roles.refinery)
            .filter(|u| u.completed_at <= self.frame)
            .count() as u32
    }

    /// Next frame at which an unfinished refinery completes.
    #[must_use]
    pub fn next_refinery_completion(&self) -> Option<Frame> {
        self.instances_of(self.roles.refinery)
            .map(|u| u.completed_at)
            .filter(|&at| at > self.frame)
            .min()
    }

    /// Frame a tech becomes available, if it is known or being researched.
    #[must_use]
    pub fn tech_available_at(&self, tech: TechType) -> Option<Frame> {
        self.tech_researched.get(&tech).copied()
    }

    /// Progress of an upgrade, if any level has been started.
    #[must_use]
    pub fn upgrade_state(&self, upgrade: UpgradeType) -> Option<&UpgradeState> {
        self.upgrades.get(&upgrade)
    }

    /// Highest upgrade level started (0 if none).
    #[must_use]
    pub fn upgrade_level(&self, upgrade: UpgradeType) -> u8 {
        self.upgrades.get(&upgrade).map_or(0, |s| s.level)
    }

    /// Latest frame at which anything in flight completes.
    #[must_use]
    pub fn last_completion(&self) -> Frame {
        let units = self
            .by_type
            .iter()
            .flatten()
            .map(|id| self.instances[id.0 as usize].available_at);
        let techs = self.tech_researched.values().copied();
        let upgrades = self.upgrades.values().map(|s| s.available_at);
        units
            .chain(techs)
            .chain(upgrades)
            .max()
            .unwrap_or(self.frame)
            .max(self.frame)
    }

    /// Check structural invariants.
    ///
    /// Compiled in with the `debug-validation` feature; engine operations
    /// call it after every successful transition.
    #[cfg(feature = "debug-validation")]
    pub(crate) fn validate(&self) {
        assert!(self.minerals >= 0, "negative minerals: {}", self.minerals);
        assert!(self.gas >= 0, "negative gas: {}", self.gas);
        assert!(
            self.supply_total <= MAX_SUPPLY,
            "supply total above cap: {}",
            self.supply_total
        );
        for id in &self.pending_supply {
            assert!(self.instances[id.0 as usize].supply_provided > 0);
        }
    }
}

impl PartialEq for WorldState {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree)
            && self.roles == other.roles
            && self.frame == other.frame
            && self.minerals == other.minerals
            && self.gas == other.gas
            && self.supply_used == other.supply_used
            && self.supply_total == other.supply_total
            && self.instances == other.instances
            && self.by_type == other.by_type
            && self.pending_supply == other.pending_supply
            && self.tech_researched == other.tech_researched
            && self.upgrades == other.upgrades
    }
}

impl fmt::Debug for WorldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<(&str, usize)> = self
            .by_type
            .iter()
            .enumerate()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(i, ids)| (self.tree.unit(UnitType(i as u16)).name.as_str(), ids.len()))
            .collect();
        f.debug_struct("WorldState")
            .field("race", &self.roles.race)
            .field("frame", &self.frame)
            .field("minerals", &self.minerals)
            .field("gas", &self.gas)
            .field("supply", &(self.supply_used, self.supply_total))
            .field("units", &counts)
            .field("techs", &self.tech_researched)
            .field("upgrades", &self.upgrades)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::standard::*;

    fn terran() -> WorldState {
        WorldState::new(TechTree::standard(), Race::Terran)
            .unwrap()
            .with_resources(50, 0)
            .with_units(COMMAND_CENTER, 1)
            .with_units(SCV, 4)
    }

    #[test]
    fn test_spawn_completed_counts_supply() {
        let world = terran();
        assert_eq!(world.supply_used(), 8);
        assert_eq!(world.supply_total(), 20);
        assert_eq!(world.count(SCV), 4);
        assert_eq!(world.completed_count(SCV), 4);
        assert_eq!(world.available_workers(), 4);
    }

    #[test]
    fn test_spawn_in_progress_defers_supply() {
        let mut world = terran();
        world.spawn_in_progress(SUPPLY_DEPOT, 100);
        assert_eq!(world.supply_total(), 20);
        assert_eq!(world.pending_supply(), 16);
        assert_eq!(world.next_supply_completion(), Some(100));
        assert_eq!(world.completed_count(SUPPLY_DEPOT), 0);

        world.frame = 100;
        world.fold_supply();
        assert_eq!(world.supply_total(), 36);
        assert_eq!(world.pending_supply(), 0);
        assert!(world.next_supply_completion().is_none());
    }

    #[test]
    fn test_supply_total_saturates() {
        let world = WorldState::new(TechTree::standard(), Race::Terran)
            .unwrap()
            .with_units(COMMAND_CENTER, 30);
        assert_eq!(world.supply_total(), MAX_SUPPLY);
    }

    #[test]
    fn test_earliest_available_respects_filter() {
        let mut world = terran();
        let busy = world.spawn_completed(FACTORY);
        world.instance_mut(busy).available_at = 500;
        assert_eq!(world.completed_count(FACTORY), 1);
        let free = world.spawn_completed(FACTORY);
        world.set_addon(free, MACHINE_SHOP);

        assert_eq!(world.earliest_available(FACTORY, |_| true), Some(free));
        assert_eq!(
            world.earliest_available(FACTORY, |u| u.addon.is_none()),
            Some(busy)
        );
        assert_eq!(world.earliest_available(STARPORT, |_| true), None);
    }

    #[test]
    fn test_retire_removes_from_live_set() {
        let mut world = terran();
        let id = world.earliest_available(SCV, |_| true).unwrap();
        world.retire(id);
        assert_eq!(world.count(SCV), 3);
        assert_eq!(world.available_workers(), 3);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = terran();
        let mut copy = original.clone();
        copy.spawn_completed(BARRACKS);
        copy.minerals -= 50;
        copy.set_tech(STIM_PACKS, 10);
        assert_eq!(original.count(BARRACKS), 0);
        assert_eq!(original.minerals(), 50);
        assert!(original.tech_available_at(STIM_PACKS).is_none());
        assert_ne!(original, copy);
    }

    #[test]
    fn test_last_completion() {
        let mut world = terran().at_frame(10);
        assert_eq!(world.last_completion(), 10);
        world.spawn_in_progress(BARRACKS, 300);
        world.set_upgrade(
            U238_SHELLS,
            UpgradeState {
                started_at: 0,
                available_at: 900,
                level: 1,
            },
        );
        assert_eq!(world.last_completion(), 900);
    }

    #[test]
    fn test_unknown_race_table() {
        let tree = Arc::new(TechTree::new());
        assert!(WorldState::new(tree, Race::Zerg).is_err());
    }
}
