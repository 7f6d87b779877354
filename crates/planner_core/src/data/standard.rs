//! Ids of the built-in tech tree returned by [`TechTree::standard`].
//!
//! The catalog is a Brood-War-like subset of the three races: enough
//! producers, prerequisites, add-ons, techs and upgrades to exercise every
//! rule of the engine. Supply values are in half-units.
//!
//! [`TechTree::standard`]: super::TechTree::standard

use super::{TechType, UnitType, UpgradeType};

// ========================================
// Terran
// ========================================

/// Terran worker.
pub const SCV: UnitType = UnitType(0);
/// Basic infantry.
pub const MARINE: UnitType = UnitType(1);
/// Flame infantry, needs an Academy.
pub const FIREBAT: UnitType = UnitType(2);
/// Healer, needs an Academy.
pub const MEDIC: UnitType = UnitType(3);
/// Light vehicle.
pub const VULTURE: UnitType = UnitType(4);
/// Tank, needs a Machine Shop on its Factory.
pub const SIEGE_TANK: UnitType = UnitType(5);
/// Walker, needs an Armory.
pub const GOLIATH: UnitType = UnitType(6);
/// Air fighter.
pub const WRAITH: UnitType = UnitType(7);
/// Terran resource depot.
pub const COMMAND_CENTER: UnitType = UnitType(8);
/// Terran supply provider.
pub const SUPPLY_DEPOT: UnitType = UnitType(9);
/// Terran refinery.
pub const REFINERY: UnitType = UnitType(10);
/// Infantry production.
pub const BARRACKS: UnitType = UnitType(11);
/// Infantry tech.
pub const ACADEMY: UnitType = UnitType(12);
/// Infantry upgrades.
pub const ENGINEERING_BAY: UnitType = UnitType(13);
/// Vehicle production.
pub const FACTORY: UnitType = UnitType(14);
/// Factory add-on.
pub const MACHINE_SHOP: UnitType = UnitType(15);
/// Vehicle tech.
pub const ARMORY: UnitType = UnitType(16);
/// Air production.
pub const STARPORT: UnitType = UnitType(17);

// ========================================
// Protoss
// ========================================

/// Protoss worker.
pub const PROBE: UnitType = UnitType(18);
/// Melee infantry.
pub const ZEALOT: UnitType = UnitType(19);
/// Ranged walker, needs a Cybernetics Core.
pub const DRAGOON: UnitType = UnitType(20);
/// Detector, needs an Observatory.
pub const OBSERVER: UnitType = UnitType(21);
/// Transport.
pub const SHUTTLE: UnitType = UnitType(22);
/// Protoss resource depot.
pub const NEXUS: UnitType = UnitType(23);
/// Protoss supply provider.
pub const PYLON: UnitType = UnitType(24);
/// Protoss refinery.
pub const ASSIMILATOR: UnitType = UnitType(25);
/// Ground production.
pub const GATEWAY: UnitType = UnitType(26);
/// Ground upgrades.
pub const FORGE: UnitType = UnitType(27);
/// Ground tech.
pub const CYBERNETICS_CORE: UnitType = UnitType(28);
/// Robotic production.
pub const ROBOTICS_FACILITY: UnitType = UnitType(29);
/// Detector tech.
pub const OBSERVATORY: UnitType = UnitType(30);

// ========================================
// Zerg
// ========================================

/// Zerg worker.
pub const DRONE: UnitType = UnitType(31);
/// Melee ground unit, needs a Spawning Pool.
pub const ZERGLING: UnitType = UnitType(32);
/// Ranged ground unit, needs a Hydralisk Den.
pub const HYDRALISK: UnitType = UnitType(33);
/// Zerg supply provider (a unit, not a structure).
pub const OVERLORD: UnitType = UnitType(34);
/// Zerg resource depot and producer of every Zerg unit.
pub const HATCHERY: UnitType = UnitType(35);
/// Zerg refinery.
pub const EXTRACTOR: UnitType = UnitType(36);
/// Zergling tech.
pub const SPAWNING_POOL: UnitType = UnitType(37);
/// Hydralisk tech.
pub const HYDRALISK_DEN: UnitType = UnitType(38);
/// Zerg upgrades.
pub const EVOLUTION_CHAMBER: UnitType = UnitType(39);

// ========================================
// Techs
// ========================================

/// Infantry speed boost, researched at the Academy.
pub const STIM_PACKS: TechType = TechType(0);
/// Siege mode, researched at the Machine Shop.
pub const TANK_SIEGE_MODE: TechType = TechType(1);
/// Burrow, researched at the Hatchery.
pub const BURROWING: TechType = TechType(2);

// ========================================
// Upgrades
// ========================================

/// Marine range, researched at the Academy.
pub const U238_SHELLS: UpgradeType = UpgradeType(0);
/// Three-level infantry weapons, researched at the Engineering Bay.
pub const TERRAN_INFANTRY_WEAPONS: UpgradeType = UpgradeType(1);
/// Three-level ground weapons, researched at the Forge.
pub const PROTOSS_GROUND_WEAPONS: UpgradeType = UpgradeType(2);
/// Dragoon range, researched at the Cybernetics Core.
pub const SINGULARITY_CHARGE: UpgradeType = UpgradeType(3);
/// Three-level melee attacks, researched at the Evolution Chamber.
pub const ZERG_MELEE_ATTACKS: UpgradeType = UpgradeType(4);
/// Hydralisk speed, researched at the Hydralisk Den.
pub const MUSCULAR_AUGMENTS: UpgradeType = UpgradeType(5);
