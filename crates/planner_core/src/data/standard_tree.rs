//! Construction of the built-in tech tree.

use std::sync::{Arc, OnceLock};

use super::standard::*;
use super::tech_tree::{RaceSpec, TechSpec, TechTree, UnitSpec, UpgradeSpec};
use super::unit_data::UnitTraits;
use super::{TechType, UnitType, UpgradeType};
use crate::race::Race;

static STANDARD: OnceLock<Arc<TechTree>> = OnceLock::new();

impl TechTree {
    /// The built-in three-race tech tree.
    ///
    /// Built once and shared; ids are the constants in
    /// [`standard`](super::standard).
    #[must_use]
    pub fn standard() -> Arc<TechTree> {
        Arc::clone(STANDARD.get_or_init(|| Arc::new(build_standard())))
    }
}

fn unit(tree: &mut TechTree, expected: UnitType, spec: UnitSpec) {
    let id = tree.push_unit(spec);
    debug_assert_eq!(id, expected, "standard unit table out of order");
}

fn building(
    name: &str,
    race: Race,
    minerals: i32,
    gas: i32,
    build_time: u32,
    builder: UnitType,
) -> UnitSpec {
    UnitSpec::new(name, race, minerals, gas, build_time, 0)
        .produced_by(builder)
        .with_traits(UnitTraits::BUILDING)
}

fn addon(name: &str, minerals: i32, gas: i32, build_time: u32, parent: UnitType) -> UnitSpec {
    UnitSpec::new(name, Race::Terran, minerals, gas, build_time, 0)
        .produced_by(parent)
        .with_traits(UnitTraits::ADDON.union(UnitTraits::BUILDING))
}

fn tech(
    tree: &mut TechTree,
    expected: TechType,
    name: &str,
    race: Race,
    price: (i32, i32),
    research_time: u32,
    researcher: UnitType,
) {
    let id = tree.push_tech(TechSpec {
        name: name.to_string(),
        race,
        mineral_price: price.0,
        gas_price: price.1,
        research_time,
        researcher,
        required_unit: None,
    });
    debug_assert_eq!(id, expected, "standard tech table out of order");
}

fn upgrade(tree: &mut TechTree, expected: UpgradeType, spec: UpgradeSpec) {
    let id = tree.push_upgrade(spec);
    debug_assert_eq!(id, expected, "standard upgrade table out of order");
}

/// Levelled upgrade whose price and time grow linearly.
fn levelled(
    name: &str,
    race: Race,
    price: (i32, i32),
    factor: i32,
    time: (u32, u32),
    max_level: u8,
    researcher: UnitType,
) -> UpgradeSpec {
    UpgradeSpec {
        name: name.to_string(),
        race,
        mineral_price: price.0,
        mineral_factor: factor,
        gas_price: price.1,
        gas_factor: factor,
        upgrade_time: time.0,
        time_factor: time.1,
        max_level,
        researcher,
        higher_level_requires: None,
    }
}

fn build_standard() -> TechTree {
    let mut tree = TechTree::new();
    add_terran_units(&mut tree);
    add_protoss_units(&mut tree);
    add_zerg_units(&mut tree);

    tech(&mut tree, STIM_PACKS, "StimPacks", Race::Terran, (100, 100), 1200, ACADEMY);
    tech(
        &mut tree,
        TANK_SIEGE_MODE,
        "TankSiegeMode",
        Race::Terran,
        (150, 150),
        1200,
        MACHINE_SHOP,
    );
    tech(&mut tree, BURROWING, "Burrowing", Race::Zerg, (100, 100), 1200, HATCHERY);

    upgrade(
        &mut tree,
        U238_SHELLS,
        levelled("U238Shells", Race::Terran, (150, 150), 0, (1500, 0), 1, ACADEMY),
    );
    let mut weapons = levelled(
        "TerranInfantryWeapons",
        Race::Terran,
        (100, 100),
        75,
        (4000, 480),
        3,
        ENGINEERING_BAY,
    );
    weapons.higher_level_requires = Some(ARMORY);
    upgrade(&mut tree, TERRAN_INFANTRY_WEAPONS, weapons);
    upgrade(
        &mut tree,
        PROTOSS_GROUND_WEAPONS,
        levelled(
            "ProtossGroundWeapons",
            Race::Protoss,
            (100, 100),
            50,
            (4000, 480),
            3,
            FORGE,
        ),
    );
    upgrade(
        &mut tree,
        SINGULARITY_CHARGE,
        levelled(
            "SingularityCharge",
            Race::Protoss,
            (150, 150),
            0,
            (2500, 0),
            1,
            CYBERNETICS_CORE,
        ),
    );
    upgrade(
        &mut tree,
        ZERG_MELEE_ATTACKS,
        levelled(
            "ZergMeleeAttacks",
            Race::Zerg,
            (100, 100),
            50,
            (4000, 480),
            3,
            EVOLUTION_CHAMBER,
        ),
    );
    upgrade(
        &mut tree,
        MUSCULAR_AUGMENTS,
        levelled(
            "MuscularAugments",
            Race::Zerg,
            (150, 150),
            0,
            (1500, 0),
            1,
            HYDRALISK_DEN,
        ),
    );

    tree.push_race(RaceSpec {
        race: Race::Terran,
        worker: SCV,
        supply_provider: SUPPLY_DEPOT,
        resource_depot: COMMAND_CENTER,
        refinery: REFINERY,
        builder_policy: Race::Terran.default_builder_policy(),
    });
    tree.push_race(RaceSpec {
        race: Race::Protoss,
        worker: PROBE,
        supply_provider: PYLON,
        resource_depot: NEXUS,
        refinery: ASSIMILATOR,
        builder_policy: Race::Protoss.default_builder_policy(),
    });
    tree.push_race(RaceSpec {
        race: Race::Zerg,
        worker: DRONE,
        supply_provider: OVERLORD,
        resource_depot: HATCHERY,
        refinery: EXTRACTOR,
        builder_policy: Race::Zerg.default_builder_policy(),
    });

    tree
}

fn add_terran_units(tree: &mut TechTree) {
    let t = Race::Terran;
    unit(
        tree,
        SCV,
        UnitSpec::new("SCV", t, 50, 0, 300, 2)
            .produced_by(COMMAND_CENTER)
            .with_traits(UnitTraits::WORKER),
    );
    unit(
        tree,
        MARINE,
        UnitSpec::new("Marine", t, 50, 0, 360, 2).produced_by(BARRACKS),
    );
    unit(
        tree,
        FIREBAT,
        UnitSpec::new("Firebat", t, 50, 25, 360, 2)
            .produced_by(BARRACKS)
            .requires(&[ACADEMY]),
    );
    unit(
        tree,
        MEDIC,
        UnitSpec::new("Medic", t, 50, 25, 450, 2)
            .produced_by(BARRACKS)
            .requires(&[ACADEMY]),
    );
    unit(
        tree,
        VULTURE,
        UnitSpec::new("Vulture", t, 75, 0, 450, 4).produced_by(FACTORY),
    );
    unit(
        tree,
        SIEGE_TANK,
        UnitSpec::new("SiegeTank", t, 150, 100, 750, 4)
            .produced_by(FACTORY)
            .requires_addon(MACHINE_SHOP),
    );
    unit(
        tree,
        GOLIATH,
        UnitSpec::new("Goliath", t, 100, 50, 600, 4)
            .produced_by(FACTORY)
            .requires(&[ARMORY]),
    );
    unit(
        tree,
        WRAITH,
        UnitSpec::new("Wraith", t, 150, 100, 900, 4).produced_by(STARPORT),
    );
    unit(
        tree,
        COMMAND_CENTER,
        building("CommandCenter", t, 400, 0, 1800, SCV)
            .provides_supply(20)
            .with_traits(UnitTraits::RESOURCE_DEPOT),
    );
    unit(
        tree,
        SUPPLY_DEPOT,
        building("SupplyDepot", t, 100, 0, 600, SCV).provides_supply(16),
    );
    unit(
        tree,
        REFINERY,
        building("Refinery", t, 100, 0, 600, SCV).with_traits(UnitTraits::REFINERY),
    );
    unit(
        tree,
        BARRACKS,
        building("Barracks", t, 150, 0, 1200, SCV).requires(&[COMMAND_CENTER]),
    );
    unit(
        tree,
        ACADEMY,
        building("Academy", t, 150, 0, 1200, SCV).requires(&[BARRACKS]),
    );
    unit(
        tree,
        ENGINEERING_BAY,
        building("EngineeringBay", t, 125, 0, 900, SCV).requires(&[COMMAND_CENTER]),
    );
    unit(
        tree,
        FACTORY,
        building("Factory", t, 200, 100, 1200, SCV).requires(&[BARRACKS]),
    );
    unit(tree, MACHINE_SHOP, addon("MachineShop", 50, 50, 600, FACTORY));
    unit(
        tree,
        ARMORY,
        building("Armory", t, 100, 50, 1200, SCV).requires(&[FACTORY]),
    );
    unit(
        tree,
        STARPORT,
        building("Starport", t, 150, 100, 1050, SCV).requires(&[FACTORY]),
    );
}

fn add_protoss_units(tree: &mut TechTree) {
    let p = Race::Protoss;
    unit(
        tree,
        PROBE,
        UnitSpec::new("Probe", p, 50, 0, 300, 2)
            .produced_by(NEXUS)
            .with_traits(UnitTraits::WORKER),
    );
    unit(
        tree,
        ZEALOT,
        UnitSpec::new("Zealot", p, 100, 0, 600, 4).produced_by(GATEWAY),
    );
    unit(
        tree,
        DRAGOON,
        UnitSpec::new("Dragoon", p, 125, 50, 750, 4)
            .produced_by(GATEWAY)
            .requires(&[CYBERNETICS_CORE]),
    );
    unit(
        tree,
        OBSERVER,
        UnitSpec::new("Observer", p, 25, 75, 600, 2)
            .produced_by(ROBOTICS_FACILITY)
            .requires(&[OBSERVATORY]),
    );
    unit(
        tree,
        SHUTTLE,
        UnitSpec::new("Shuttle", p, 200, 0, 900, 4).produced_by(ROBOTICS_FACILITY),
    );
    unit(
        tree,
        NEXUS,
        building("Nexus", p, 400, 0, 1800, PROBE)
            .provides_supply(18)
            .with_traits(UnitTraits::RESOURCE_DEPOT),
    );
    unit(
        tree,
        PYLON,
        building("Pylon", p, 100, 0, 450, PROBE).provides_supply(16),
    );
    unit(
        tree,
        ASSIMILATOR,
        building("Assimilator", p, 100, 0, 600, PROBE).with_traits(UnitTraits::REFINERY),
    );
    unit(
        tree,
        GATEWAY,
        building("Gateway", p, 150, 0, 900, PROBE).requires(&[PYLON]),
    );
    unit(
        tree,
        FORGE,
        building("Forge", p, 150, 0, 600, PROBE).requires(&[PYLON]),
    );
    unit(
        tree,
        CYBERNETICS_CORE,
        building("CyberneticsCore", p, 200, 0, 900, PROBE).requires(&[GATEWAY]),
    );
    unit(
        tree,
        ROBOTICS_FACILITY,
        building("RoboticsFacility", p, 200, 200, 1200, PROBE).requires(&[CYBERNETICS_CORE]),
    );
    unit(
        tree,
        OBSERVATORY,
        building("Observatory", p, 50, 100, 450, PROBE).requires(&[ROBOTICS_FACILITY]),
    );
}

fn add_zerg_units(tree: &mut TechTree) {
    let z = Race::Zerg;
    unit(
        tree,
        DRONE,
        UnitSpec::new("Drone", z, 50, 0, 300, 2)
            .produced_by(HATCHERY)
            .with_traits(UnitTraits::WORKER),
    );
    unit(
        tree,
        ZERGLING,
        UnitSpec::new("Zergling", z, 50, 0, 420, 2)
            .produced_by(HATCHERY)
            .requires(&[SPAWNING_POOL]),
    );
    unit(
        tree,
        HYDRALISK,
        UnitSpec::new("Hydralisk", z, 75, 25, 420, 2)
            .produced_by(HATCHERY)
            .requires(&[HYDRALISK_DEN]),
    );
    unit(
        tree,
        OVERLORD,
        UnitSpec::new("Overlord", z, 100, 0, 600, 0)
            .produced_by(HATCHERY)
            .provides_supply(16),
    );
    unit(
        tree,
        HATCHERY,
        building("Hatchery", z, 300, 0, 1800, DRONE)
            .provides_supply(2)
            .with_traits(UnitTraits::RESOURCE_DEPOT),
    );
    unit(
        tree,
        EXTRACTOR,
        building("Extractor", z, 50, 0, 600, DRONE).with_traits(UnitTraits::REFINERY),
    );
    unit(
        tree,
        SPAWNING_POOL,
        building("SpawningPool", z, 200, 0, 1200, DRONE).requires(&[HATCHERY]),
    );
    unit(
        tree,
        HYDRALISK_DEN,
        building("HydraliskDen", z, 100, 50, 600, DRONE).requires(&[SPAWNING_POOL]),
    );
    unit(
        tree,
        EVOLUTION_CHAMBER,
        building("EvolutionChamber", z, 75, 0, 600, DRONE).requires(&[HATCHERY]),
    );
}
