//! Test fixtures and helpers.
//!
//! Opening positions for each race on the built-in tech tree, planner
//! constructors with a fixed seed, and observations mirroring the openings
//! as a game would report them.

use std::sync::Arc;

use planner_core::data::standard::*;
use planner_core::data::TechTree;
use planner_core::goal::Goal;
use planner_core::planner::{Planner, PlannerConfig};
use planner_core::race::Race;
use planner_core::snapshot::{Observation, ObservedUnit};
use planner_core::WorldState;

/// Minerals banked at the start of a game.
pub const STARTING_MINERALS: i32 = 50;

/// Workers at the start of a game.
pub const STARTING_WORKERS: usize = 4;

/// Seed used by [`planner`] and [`fast_planner`].
pub const FIXTURE_SEED: u64 = 42;

/// The built-in tech tree.
#[must_use]
pub fn tree() -> Arc<TechTree> {
    TechTree::standard()
}

/// Empty world for `race` on the built-in tree.
///
/// # Panics
///
/// Panics if the built-in tree lacks the race, which would be a catalog bug.
#[must_use]
pub fn empty(race: Race) -> WorldState {
    WorldState::new(tree(), race).expect("built-in tree covers every race")
}

/// Standard opening: main base, four workers, 50 minerals, and an
/// Overlord for Zerg.
#[must_use]
pub fn opening(race: Race) -> WorldState {
    let world = empty(race).with_resources(STARTING_MINERALS, 0);
    match race {
        Race::Terran => world
            .with_units(COMMAND_CENTER, 1)
            .with_units(SCV, STARTING_WORKERS),
        Race::Protoss => world
            .with_units(NEXUS, 1)
            .with_units(PROBE, STARTING_WORKERS),
        Race::Zerg => world
            .with_units(HATCHERY, 1)
            .with_units(OVERLORD, 1)
            .with_units(DRONE, STARTING_WORKERS),
    }
}

/// Terran opening.
#[must_use]
pub fn terran_opening() -> WorldState {
    opening(Race::Terran)
}

/// Protoss opening.
#[must_use]
pub fn protoss_opening() -> WorldState {
    opening(Race::Protoss)
}

/// Zerg opening.
#[must_use]
pub fn zerg_opening() -> WorldState {
    opening(Race::Zerg)
}

/// Terran world one Barracks and one Refinery further, with `workers` SCVs.
#[must_use]
pub fn terran_with_gas(workers: usize) -> WorldState {
    empty(Race::Terran)
        .with_resources(200, 100)
        .with_units(COMMAND_CENTER, 1)
        .with_units(SUPPLY_DEPOT, 1)
        .with_units(BARRACKS, 1)
        .with_units(REFINERY, 1)
        .with_units(SCV, workers)
}

/// Planner on the built-in tree with the fixture seed.
///
/// # Panics
///
/// Panics if `goal` names a type of another race.
#[must_use]
pub fn planner(race: Race, goal: Goal) -> Planner {
    planner_with(race, goal, PlannerConfig::default().with_seed(FIXTURE_SEED))
}

/// Planner running short cycles, for tests that drive many of them.
#[must_use]
pub fn fast_planner(race: Race, goal: Goal) -> Planner {
    planner_with(
        race,
        goal,
        PlannerConfig::default()
            .with_seed(FIXTURE_SEED)
            .with_iterations(40),
    )
}

/// Planner with an explicit configuration.
///
/// # Panics
///
/// Panics if `goal` names a type of another race.
#[must_use]
pub fn planner_with(race: Race, goal: Goal, config: PlannerConfig) -> Planner {
    Planner::new(tree(), race, goal, config).expect("goal matches the planner's race")
}

/// Observation of the Terran opening at `frame`.
#[must_use]
pub fn terran_observation(frame: u32) -> Observation {
    let mut units = vec![ObservedUnit::completed("CommandCenter")];
    units.extend((0..STARTING_WORKERS).map(|_| ObservedUnit::completed("SCV")));
    Observation {
        race: Race::Terran,
        frame,
        minerals: STARTING_MINERALS,
        gas: 0,
        supply_used: 8,
        supply_total: 20,
        units,
        techs: Vec::new(),
        upgrades: Default::default(),
        research: Vec::new(),
    }
}

/// Parse an observation written in RON.
///
/// # Panics
///
/// Panics on malformed input; fixtures are expected to be valid.
#[must_use]
pub fn observation_from_ron(text: &str) -> Observation {
    ron::from_str(text).expect("fixture observation parses")
}
