//! Proptest strategies for engine and planner testing.
//!
//! Worlds are drawn on the built-in tech tree: a race, its main base and
//! supply, a random worker count and bank, and a handful of completed
//! structures regardless of their prerequisites. Moves are drawn from the
//! same race so that most of them have a chance of being feasible.

use proptest::prelude::*;

use planner_core::data::{TechType, UnitType, UpgradeType};
use planner_core::moves::Move;
use planner_core::race::Race;
use planner_core::world::Frame;
use planner_core::WorldState;

use crate::fixtures;

/// Inputs for building a random world.
#[derive(Debug, Clone)]
pub struct WorldParams {
    /// Race played.
    pub race: Race,
    /// Starting frame.
    pub frame: Frame,
    /// Banked minerals.
    pub minerals: i32,
    /// Banked gas.
    pub gas: i32,
    /// Workers on top of the main base.
    pub workers: usize,
    /// Completed structures added on top of the main base.
    pub structures: Vec<UnitType>,
    /// Whether a supply provider is under construction.
    pub supply_in_progress: bool,
}

impl WorldParams {
    /// Build the world.
    #[must_use]
    pub fn build(&self) -> WorldState {
        let roles = fixtures::tree()
            .race(self.race)
            .expect("built-in tree covers every race");
        let mut world = fixtures::empty(self.race)
            .at_frame(self.frame)
            .with_resources(self.minerals, self.gas)
            .with_units(roles.resource_depot, 1)
            .with_units(roles.supply_provider, 1)
            .with_units(roles.worker, self.workers);
        for &structure in &self.structures {
            world.spawn_completed(structure);
        }
        if self.supply_in_progress {
            world.spawn_in_progress(roles.supply_provider, 300);
        }
        world
    }
}

/// Generate a race.
pub fn arb_race() -> impl Strategy<Value = Race> {
    prop::sample::select(Race::ALL.to_vec())
}

fn units_of(race: Race, filter: impl Fn(UnitType) -> bool) -> Vec<UnitType> {
    let tree = fixtures::tree();
    tree.unit_types()
        .filter(|&t| tree.unit(t).race == race && filter(t))
        .collect()
}

/// Generate any unit type of `race`, structures and add-ons included.
pub fn arb_unit_for(race: Race) -> impl Strategy<Value = UnitType> {
    prop::sample::select(units_of(race, |_| true))
}

/// Generate a non-add-on structure of `race`.
pub fn arb_structure_for(race: Race) -> impl Strategy<Value = UnitType> {
    let tree = fixtures::tree();
    prop::sample::select(units_of(race, |t| {
        let spec = tree.unit(t);
        spec.is_building() && !spec.is_addon()
    }))
}

/// Generate any move of `race`.
pub fn arb_move_for(race: Race) -> impl Strategy<Value = Move> {
    let tree = fixtures::tree();
    let mut moves: Vec<Move> = units_of(race, |_| true)
        .into_iter()
        .map(Move::ProduceUnit)
        .collect();
    moves.extend(
        (0..tree.tech_count())
            .map(|i| TechType(i as u16))
            .filter(|&t| tree.tech(t).race == race)
            .map(Move::ResearchTech),
    );
    moves.extend(
        (0..tree.upgrade_count())
            .map(|i| UpgradeType(i as u16))
            .filter(|&u| tree.upgrade(u).race == race)
            .map(Move::ApplyUpgrade),
    );
    prop::sample::select(moves)
}

/// Generate a resource demand.
pub fn arb_resources() -> impl Strategy<Value = (i32, i32)> {
    (0i32..800, 0i32..400)
}

/// Generate world parameters.
pub fn arb_world_params() -> impl Strategy<Value = WorldParams> {
    arb_race().prop_flat_map(|race| {
        (
            0u32..3000,
            0i32..600,
            0i32..300,
            0usize..12,
            prop::collection::vec(arb_structure_for(race), 0..4),
            any::<bool>(),
        )
            .prop_map(
                move |(frame, minerals, gas, workers, structures, supply_in_progress)| {
                    WorldParams {
                        race,
                        frame,
                        minerals,
                        gas,
                        workers,
                        structures,
                        supply_in_progress,
                    }
                },
            )
    })
}

/// Generate a world.
pub fn arb_world() -> impl Strategy<Value = WorldState> {
    arb_world_params().prop_map(|params| params.build())
}

/// Generate a world together with a unit type of its race.
pub fn arb_world_and_unit() -> impl Strategy<Value = (WorldState, UnitType)> {
    arb_world_params().prop_flat_map(|params| {
        let race = params.race;
        (Just(params.build()), arb_unit_for(race))
    })
}

/// Generate a world together with a short sequence of moves of its race.
pub fn arb_world_and_moves(max_len: usize) -> impl Strategy<Value = (WorldState, Vec<Move>)> {
    arb_world_params().prop_flat_map(move |params| {
        let race = params.race;
        (
            Just(params.build()),
            prop::collection::vec(arb_move_for(race), 1..max_len),
        )
    })
}
