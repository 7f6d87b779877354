//! Property tests for the economic transition engine.
//!
//! Random worlds on the built-in tech tree are pushed through random moves;
//! whatever the outcome, the engine must keep its invariants.

use planner_core::moves::Move;
use planner_core::PlanningError;
use planner_test_utils::proptest::prelude::*;
use planner_test_utils::strategies::{
    arb_resources, arb_world, arb_world_and_moves, arb_world_and_unit,
};

proptest! {
    // =========================================================================
    // Copy isolation
    // =========================================================================

    #[test]
    fn prop_mutating_a_clone_leaves_original(
        (world, moves) in arb_world_and_moves(6),
    ) {
        let before = world.clone();
        let mut branch = world.clone();
        for mv in moves {
            let _ = mv.apply(&mut branch);
        }
        let _ = branch.acquire_resources(400, 0);
        branch.finish();
        prop_assert_eq!(world, before);
    }

    // =========================================================================
    // Monotonic time, untouched on failure
    // =========================================================================

    #[test]
    fn prop_frame_never_decreases((world, moves) in arb_world_and_moves(8)) {
        let mut world = world;
        for mv in moves {
            let before = world.clone();
            match mv.apply(&mut world) {
                Ok(()) => prop_assert!(world.frame() >= before.frame()),
                Err(_) => prop_assert_eq!(&world, &before),
            }
        }
    }

    #[test]
    fn prop_advance_time_moves_forward(
        world in arb_world(),
        delta in 0u32..2_000,
        miners in 0u32..10,
    ) {
        let mut world = world;
        let start = world.frame();
        world.advance_time(delta, miners, 0);
        prop_assert!(world.frame() >= start + delta);
    }

    // =========================================================================
    // Resource sufficiency
    // =========================================================================

    #[test]
    fn prop_acquired_resources_are_banked(
        world in arb_world(),
        (minerals, gas) in arb_resources(),
    ) {
        let mut world = world;
        let start = world.frame();
        if world.acquire_resources(minerals, gas).is_ok() {
            prop_assert!(world.minerals() >= minerals);
            prop_assert!(world.gas() >= gas);
            prop_assert!(world.frame() >= start);
        }
    }

    #[test]
    fn prop_acquire_without_workers_fails(
        (minerals, gas) in arb_resources(),
    ) {
        let mut world = planner_test_utils::fixtures::empty(planner_core::race::Race::Terran);
        let result = world.acquire_resources(minerals.max(1), gas);
        let is_infeasible = matches!(result, Err(PlanningError::InfeasibleAction { .. }));
        prop_assert!(is_infeasible);
    }

    // =========================================================================
    // Supply accounting and feasibility
    // =========================================================================

    #[test]
    fn prop_produce_unit_accounts_supply((world, unit_type) in arb_world_and_unit()) {
        let mut world = world;
        let (is_building, supply_required) = {
            let spec = world.tree().unit(unit_type);
            (spec.is_building(), spec.supply_required)
        };
        prop_assume!(!is_building);

        let feasible = world.is_unit_feasible(unit_type);
        let used = world.supply_used();
        match world.produce_unit(unit_type) {
            Ok(_) => {
                prop_assert!(feasible);
                prop_assert_eq!(world.supply_used(), used + supply_required);
                prop_assert!(world.supply_used() <= world.supply_total());
            }
            Err(err) => {
                let is_infeasible = matches!(err, PlanningError::InfeasibleAction { .. });
                prop_assert!(is_infeasible);
                prop_assert!(!feasible);
            }
        }
    }

    #[test]
    fn prop_produce_structure_matches_feasibility((world, unit_type) in arb_world_and_unit()) {
        let mut world = world;
        prop_assume!(world.tree().unit(unit_type).is_building());

        let feasible = world.is_unit_feasible(unit_type);
        let result = world.produce_structure(unit_type);
        prop_assert_eq!(result.is_ok(), feasible);
    }

    #[test]
    fn prop_supply_total_is_capped((world, moves) in arb_world_and_moves(8)) {
        let mut world = world;
        for mv in moves {
            let _ = mv.apply(&mut world);
            prop_assert!(world.supply_total() <= 400);
        }
        world.finish();
        prop_assert!(world.supply_total() <= 400);
    }

    #[test]
    fn prop_feasible_move_applies((world, moves) in arb_world_and_moves(4)) {
        let mut world = world;
        for mv in moves {
            if !matches!(mv, Move::ProduceUnit(_)) {
                continue;
            }
            let feasible = mv.is_feasible(&world);
            let applied = mv.apply(&mut world).is_ok();
            prop_assert_eq!(applied, feasible);
        }
    }
}
