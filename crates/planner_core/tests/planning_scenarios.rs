//! End-to-end scenarios for the engine and the planner.

use std::sync::Arc;

use planner_core::data::standard::*;
use planner_core::data::TechTree;
use planner_core::goal::Goal;
use planner_core::moves::Move;
use planner_core::planner::{NodeId, PlannerConfig, StepOutcome};
use planner_core::race::Race;
use planner_core::{Planner, PlanningError, WorldState};
use planner_test_utils::fixtures;

/// Every live node's best frame is at most each child's best frame.
fn assert_backups_monotonic(planner: &Planner) {
    let tree = planner.tree();
    let mut stack = vec![tree.root()];
    while let Some(id) = stack.pop() {
        let node = tree.node(id);
        let children = node.children().unwrap_or_default();
        for &child in children {
            if let (Some(parent_best), Some(child_best)) =
                (node.best_frames_seen(), tree.node(child).best_frames_seen())
            {
                assert!(
                    parent_best <= child_best,
                    "node {id:?} backs up {parent_best} above child {child:?} at {child_best}"
                );
            }
        }
        stack.extend(children);
    }
}

/// Whether the path into `id` passes through a move producing `unit_type`.
fn path_contains(planner: &Planner, id: NodeId, unit_type: planner_core::data::UnitType) -> bool {
    let tree = planner.tree();
    let mut current = Some(id);
    while let Some(node) = current {
        if tree.node(node).mv() == Some(Move::ProduceUnit(unit_type)) {
            return true;
        }
        current = tree.node(node).parent();
    }
    false
}

// =============================================================================
// Engine scenarios
// =============================================================================

mod engine {
    use super::*;

    #[test]
    fn test_workers_back_to_back() {
        let mut world = fixtures::empty(Race::Terran)
            .with_resources(200, 0)
            .with_units(COMMAND_CENTER, 1)
            .with_units(SCV, 4);

        let mut last_frame = world.frame();
        for expected in 5..=8 {
            world.produce_unit(SCV).unwrap();
            assert_eq!(world.count(SCV), expected);
            assert!(world.frame() > last_frame, "frame did not advance");
            last_frame = world.frame();
        }
    }

    #[test]
    fn test_addon_without_parent() {
        let mut world = fixtures::terran_opening().with_units(BARRACKS, 1);
        assert!(!world.is_unit_feasible(MACHINE_SHOP));
        let err = world.produce_structure(MACHINE_SHOP).unwrap_err();
        assert!(matches!(err, PlanningError::InfeasibleAction { .. }));
    }

    #[test]
    fn test_addon_parent_taken() {
        let mut world = fixtures::terran_with_gas(8).with_units(FACTORY, 1);
        world.produce_structure(MACHINE_SHOP).unwrap();
        assert!(!world.is_unit_feasible(MACHINE_SHOP));
        assert!(world.produce_structure(MACHINE_SHOP).is_err());
    }

    #[test]
    fn test_every_opening_trains_a_worker() {
        for race in Race::ALL {
            let mut world = fixtures::opening(race);
            let worker = world.roles().worker;
            let start = world.count(worker);
            world.produce_unit(worker).unwrap();
            assert_eq!(world.count(worker), start + 1, "{race:?}");
        }
    }
}

// =============================================================================
// Planner scenarios
// =============================================================================

mod planner {
    use super::*;

    #[test]
    fn test_single_worker_reaches_terminal() {
        let snapshot = fixtures::empty(Race::Terran)
            .with_resources(50, 0)
            .with_units(COMMAND_CENTER, 1)
            .with_units(SCV, 1);
        let mut planner = fixtures::planner(Race::Terran, Goal::new().with_units(SCV, 2));

        let mut terminal = None;
        for _ in 0..50 {
            if let StepOutcome::Terminal { frames } = planner.try_step(&snapshot).unwrap() {
                terminal = Some(frames);
                break;
            }
        }
        let frames = terminal.expect("no terminal node reached");
        assert!(frames > 0);
        let root = planner.tree().node(planner.tree().root());
        assert!(root.best_frames_seen().is_some_and(|best| best <= frames));
    }

    #[test]
    fn test_backups_stay_monotonic() {
        let snapshot = fixtures::terran_opening();
        let mut planner = fixtures::planner(Race::Terran, Goal::new().with_units(MARINE, 2));

        for _ in 0..200 {
            let outcome = planner.step(&snapshot);
            if let StepOutcome::Expanded { frames } | StepOutcome::Terminal { frames } = outcome {
                let root = planner.tree().node(planner.tree().root());
                assert!(root.best_frames_seen().is_some_and(|best| best <= frames));
            }
            assert_backups_monotonic(&planner);
        }
    }

    #[test]
    fn test_missing_structure_is_planned_first() {
        let snapshot = fixtures::terran_opening();
        let mut planner = fixtures::planner(Race::Terran, Goal::new().with_units(MARINE, 2));
        for _ in 0..300 {
            planner.step(&snapshot);
        }

        let best = planner.best_move().expect("a move was scored");
        assert_ne!(best, Move::ProduceUnit(MARINE));
        let Move::ProduceUnit(first) = best else {
            panic!("unexpected move {best:?}");
        };
        assert!(planner.required_set().contains(&first));

        // No Marine anywhere in the tree without a Barracks above it.
        let tree = planner.tree();
        let mut stack = vec![tree.root()];
        while let Some(id) = stack.pop() {
            if tree.node(id).mv() == Some(Move::ProduceUnit(MARINE)) {
                assert!(path_contains(&planner, id, BARRACKS));
            }
            stack.extend(tree.node(id).children().unwrap_or_default());
        }
    }

    #[test]
    fn test_play_out_per_race() {
        let cases = [
            (Race::Terran, MARINE),
            (Race::Protoss, ZEALOT),
            (Race::Zerg, ZERGLING),
        ];
        for (race, unit) in cases {
            let mut planner = fixtures::fast_planner(race, Goal::new().with_units(unit, 2));
            let order = planner.play_out(&fixtures::opening(race), 40).unwrap();
            assert!(order.goal_met, "{race:?} did not reach its goal");

            let producer = fixtures::tree().unit(unit).producer.unwrap();
            let first_unit = order
                .steps
                .iter()
                .position(|s| s.mv == Move::ProduceUnit(unit))
                .unwrap();
            let first_producer = order
                .steps
                .iter()
                .position(|s| s.mv == Move::ProduceUnit(producer));
            if race != Race::Zerg {
                assert!(first_producer.is_some_and(|p| p < first_unit), "{race:?}");
            }
        }
    }

    const CLOAK_TREE: &str = r#"
TechTreeData(
    units: [
        UnitData(name: "SCV", race: Terran, minerals: 50, build_time: 300, supply_required: 2, tags: ["worker"], producer: Some("CommandCenter")),
        UnitData(name: "CommandCenter", race: Terran, minerals: 400, build_time: 1800, supply_provided: 20, tags: ["resource_depot"], producer: Some("SCV")),
        UnitData(name: "SupplyDepot", race: Terran, minerals: 100, build_time: 600, supply_provided: 16, tags: ["building"], producer: Some("SCV")),
        UnitData(name: "Refinery", race: Terran, minerals: 100, build_time: 600, tags: ["refinery"], producer: Some("SCV")),
        UnitData(name: "Barracks", race: Terran, minerals: 150, build_time: 1200, tags: ["building"], producer: Some("SCV"), requires: ["CommandCenter"]),
        UnitData(name: "Academy", race: Terran, minerals: 150, build_time: 1200, tags: ["building"], producer: Some("SCV"), requires: ["Barracks"]),
        UnitData(name: "Ghost", race: Terran, minerals: 50, build_time: 600, supply_required: 2, producer: Some("Barracks"), required_tech: Some("Cloak")),
    ],
    techs: [
        TechData(name: "Cloak", race: Terran, minerals: 100, research_time: 800, researcher: "Academy"),
    ],
    races: [
        RaceData(race: Terran, worker: "SCV", supply_provider: "SupplyDepot", resource_depot: "CommandCenter", refinery: "Refinery"),
    ],
)
"#;

    #[test]
    fn test_unit_gated_on_tech_is_reached() {
        let tree = Arc::new(TechTree::from_ron_str("cloak", CLOAK_TREE).unwrap());
        let unit = |name: &str| tree.unit_by_name(name).unwrap();
        let (ghost, academy) = (unit("Ghost"), unit("Academy"));
        let cloak = tree.tech_by_name("Cloak").unwrap();

        let mut planner = Planner::new(
            Arc::clone(&tree),
            Race::Terran,
            Goal::new().with_units(ghost, 1),
            PlannerConfig::default().with_iterations(40).with_seed(5),
        )
        .unwrap();
        assert!(planner.required_set().contains(&academy));
        assert_eq!(planner.required_techs(), &[cloak]);

        let snapshot = WorldState::new(Arc::clone(&tree), Race::Terran)
            .unwrap()
            .with_resources(50, 0)
            .with_units(unit("CommandCenter"), 1)
            .with_units(unit("SCV"), 4);
        let order = planner.play_out(&snapshot, 40).unwrap();
        assert!(order.goal_met);

        let researched = order
            .steps
            .iter()
            .position(|s| s.mv == Move::ResearchTech(cloak))
            .unwrap();
        let trained = order
            .steps
            .iter()
            .position(|s| s.mv == Move::ProduceUnit(ghost))
            .unwrap();
        assert!(researched < trained);
    }

    #[test]
    fn test_tech_goal_is_researched() {
        let mut planner = fixtures::fast_planner(
            Race::Terran,
            Goal::new().with_units(MARINE, 1).with_tech(STIM_PACKS),
        );
        let order = planner.play_out(&fixtures::terran_opening(), 60).unwrap();
        assert!(order.goal_met);
        assert!(order
            .steps
            .iter()
            .any(|s| s.mv == Move::ResearchTech(STIM_PACKS)));
    }
}
