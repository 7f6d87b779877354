//! Offline planning of a scenario into a build order.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use planner_core::data::TechTree;
use planner_core::goal::Goal;
use planner_core::planner::PlannerStats;
use planner_core::race::Race;
use planner_core::snapshot::ProductionOrder;
use planner_core::world::Frame;
use planner_core::{Planner, WorldState};

use crate::error::Result;
use crate::scenario::Scenario;

/// Default cap on moves issued by one plan.
pub const DEFAULT_MAX_MOVES: usize = 200;

/// One order of the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedOrder {
    /// Frame at which the order was paid for and started.
    pub frame: Frame,
    /// The order.
    #[serde(flatten)]
    pub order: ProductionOrder,
}

/// Result of planning a scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanReport {
    /// Race played.
    pub race: Race,
    /// Frame of the observation.
    pub start_frame: Frame,
    /// Orders in issue order.
    pub orders: Vec<PlannedOrder>,
    /// Whether the goal was reached.
    pub goal_met: bool,
    /// Frame at which everything completes, if the goal was reached.
    pub completion_frame: Option<Frame>,
    /// Search counters.
    pub stats: PlannerStats,
}

impl PlanReport {
    /// Human-readable rendering, one order per line.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} build order from frame {}",
            self.race.display_name(),
            self.start_frame
        );
        for (i, planned) in self.orders.iter().enumerate() {
            let level = planned
                .order
                .level
                .map(|l| format!(" (level {l})"))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "{:>3}. {:>6}  {:?} {}{level}",
                i + 1,
                planned.frame,
                planned.order.kind,
                planned.order.type_name
            );
        }
        match self.completion_frame {
            Some(frame) => {
                let _ = writeln!(out, "Goal complete at frame {frame}");
            }
            None => {
                let _ = writeln!(out, "Goal not reached");
            }
        }
        let _ = writeln!(
            out,
            "{} iterations, {} expansions, {} prunes, {} resets",
            self.stats.iterations, self.stats.expansions, self.stats.prunes, self.stats.resets
        );
        out
    }
}

/// Plan a loaded scenario, resolving a custom tech tree against `base_dir`.
///
/// # Errors
///
/// Tech tree loading errors, or any error from [`plan_with_tree`].
pub fn plan_scenario(scenario: &Scenario, base_dir: &Path, max_moves: usize) -> Result<PlanReport> {
    let tree = scenario.resolve_tech_tree(base_dir)?;
    plan_with_tree(scenario, tree, max_moves)
}

/// Plan a scenario on a given tech tree.
///
/// # Errors
///
/// Unknown names in the observation or goal, a goal of another race, or
/// engine errors while applying the chosen moves.
pub fn plan_with_tree(scenario: &Scenario, tree: Arc<TechTree>, max_moves: usize) -> Result<PlanReport> {
    let obs = &scenario.observation;
    let snapshot = WorldState::from_observation(Arc::clone(&tree), obs)?;
    let goal = Goal::from_names(&tree, &scenario.goal)?;
    let mut planner = Planner::new(tree, obs.race, goal, scenario.config.clone())?;

    tracing::info!(
        race = obs.race.display_name(),
        frame = obs.frame,
        required = planner.required_set().len(),
        "Planning scenario"
    );
    let build_order = planner.play_out(&snapshot, max_moves)?;

    // Replay to spell each move as it would be issued.
    let mut world = snapshot;
    let mut orders = Vec::with_capacity(build_order.steps.len());
    for step in &build_order.steps {
        let order = ProductionOrder::from_move(step.mv, &world);
        step.mv.apply(&mut world)?;
        orders.push(PlannedOrder {
            frame: step.frame,
            order,
        });
    }

    Ok(PlanReport {
        race: obs.race,
        start_frame: obs.frame,
        orders,
        goal_met: build_order.goal_met,
        completion_frame: build_order.completion_frame,
        stats: planner.stats(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner_core::goal::GoalByName;
    use planner_core::planner::PlannerConfig;
    use planner_core::snapshot::OrderKind;
    use planner_core::PlanningError;
    use planner_test_utils::fixtures;

    use crate::ToolError;

    fn scenario(goal: &[(&str, usize)]) -> Scenario {
        Scenario {
            observation: fixtures::terran_observation(0),
            goal: GoalByName {
                units: goal.iter().map(|&(n, c)| (n.to_string(), c)).collect(),
                ..GoalByName::default()
            },
            config: PlannerConfig::default().with_iterations(40).with_seed(9),
            tech_tree: None,
        }
    }

    #[test]
    fn test_plan_marines() {
        let report =
            plan_with_tree(&scenario(&[("Marine", 2)]), TechTree::standard(), 40).unwrap();
        assert!(report.goal_met);
        assert!(report.completion_frame.is_some());
        assert!(report.orders.windows(2).all(|w| w[0].frame <= w[1].frame));

        let barracks = report
            .orders
            .iter()
            .position(|o| o.order.type_name == "Barracks")
            .unwrap();
        assert_eq!(report.orders[barracks].order.kind, OrderKind::Build);
        let marine = report
            .orders
            .iter()
            .position(|o| o.order.type_name == "Marine")
            .unwrap();
        assert!(barracks < marine);
        assert_eq!(report.orders[marine].order.kind, OrderKind::Train);
    }

    #[test]
    fn test_met_goal_plans_nothing() {
        let report = plan_with_tree(&scenario(&[("SCV", 4)]), TechTree::standard(), 10).unwrap();
        assert!(report.goal_met);
        assert!(report.orders.is_empty());
        assert!(report.completion_frame.is_some());
    }

    #[test]
    fn test_unknown_goal_name() {
        let err = plan_with_tree(&scenario(&[("Battlecruiser", 1)]), TechTree::standard(), 10)
            .unwrap_err();
        assert!(matches!(err, ToolError::Planning(PlanningError::UnknownType(_))));
    }

    #[test]
    fn test_render_and_json() {
        let report = plan_with_tree(&scenario(&[("SCV", 6)]), TechTree::standard(), 20).unwrap();
        let text = report.render_text();
        assert!(text.starts_with("Terran build order from frame 0"));
        assert!(text.contains("Train SCV"));

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["race"], "Terran");
        let orders = json["orders"].as_array().unwrap();
        assert_eq!(orders.len(), report.orders.len());
        assert!(orders[0]["frame"].is_u64());
        assert!(orders[0]["type_name"].is_string());
    }

    #[test]
    fn test_bundled_zerg_scenario() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");
        let scenario = Scenario::load(&dir.join("zerg_carapace.ron")).unwrap();
        let report = plan_scenario(&scenario, &dir, DEFAULT_MAX_MOVES).unwrap();
        assert!(report.goal_met);
        assert_eq!(report.start_frame, 2400);
        assert!(report
            .orders
            .iter()
            .any(|o| o.order.type_name == "Carapace" && o.order.level == Some(1)));
    }
}
