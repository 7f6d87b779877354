//! Build-order agent driving the planner from live observations.
//!
//! The agent owns a [`Planner`] and a [`ProductionSink`]. Every
//! [`on_frame`](BuildOrderAgent::on_frame) runs one planning cycle and
//! hands a newly chosen move to the sink. Game events keep the search tree
//! in step with reality: a confirmed move relocates the tree, anything that
//! contradicts the plan resets it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::TechTree;
use crate::error::Result;
use crate::moves::Move;
use crate::planner::Planner;
use crate::snapshot::{Observation, ProductionOrder};
use crate::world::WorldState;

/// Consumer of production orders, typically the game's production queue.
pub trait ProductionSink {
    /// Accept an order.
    fn submit(&mut self, order: ProductionOrder);
}

impl ProductionSink for Vec<ProductionOrder> {
    fn submit(&mut self, order: ProductionOrder) {
        self.push(order);
    }
}

/// Notification from the game about an owned unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A unit or structure started or finished production.
    UnitCreated {
        /// Unit type name.
        type_name: String,
    },
    /// An owned unit was destroyed.
    UnitDestroyed {
        /// Unit type name.
        type_name: String,
    },
    /// An owned unit changed hands.
    UnitRenegaded {
        /// Unit type name.
        type_name: String,
    },
}

/// Drives a planner from observations and game events.
#[derive(Debug)]
pub struct BuildOrderAgent<S: ProductionSink> {
    tech_tree: Arc<TechTree>,
    planner: Planner,
    sink: S,
    /// Move last handed to the sink and not yet confirmed.
    issued: Option<Move>,
}

impl<S: ProductionSink> BuildOrderAgent<S> {
    /// Create an agent.
    #[must_use]
    pub fn new(tech_tree: Arc<TechTree>, planner: Planner, sink: S) -> Self {
        Self {
            tech_tree,
            planner,
            sink,
            issued: None,
        }
    }

    /// The planner.
    #[must_use]
    pub const fn planner(&self) -> &Planner {
        &self.planner
    }

    /// The sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Move issued and awaiting confirmation.
    #[must_use]
    pub const fn issued(&self) -> Option<Move> {
        self.issued
    }

    /// Run one planning cycle against `obs`.
    ///
    /// Returns the current best order, or `None` once the goal is met or no
    /// move has been scored yet. A move different from the one already
    /// issued is submitted to the sink.
    ///
    /// # Errors
    ///
    /// Errors from [`WorldState::from_observation`].
    pub fn on_frame(&mut self, obs: &Observation) -> Result<Option<ProductionOrder>> {
        let world = WorldState::from_observation(Arc::clone(&self.tech_tree), obs)?;
        self.confirm_research(&world);

        if self.planner.goal().is_met(&world) {
            return Ok(None);
        }
        let Some(mv) = self.planner.run_cycle(&world) else {
            return Ok(None);
        };
        let order = ProductionOrder::from_move(mv, &world);
        if self.issued != Some(mv) {
            tracing::info!(order = ?order, frame = obs.frame, "Issuing production order");
            self.sink.submit(order.clone());
            self.issued = Some(mv);
        }
        Ok(Some(order))
    }

    /// React to a game event.
    pub fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::UnitCreated { type_name } => {
                let expected = match self.issued {
                    Some(mv @ Move::ProduceUnit(unit_type)) => {
                        (self.tech_tree.unit(unit_type).name == *type_name).then_some(mv)
                    }
                    _ => None,
                };
                match expected {
                    Some(mv) if self.planner.relocate_to_move(mv) => {
                        tracing::info!(unit = %type_name, "Planned unit created, relocating");
                    }
                    _ => {
                        tracing::info!(unit = %type_name, "Unplanned unit created, resetting");
                        self.planner.reset();
                    }
                }
                self.issued = None;
            }
            GameEvent::UnitDestroyed { type_name } | GameEvent::UnitRenegaded { type_name } => {
                tracing::info!(unit = %type_name, "Owned unit lost, resetting");
                self.planner.reset();
                self.issued = None;
            }
        }
    }

    /// Relocate once an issued tech or upgrade shows up as started.
    fn confirm_research(&mut self, world: &WorldState) {
        let started = match self.issued {
            Some(Move::ResearchTech(tech)) => world.tech_available_at(tech).is_some(),
            Some(Move::ApplyUpgrade(upgrade)) => world
                .upgrade_state(upgrade)
                .is_some_and(|s| s.available_at > world.frame()),
            _ => false,
        };
        if let (true, Some(mv)) = (started, self.issued) {
            if !self.planner.relocate_to_move(mv) {
                self.planner.reset();
            }
            tracing::info!(research = mv.name(&self.tech_tree), "Planned research started");
            self.issued = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::standard::*;
    use crate::goal::Goal;
    use crate::planner::PlannerConfig;
    use crate::race::Race;
    use crate::snapshot::{ObservedUnit, OrderKind};

    fn agent(goal: Goal) -> BuildOrderAgent<Vec<ProductionOrder>> {
        let tree = TechTree::standard();
        let planner = Planner::new(
            Arc::clone(&tree),
            Race::Terran,
            goal,
            PlannerConfig::default().with_iterations(60).with_seed(11),
        )
        .unwrap();
        BuildOrderAgent::new(tree, planner, Vec::new())
    }

    fn observation() -> Observation {
        let mut units = vec![ObservedUnit::completed("CommandCenter")];
        units.extend((0..4).map(|_| ObservedUnit::completed("SCV")));
        Observation {
            race: Race::Terran,
            frame: 0,
            minerals: 50,
            gas: 0,
            supply_used: 8,
            supply_total: 20,
            units,
            techs: Vec::new(),
            upgrades: Default::default(),
            research: Vec::new(),
        }
    }

    #[test]
    fn test_issues_order_once() {
        let mut agent = agent(Goal::new().with_units(MARINE, 2));
        let first = agent.on_frame(&observation()).unwrap().unwrap();
        assert_eq!(agent.sink().len(), 1);
        assert_ne!(first.type_name, "Marine");

        let again = agent.on_frame(&observation()).unwrap();
        if again.as_ref() == Some(&first) {
            assert_eq!(agent.sink().len(), 1);
        }
    }

    #[test]
    fn test_goal_met_returns_none() {
        let mut agent = agent(Goal::new().with_units(SCV, 4));
        assert!(agent.on_frame(&observation()).unwrap().is_none());
        assert!(agent.sink().is_empty());
    }

    #[test]
    fn test_matching_creation_relocates() {
        let mut agent = agent(Goal::new().with_units(SCV, 6));
        let order = agent.on_frame(&observation()).unwrap().unwrap();
        assert_ne!(order.kind, OrderKind::Research);
        let resets = agent.planner().stats().resets;

        agent.on_event(&GameEvent::UnitCreated {
            type_name: order.type_name.clone(),
        });
        assert_eq!(agent.planner().stats().resets, resets);
        assert!(agent.issued().is_none());
        assert!(agent.planner().tree().node(agent.planner().tree().root()).mv().is_none());
    }

    #[test]
    fn test_mismatch_and_loss_reset() {
        let mut agent = agent(Goal::new().with_units(SCV, 6));
        agent.on_frame(&observation()).unwrap();
        let resets = agent.planner().stats().resets;

        agent.on_event(&GameEvent::UnitCreated {
            type_name: "Wraith".to_string(),
        });
        assert_eq!(agent.planner().stats().resets, resets + 1);

        agent.on_event(&GameEvent::UnitDestroyed {
            type_name: "SCV".to_string(),
        });
        agent.on_event(&GameEvent::UnitRenegaded {
            type_name: "SCV".to_string(),
        });
        assert_eq!(agent.planner().stats().resets, resets + 3);
    }
}
