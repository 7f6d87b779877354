//! Boundary with the running game.
//!
//! An [`Observation`] is what the surrounding agent can see of its own
//! economy; [`WorldState::from_observation`] turns it into a planning
//! snapshot. A chosen [`Move`] goes back out as a [`ProductionOrder`].

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::TechTree;
use crate::error::{PlanningError, Result};
use crate::moves::Move;
use crate::race::Race;
use crate::world::{Frame, UpgradeState, WorldState, MAX_SUPPLY};

/// An owned unit or structure as seen in the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedUnit {
    /// Unit type name.
    pub type_name: String,
    /// Frames until construction or training completes; 0 if complete.
    #[serde(default)]
    pub remaining_frames: Frame,
    /// Frames until a completed producer finishes its current job.
    #[serde(default)]
    pub busy_frames: Frame,
    /// Attached add-on name.
    #[serde(default)]
    pub addon: Option<String>,
}

impl ObservedUnit {
    /// A completed, idle unit.
    #[must_use]
    pub fn completed(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            remaining_frames: 0,
            busy_frames: 0,
            addon: None,
        }
    }

    /// A unit completing in `remaining_frames`.
    #[must_use]
    pub fn in_progress(type_name: impl Into<String>, remaining_frames: Frame) -> Self {
        Self {
            remaining_frames,
            ..Self::completed(type_name)
        }
    }
}

/// What a research facility is working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResearchKind {
    /// A tech.
    Tech,
    /// An upgrade level.
    Upgrade,
}

/// Research in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedResearch {
    /// Tech or upgrade.
    pub kind: ResearchKind,
    /// Tech or upgrade name.
    pub name: String,
    /// Frames until it completes.
    pub remaining_frames: Frame,
    /// Level reached on completion (upgrades only).
    #[serde(default = "default_level")]
    pub level: u8,
}

const fn default_level() -> u8 {
    1
}

/// Everything the planner needs to know about the live game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Race played.
    pub race: Race,
    /// Current game frame.
    #[serde(default)]
    pub frame: Frame,
    /// Banked minerals.
    #[serde(default)]
    pub minerals: i32,
    /// Banked gas.
    #[serde(default)]
    pub gas: i32,
    /// Supply in use, half-units.
    #[serde(default)]
    pub supply_used: i32,
    /// Supply available from completed providers, half-units.
    #[serde(default)]
    pub supply_total: i32,
    /// Owned units.
    #[serde(default)]
    pub units: Vec<ObservedUnit>,
    /// Techs already known.
    #[serde(default)]
    pub techs: Vec<String>,
    /// Upgrade levels already reached.
    #[serde(default)]
    pub upgrades: BTreeMap<String, u8>,
    /// Research in progress.
    #[serde(default)]
    pub research: Vec<ObservedResearch>,
}

impl WorldState {
    /// Build a planning snapshot from a game observation.
    ///
    /// Units still in production keep the supply they provide pending until
    /// they complete; the observed supply figures are taken as is.
    ///
    /// # Errors
    ///
    /// [`PlanningError::UnknownType`] for names the tree does not know,
    /// [`PlanningError::DataParseError`] for units of another race.
    pub fn from_observation(tree: Arc<TechTree>, obs: &Observation) -> Result<Self> {
        let mut world = Self::new(Arc::clone(&tree), obs.race)?
            .at_frame(obs.frame)
            .with_resources(obs.minerals, obs.gas);

        for unit in &obs.units {
            let unit_type = tree.unit_by_name(&unit.type_name)?;
            if tree.unit(unit_type).race != obs.race {
                return Err(PlanningError::DataParseError {
                    source_name: "observation".to_string(),
                    message: format!(
                        "'{}' is not a {} unit",
                        unit.type_name,
                        obs.race.display_name()
                    ),
                });
            }
            let id = if unit.remaining_frames == 0 {
                world.spawn_completed(unit_type)
            } else {
                world.spawn_in_progress(unit_type, unit.remaining_frames)
            };
            if unit.busy_frames > 0 {
                let instance = world.instance_mut(id);
                instance.available_at = instance.available_at.max(obs.frame + unit.busy_frames);
            }
            if let Some(addon) = &unit.addon {
                world.set_addon(id, tree.unit_by_name(addon)?);
            }
        }

        for name in &obs.techs {
            world.set_tech(tree.tech_by_name(name)?, 0);
        }
        for (name, &level) in &obs.upgrades {
            world.set_upgrade(
                tree.upgrade_by_name(name)?,
                UpgradeState {
                    started_at: 0,
                    available_at: 0,
                    level,
                },
            );
        }

        for research in &obs.research {
            let completes = obs.frame + research.remaining_frames;
            let researcher = match research.kind {
                ResearchKind::Tech => {
                    let tech = tree.tech_by_name(&research.name)?;
                    world.set_tech(tech, completes);
                    tree.tech(tech).researcher
                }
                ResearchKind::Upgrade => {
                    let upgrade = tree.upgrade_by_name(&research.name)?;
                    let duration = tree.upgrade(upgrade).time_at(research.level);
                    world.set_upgrade(
                        upgrade,
                        UpgradeState {
                            started_at: completes.saturating_sub(duration),
                            available_at: completes,
                            level: research.level,
                        },
                    );
                    tree.upgrade(upgrade).researcher
                }
            };
            let frame = obs.frame;
            if let Some(id) = world.earliest_available(researcher, |u| u.available_at <= frame) {
                world.instance_mut(id).available_at = completes;
            }
        }

        world.supply_used = obs.supply_used;
        world.supply_total = obs.supply_total.min(MAX_SUPPLY);
        Ok(world)
    }
}

/// Kind of order handed to the production queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    /// Train a unit from a producer.
    Train,
    /// Construct a structure or add-on.
    Build,
    /// Research a tech.
    Research,
    /// Research an upgrade level.
    Upgrade,
}

/// A planned move, spelled for the external production queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionOrder {
    /// What to do.
    pub kind: OrderKind,
    /// Name of the unit, tech or upgrade.
    pub type_name: String,
    /// Upgrade level to reach.
    pub level: Option<u8>,
}

impl ProductionOrder {
    /// Translate `mv` as it would be issued from `world`.
    #[must_use]
    pub fn from_move(mv: Move, world: &WorldState) -> Self {
        let tree = world.tree();
        let type_name = mv.name(tree).to_string();
        match mv {
            Move::ProduceUnit(unit_type) => Self {
                kind: if tree.unit(unit_type).is_building() {
                    OrderKind::Build
                } else {
                    OrderKind::Train
                },
                type_name,
                level: None,
            },
            Move::ResearchTech(_) => Self {
                kind: OrderKind::Research,
                type_name,
                level: None,
            },
            Move::ApplyUpgrade(upgrade) => Self {
                kind: OrderKind::Upgrade,
                type_name,
                level: Some(world.upgrade_level(upgrade) + 1),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::standard::*;

    fn observation() -> Observation {
        Observation {
            race: Race::Terran,
            frame: 1000,
            minerals: 120,
            gas: 30,
            supply_used: 14,
            supply_total: 20,
            units: vec![
                ObservedUnit::completed("CommandCenter"),
                ObservedUnit::completed("SCV"),
                ObservedUnit::completed("SCV"),
                ObservedUnit::completed("SCV"),
                ObservedUnit::completed("SCV"),
                ObservedUnit::in_progress("SCV", 120),
                ObservedUnit::in_progress("SupplyDepot", 300),
                ObservedUnit {
                    addon: Some("MachineShop".to_string()),
                    ..ObservedUnit::completed("Factory")
                },
                ObservedUnit::completed("MachineShop"),
                ObservedUnit::completed("Academy"),
            ],
            techs: vec!["StimPacks".to_string()],
            upgrades: BTreeMap::new(),
            research: vec![ObservedResearch {
                kind: ResearchKind::Upgrade,
                name: "U238Shells".to_string(),
                remaining_frames: 500,
                level: 1,
            }],
        }
    }

    #[test]
    fn test_from_observation() {
        let world = WorldState::from_observation(TechTree::standard(), &observation()).unwrap();
        assert_eq!(world.frame(), 1000);
        assert_eq!(world.minerals(), 120);
        assert_eq!(world.supply_used(), 14);
        assert_eq!(world.supply_total(), 20);
        assert_eq!(world.count(SCV), 5);
        assert_eq!(world.completed_count(SCV), 4);
        assert_eq!(world.available_workers(), 4);
        assert_eq!(world.pending_supply(), 16);
        assert_eq!(world.next_supply_completion(), Some(1300));
        assert_eq!(world.tech_available_at(STIM_PACKS), Some(0));

        let shells = world.upgrade_state(U238_SHELLS).unwrap();
        assert_eq!(shells.available_at, 1500);
        assert_eq!(shells.level, 1);
        let academy = world.earliest_available(ACADEMY, |_| true).unwrap();
        assert_eq!(world.instance(academy).available_at, 1500);

        let factory = world.earliest_available(FACTORY, |_| true).unwrap();
        assert_eq!(world.instance(factory).addon, Some(MACHINE_SHOP));
    }

    #[test]
    fn test_busy_producer() {
        let mut obs = observation();
        obs.units.push(ObservedUnit {
            busy_frames: 200,
            ..ObservedUnit::completed("Barracks")
        });
        let world = WorldState::from_observation(TechTree::standard(), &obs).unwrap();
        let barracks = world.earliest_available(BARRACKS, |_| true).unwrap();
        assert_eq!(world.instance(barracks).available_at, 1200);
        assert_eq!(world.completed_count(BARRACKS), 1);
    }

    #[test]
    fn test_unknown_name() {
        let mut obs = observation();
        obs.units.push(ObservedUnit::completed("Battlecruiser"));
        let err = WorldState::from_observation(TechTree::standard(), &obs).unwrap_err();
        assert_eq!(err, PlanningError::UnknownType("Battlecruiser".to_string()));
    }

    #[test]
    fn test_foreign_unit() {
        let mut obs = observation();
        obs.units.push(ObservedUnit::completed("Zealot"));
        let err = WorldState::from_observation(TechTree::standard(), &obs).unwrap_err();
        assert!(matches!(err, PlanningError::DataParseError { .. }));
    }

    #[test]
    fn test_observation_from_ron() {
        let text = r#"(
            race: Zerg,
            minerals: 50,
            supply_used: 8,
            supply_total: 18,
            units: [
                (type_name: "Hatchery"),
                (type_name: "Drone"),
                (type_name: "Overlord", remaining_frames: 400),
            ],
        )"#;
        let obs: Observation = ron::from_str(text).unwrap();
        let world = WorldState::from_observation(TechTree::standard(), &obs).unwrap();
        assert_eq!(world.race(), Race::Zerg);
        assert_eq!(world.count(DRONE), 1);
        assert_eq!(world.pending_supply(), 16);
    }

    #[test]
    fn test_orders_from_moves() {
        let world = WorldState::from_observation(TechTree::standard(), &observation()).unwrap();
        assert_eq!(
            ProductionOrder::from_move(Move::ProduceUnit(MARINE), &world),
            ProductionOrder {
                kind: OrderKind::Train,
                type_name: "Marine".to_string(),
                level: None,
            }
        );
        assert_eq!(
            ProductionOrder::from_move(Move::ProduceUnit(BARRACKS), &world).kind,
            OrderKind::Build
        );
        assert_eq!(
            ProductionOrder::from_move(Move::ResearchTech(TANK_SIEGE_MODE), &world).kind,
            OrderKind::Research
        );
        let order = ProductionOrder::from_move(Move::ApplyUpgrade(TERRAN_INFANTRY_WEAPONS), &world);
        assert_eq!(order.kind, OrderKind::Upgrade);
        assert_eq!(order.level, Some(1));
    }
}
