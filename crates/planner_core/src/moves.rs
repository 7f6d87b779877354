//! Atomic planned actions.

use serde::{Deserialize, Serialize};

use crate::data::{TechTree, TechType, UnitType, UpgradeType};
use crate::error::Result;
use crate::world::WorldState;

/// One action the planner can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Move {
    /// Produce a unit or structure.
    ProduceUnit(UnitType),
    /// Research the next level of an upgrade.
    ApplyUpgrade(UpgradeType),
    /// Research a tech.
    ResearchTech(TechType),
}

impl Move {
    /// Apply this move to `world` through the transition engine.
    ///
    /// Structures are routed to [`WorldState::produce_structure`], everything
    /// else that is a unit to [`WorldState::produce_unit`].
    ///
    /// # Errors
    ///
    /// Propagates the engine's [`PlanningError`](crate::PlanningError).
    pub fn apply(&self, world: &mut WorldState) -> Result<()> {
        match *self {
            Self::ProduceUnit(unit_type) => {
                let is_building = world
                    .tree()
                    .get_unit(unit_type)
                    .is_some_and(|spec| spec.is_building());
                if is_building {
                    world.produce_structure(unit_type)?;
                } else {
                    world.produce_unit(unit_type)?;
                }
            }
            Self::ApplyUpgrade(upgrade) => world.apply_upgrade(upgrade)?,
            Self::ResearchTech(tech) => world.research_tech(tech)?,
        }
        Ok(())
    }

    /// Whether the move is structurally possible in `world`.
    #[must_use]
    pub fn is_feasible(&self, world: &WorldState) -> bool {
        match *self {
            Self::ProduceUnit(unit_type) => world.is_unit_feasible(unit_type),
            Self::ApplyUpgrade(upgrade) => world.is_upgrade_feasible(upgrade),
            Self::ResearchTech(tech) => world.is_tech_feasible(tech),
        }
    }

    /// Name of the produced or researched type.
    #[must_use]
    pub fn name<'a>(&self, tree: &'a TechTree) -> &'a str {
        match *self {
            Self::ProduceUnit(unit_type) => &tree.unit(unit_type).name,
            Self::ApplyUpgrade(upgrade) => &tree.upgrade(upgrade).name,
            Self::ResearchTech(tech) => &tree.tech(tech).name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::standard::*;
    use crate::race::Race;

    #[test]
    fn test_apply_routes_structures() {
        let mut world = WorldState::new(TechTree::standard(), Race::Terran)
            .unwrap()
            .with_resources(250, 0)
            .with_units(COMMAND_CENTER, 1)
            .with_units(SCV, 4);
        Move::ProduceUnit(BARRACKS).apply(&mut world).unwrap();
        Move::ProduceUnit(SCV).apply(&mut world).unwrap();
        assert_eq!(world.count(BARRACKS), 1);
        assert_eq!(world.count(SCV), 5);
    }

    #[test]
    fn test_name_and_feasibility() {
        let tree = TechTree::standard();
        let world = WorldState::new(tree.clone(), Race::Terran)
            .unwrap()
            .with_units(COMMAND_CENTER, 1)
            .with_units(SCV, 4);
        assert_eq!(Move::ProduceUnit(MARINE).name(&tree), "Marine");
        assert_eq!(Move::ResearchTech(STIM_PACKS).name(&tree), "StimPacks");
        assert_eq!(Move::ApplyUpgrade(U238_SHELLS).name(&tree), "U238Shells");
        assert!(Move::ProduceUnit(BARRACKS).is_feasible(&world));
        assert!(!Move::ProduceUnit(MARINE).is_feasible(&world));
        assert!(!Move::ResearchTech(STIM_PACKS).is_feasible(&world));
    }
}
