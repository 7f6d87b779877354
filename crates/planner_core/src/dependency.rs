//! Prerequisite closure of a set of goals.

use std::collections::BTreeSet;

use crate::data::{TechTree, TechType, UnitType, UpgradeType};
use crate::race::Race;

/// Everything that must exist, or be researched, before a set of goals
/// becomes reachable.
///
/// Built incrementally: each `add_*` call extends the closure with a new
/// root and its transitive prerequisites. Ids the tree did not issue are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    /// Unit and structure types, including goal units.
    pub units: BTreeSet<UnitType>,
    /// Techs, including goal techs and techs prerequisite units need.
    pub techs: BTreeSet<TechType>,
}

enum Need {
    Unit(UnitType),
    Tech(TechType),
}

impl Requirements {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Close over `units`.
    pub fn add_units(&mut self, tree: &TechTree, units: impl IntoIterator<Item = UnitType>) {
        let worklist = units.into_iter().map(Need::Unit).collect();
        self.resolve(tree, worklist);
    }

    /// Close over `tech`, its researcher and requirement.
    pub fn add_tech(&mut self, tree: &TechTree, tech: TechType) {
        self.resolve(tree, vec![Need::Tech(tech)]);
    }

    /// Close over what researching `upgrade` up to `level` needs.
    pub fn add_upgrade(&mut self, tree: &TechTree, upgrade: UpgradeType, level: u8) {
        let Some(spec) = tree.get_upgrade(upgrade) else {
            return;
        };
        let mut worklist = vec![Need::Unit(spec.researcher)];
        if level > 1 {
            worklist.extend(spec.higher_level_requires.map(Need::Unit));
        }
        if (1..=level.max(1)).any(|l| spec.gas_price_at(l) > 0) {
            worklist.extend(refinery_of(tree, spec.race).map(Need::Unit));
        }
        self.resolve(tree, worklist);
    }

    /// Iterative worklist; each unit and tech is expanded once, so cyclic
    /// prerequisite graphs terminate.
    fn resolve(&mut self, tree: &TechTree, mut worklist: Vec<Need>) {
        while let Some(need) = worklist.pop() {
            match need {
                Need::Unit(unit_type) => {
                    let Some(spec) = tree.get_unit(unit_type) else {
                        continue;
                    };
                    if !self.units.insert(unit_type) {
                        continue;
                    }
                    worklist.extend(spec.producer.map(Need::Unit));
                    worklist.extend(spec.required_units.iter().copied().map(Need::Unit));
                    worklist.extend(spec.required_addon.map(Need::Unit));
                    worklist.extend(spec.required_tech.map(Need::Tech));
                    if spec.gas_price > 0 {
                        worklist.extend(refinery_of(tree, spec.race).map(Need::Unit));
                    }
                }
                Need::Tech(tech) => {
                    let Some(spec) = tree.get_tech(tech) else {
                        continue;
                    };
                    if !self.techs.insert(tech) {
                        continue;
                    }
                    worklist.push(Need::Unit(spec.researcher));
                    worklist.extend(spec.required_unit.map(Need::Unit));
                    if spec.gas_price > 0 {
                        worklist.extend(refinery_of(tree, spec.race).map(Need::Unit));
                    }
                }
            }
        }
    }
}

/// Every unit type that must exist for `goals` to become reachable,
/// including the goals themselves.
///
/// Follows producers, prerequisite units, required add-ons and the
/// researchers of required techs, and adds the race's refinery for any type
/// with a gas price.
#[must_use]
pub fn closure(tree: &TechTree, goals: impl IntoIterator<Item = UnitType>) -> BTreeSet<UnitType> {
    let mut requirements = Requirements::new();
    requirements.add_units(tree, goals);
    requirements.units
}

/// Unit types needed to research `tech`, closed over their prerequisites.
#[must_use]
pub fn tech_closure(tree: &TechTree, tech: TechType) -> BTreeSet<UnitType> {
    let mut requirements = Requirements::new();
    requirements.add_tech(tree, tech);
    requirements.units
}

/// Unit types needed to research `upgrade` up to `level`, closed over their
/// prerequisites.
#[must_use]
pub fn upgrade_closure(tree: &TechTree, upgrade: UpgradeType, level: u8) -> BTreeSet<UnitType> {
    let mut requirements = Requirements::new();
    requirements.add_upgrade(tree, upgrade, level);
    requirements.units
}

fn refinery_of(tree: &TechTree, race: Race) -> Option<UnitType> {
    tree.race(race).ok().map(|roles| roles.refinery)
}
