//! Structural preconditions for actions.
//!
//! Feasibility ignores timing: an action is feasible when every producer,
//! prerequisite and resource path it needs exists in the branch, even if it
//! is still under construction. The planner only expands feasible actions,
//! and the engine raises [`InfeasibleAction`] for the rest.
//!
//! [`InfeasibleAction`]: crate::error::PlanningError::InfeasibleAction

use crate::data::{TechType, UnitType, UpgradeType};
use crate::world::{WorldState, MAX_SUPPLY};

impl WorldState {
    /// Whether producing `unit_type` is structurally possible.
    #[must_use]
    pub fn is_unit_feasible(&self, unit_type: UnitType) -> bool {
        let tree = self.tree();
        let Some(spec) = tree.get_unit(unit_type) else {
            return false;
        };
        if spec.race != self.race() {
            return false;
        }
        let Some(producer) = spec.producer else {
            return false;
        };
        if self.count(producer) == 0 {
            return false;
        }
        if spec.required_units.iter().any(|&req| self.count(req) == 0) {
            return false;
        }
        if let Some(tech) = spec.required_tech {
            if !self.tech_available_at(tech).is_some_and(|at| at <= self.frame()) {
                return false;
            }
        }
        if !self.has_supply_headroom(spec.supply_required) {
            return false;
        }
        if !self.can_pay(spec.mineral_price, spec.gas_price) {
            return false;
        }
        if spec.is_addon() {
            return self
                .earliest_available(producer, |u| u.addon.is_none())
                .is_some();
        }
        if let Some(addon) = spec.required_addon {
            return self
                .earliest_available(producer, |u| u.addon == Some(addon))
                .is_some();
        }
        true
    }

    /// Whether researching `tech` is structurally possible.
    #[must_use]
    pub fn is_tech_feasible(&self, tech: TechType) -> bool {
        let spec = self.tree().tech(tech);
        spec.race == self.race()
            && self.tech_available_at(tech).is_none()
            && self.count(spec.researcher) > 0
            && spec.required_unit.map_or(true, |req| self.count(req) > 0)
            && self.can_pay(spec.mineral_price, spec.gas_price)
    }

    /// Whether researching the next level of `upgrade` is structurally
    /// possible.
    #[must_use]
    pub fn is_upgrade_feasible(&self, upgrade: UpgradeType) -> bool {
        let spec = self.tree().upgrade(upgrade);
        if spec.race != self.race() {
            return false;
        }
        let state = self.upgrade_state(upgrade).copied().unwrap_or_default();
        if state.level >= spec.max_level || state.available_at > self.frame() {
            return false;
        }
        let level = state.level + 1;
        if level > 1 {
            if let Some(req) = spec.higher_level_requires {
                if self.count(req) == 0 {
                    return false;
                }
            }
        }
        self.count(spec.researcher) > 0
            && self.can_pay(spec.mineral_price_at(level), spec.gas_price_at(level))
    }

    /// Whether `required` supply fits under the current and in-flight total.
    #[must_use]
    pub fn has_supply_headroom(&self, required: i32) -> bool {
        if required <= 0 {
            return true;
        }
        let reachable = (self.supply_total() + self.pending_supply()).min(MAX_SUPPLY);
        self.supply_used() + required <= reachable
    }

    /// Whether a price is banked or can be gathered.
    fn can_pay(&self, minerals: i32, gas: i32) -> bool {
        let roles = self.roles();
        let minerals_ok = minerals <= self.minerals() || self.count(roles.worker) > 0;
        let gas_ok = gas <= self.gas()
            || (self.count(roles.refinery) > 0 && self.count(roles.worker) > 0);
        minerals_ok && gas_ok
    }
}
