//! Production transitions: structures, units, techs and upgrade levels.
//!
//! Each operation runs in the same order: check the structural
//! preconditions, gather the price, wait for supply and prerequisites, wait
//! for the producer to free up, then register the result and pay. Checks
//! come first so a failing operation leaves the world untouched.

use crate::data::{TechType, UnitSpec, UnitType, UpgradeType};
use crate::error::{PlanningError, Result};
use crate::race::BuilderPolicy;
use crate::world::{Frame, InstanceId, UpgradeState, WorldState, MAX_SUPPLY};

/// Frames a worker spends walking to a construction site.
pub const BUILDER_TRAVEL_FRAMES: Frame = 96;

impl WorldState {
    /// Construct a structure or add-on.
    ///
    /// # Errors
    ///
    /// [`PlanningError::InfeasibleAction`] if `unit_type` is not a structure
    /// of this race, or no builder, parent, prerequisite or resource path
    /// exists.
    pub fn produce_structure(&mut self, unit_type: UnitType) -> Result<InstanceId> {
        let tree = self.tree().clone();
        let spec = tree
            .get_unit(unit_type)
            .ok_or_else(|| PlanningError::UnknownType(format!("unit #{}", unit_type.0)))?;
        if !spec.is_building() {
            return Err(PlanningError::infeasible(&spec.name, "not a structure"));
        }
        self.check_unit_preconditions(spec)?;
        let Some(producer) = spec.producer else {
            return Err(PlanningError::infeasible(&spec.name, "no producer type"));
        };

        self.acquire_resources(spec.mineral_price, spec.gas_price)?;
        self.await_prerequisites(spec);

        let id = if spec.is_addon() {
            let parent = self
                .earliest_available(producer, |u| u.addon.is_none())
                .ok_or_else(|| PlanningError::infeasible(&spec.name, "no free parent"))?;
            self.wait_for(parent);
            let completes = self.frame + spec.build_time;
            self.instance_mut(parent).available_at = completes;
            self.set_addon(parent, unit_type);
            self.register(unit_type, self.frame, completes, spec.supply_provided)
        } else {
            let builder = self
                .earliest_available(producer, |_| true)
                .ok_or_else(|| PlanningError::infeasible(&spec.name, "no builder"))?;
            self.wait_for(builder);
            let completes = self.frame + spec.build_time + BUILDER_TRAVEL_FRAMES;
            match self.roles().builder_policy {
                BuilderPolicy::BusyUntilComplete => {
                    self.instance_mut(builder).available_at = completes;
                }
                BuilderPolicy::BusyWhileTravelling => {
                    self.instance_mut(builder).available_at = self.frame + BUILDER_TRAVEL_FRAMES;
                }
                BuilderPolicy::Consumed => {
                    let released = tree.unit(producer).supply_required;
                    self.retire(builder);
                    self.supply_used -= released;
                }
            }
            self.register(unit_type, self.frame, completes, spec.supply_provided)
        };

        self.pay(spec.mineral_price, spec.gas_price);
        tracing::trace!(frame = self.frame, unit = %spec.name, "Structure started");
        Ok(id)
    }

    /// Train a non-structure unit.
    ///
    /// # Errors
    ///
    /// [`PlanningError::InfeasibleAction`] if `unit_type` is a structure,
    /// belongs to another race, or its producer, add-on, prerequisites, tech,
    /// supply or resources cannot be had.
    pub fn produce_unit(&mut self, unit_type: UnitType) -> Result<InstanceId> {
        let tree = self.tree().clone();
        let spec = tree
            .get_unit(unit_type)
            .ok_or_else(|| PlanningError::UnknownType(format!("unit #{}", unit_type.0)))?;
        if spec.is_building() {
            return Err(PlanningError::infeasible(&spec.name, "is a structure"));
        }
        self.check_unit_preconditions(spec)?;
        let Some(producer) = spec.producer else {
            return Err(PlanningError::infeasible(&spec.name, "no producer type"));
        };
        let addon = spec.required_addon;
        let fits = |u: &crate::world::UnitInstance| addon.map_or(true, |a| u.addon == Some(a));
        if self.earliest_available(producer, fits).is_none() {
            return Err(PlanningError::infeasible(&spec.name, "no producer with add-on"));
        }
        if !self.has_supply_headroom(spec.supply_required) {
            return Err(PlanningError::infeasible(&spec.name, "supply blocked"));
        }

        self.acquire_resources(spec.mineral_price, spec.gas_price)?;
        while spec.supply_required > 0 && self.supply_used + spec.supply_required > self.supply_total {
            let Some(next) = self.next_supply_completion() else {
                return Err(PlanningError::infeasible(&spec.name, "supply blocked"));
            };
            self.advance_to_default_worker_layout(next);
        }
        self.await_prerequisites(spec);

        let producer_id = self
            .earliest_available(producer, fits)
            .ok_or_else(|| PlanningError::infeasible(&spec.name, "no producer"))?;
        self.wait_for(producer_id);
        let completes = self.frame + spec.build_time;
        self.instance_mut(producer_id).available_at = completes;
        let id = self.register(unit_type, self.frame, completes, spec.supply_provided);

        self.pay(spec.mineral_price, spec.gas_price);
        self.supply_used += spec.supply_required;
        tracing::trace!(frame = self.frame, unit = %spec.name, "Unit started");
        Ok(id)
    }

    /// Research the next level of an upgrade.
    ///
    /// Waits for a level already in progress to finish first.
    ///
    /// # Errors
    ///
    /// [`PlanningError::InfeasibleAction`] if the upgrade is maxed, belongs
    /// to another race, or its researcher, requirement or resources cannot be
    /// had.
    pub fn apply_upgrade(&mut self, upgrade: UpgradeType) -> Result<()> {
        let tree = self.tree().clone();
        let spec = tree.upgrade(upgrade);
        if spec.race != self.race() {
            return Err(PlanningError::infeasible(&spec.name, "wrong race"));
        }
        let state = self.upgrade_state(upgrade).copied().unwrap_or_default();
        if state.level >= spec.max_level {
            return Err(PlanningError::infeasible(&spec.name, "already at max level"));
        }
        let level = state.level + 1;
        if level > 1 {
            if let Some(req) = spec.higher_level_requires {
                if self.count(req) == 0 {
                    return Err(PlanningError::infeasible(
                        &spec.name,
                        format!("level {level} needs {}", tree.unit(req).name),
                    ));
                }
            }
        }
        if self.count(spec.researcher) == 0 {
            return Err(PlanningError::infeasible(&spec.name, "no researcher"));
        }

        let (minerals, gas) = (spec.mineral_price_at(level), spec.gas_price_at(level));
        self.acquire_resources(minerals, gas)?;
        if state.available_at > self.frame {
            self.advance_to_default_worker_layout(state.available_at);
        }
        if level > 1 {
            if let Some(ready) = spec.higher_level_requires.and_then(|r| self.first_completion(r)) {
                if ready > self.frame {
                    self.advance_to_default_worker_layout(ready);
                }
            }
        }

        let researcher = self
            .earliest_available(spec.researcher, |_| true)
            .ok_or_else(|| PlanningError::infeasible(&spec.name, "no researcher"))?;
        self.wait_for(researcher);
        let completes = self.frame + spec.time_at(level);
        self.instance_mut(researcher).available_at = completes;
        self.set_upgrade(
            upgrade,
            UpgradeState {
                started_at: self.frame,
                available_at: completes,
                level,
            },
        );

        self.pay(minerals, gas);
        tracing::trace!(frame = self.frame, upgrade = %spec.name, level, "Upgrade started");
        Ok(())
    }

    /// Research a tech.
    ///
    /// # Errors
    ///
    /// [`PlanningError::InfeasibleAction`] if the tech is already known or
    /// being researched, belongs to another race, or its researcher,
    /// requirement or resources cannot be had.
    pub fn research_tech(&mut self, tech: TechType) -> Result<()> {
        let tree = self.tree().clone();
        let spec = tree.tech(tech);
        if spec.race != self.race() {
            return Err(PlanningError::infeasible(&spec.name, "wrong race"));
        }
        if self.tech_available_at(tech).is_some() {
            return Err(PlanningError::infeasible(&spec.name, "already researched"));
        }
        if self.count(spec.researcher) == 0 {
            return Err(PlanningError::infeasible(&spec.name, "no researcher"));
        }
        if let Some(req) = spec.required_unit {
            if self.count(req) == 0 {
                return Err(PlanningError::infeasible(
                    &spec.name,
                    format!("needs {}", tree.unit(req).name),
                ));
            }
        }

        self.acquire_resources(spec.mineral_price, spec.gas_price)?;
        if let Some(ready) = spec.required_unit.and_then(|r| self.first_completion(r)) {
            if ready > self.frame {
                self.advance_to_default_worker_layout(ready);
            }
        }

        let researcher = self
            .earliest_available(spec.researcher, |_| true)
            .ok_or_else(|| PlanningError::infeasible(&spec.name, "no researcher"))?;
        self.wait_for(researcher);
        let completes = self.frame + spec.research_time;
        self.instance_mut(researcher).available_at = completes;
        self.set_tech(tech, completes);

        self.pay(spec.mineral_price, spec.gas_price);
        tracing::trace!(frame = self.frame, tech = %spec.name, "Research started");
        Ok(())
    }

    /// Race, producer and prerequisite checks shared by units and structures.
    fn check_unit_preconditions(&self, spec: &UnitSpec) -> Result<()> {
        if spec.race != self.race() {
            return Err(PlanningError::infeasible(&spec.name, "wrong race"));
        }
        let Some(producer) = spec.producer else {
            return Err(PlanningError::infeasible(&spec.name, "no producer type"));
        };
        if self.count(producer) == 0 {
            let name = &self.tree().unit(producer).name;
            return Err(PlanningError::infeasible(&spec.name, format!("no {name}")));
        }
        if spec.is_addon() && self.earliest_available(producer, |u| u.addon.is_none()).is_none() {
            return Err(PlanningError::infeasible(&spec.name, "no free parent"));
        }
        if let Some(&missing) = spec.required_units.iter().find(|&&req| self.count(req) == 0) {
            let name = &self.tree().unit(missing).name;
            return Err(PlanningError::infeasible(&spec.name, format!("needs {name}")));
        }
        if let Some(tech) = spec.required_tech {
            if !self.tech_available_at(tech).is_some_and(|at| at <= self.frame) {
                let name = &self.tree().tech(tech).name;
                return Err(PlanningError::infeasible(&spec.name, format!("needs {name}")));
            }
        }
        Ok(())
    }

    /// Advance until every prerequisite type has a completed instance.
    fn await_prerequisites(&mut self, spec: &UnitSpec) {
        let ready = spec
            .required_units
            .iter()
            .filter_map(|&req| self.first_completion(req))
            .max();
        if let Some(ready) = ready {
            if ready > self.frame {
                self.advance_to_default_worker_layout(ready);
            }
        }
    }

    /// Advance to the frame an instance frees up, always at least one step.
    fn wait_for(&mut self, id: InstanceId) {
        let target = self.instance(id).available_at;
        self.advance_to_default_worker_layout(target);
    }

    fn pay(&mut self, minerals: i32, gas: i32) {
        debug_assert!(self.minerals >= minerals && self.gas >= gas);
        self.minerals -= minerals;
        self.gas -= gas;
        debug_assert!(self.supply_total <= MAX_SUPPLY);
        #[cfg(feature = "debug-validation")]
        self.validate();
    }
}
