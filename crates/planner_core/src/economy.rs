//! Resource gathering and the passage of simulated time.
//!
//! Gathering is modelled in discrete gather cycles: `n` workers on a
//! resource complete one trip's worth of income every `ceil(trip / n)`
//! frames, and time only ever advances by whole cycles of the fastest
//! active resource. A requested delta is therefore a lower bound; the
//! engine may overshoot it by up to one cycle.

use crate::error::{PlanningError, Result};
use crate::math::{ceil_div, income};
use crate::world::{Frame, WorldState};

/// Minerals returned per mining trip.
pub const MINERALS_PER_TRIP: i32 = 8;
/// Frames one mineral trip takes.
pub const MINERAL_TRIP_FRAMES: u32 = 176;
/// Gas returned per extraction trip.
pub const GAS_PER_TRIP: i32 = 8;
/// Frames one gas trip takes.
pub const GAS_TRIP_FRAMES: u32 = 110;
/// Gatherers a completed refinery can hold.
pub const GATHERERS_PER_REFINERY: u32 = 3;
/// Default layout: one gas gatherer for this many available workers.
pub const WORKERS_PER_GAS_GATHERER: u32 = 4;
/// Upper bound on split-and-advance iterations in a single acquisition.
const MAX_GATHER_STEPS: u32 = 10_000;

/// Frames for one gather cycle with `workers` on a resource.
fn gather_cycle(workers: u32, trip_frames: u32) -> Option<u64> {
    (workers > 0).then(|| ceil_div(u64::from(trip_frames), u64::from(workers)))
}

/// Worker-frames needed to gather `missing` of a resource.
fn worker_frames(missing: i32, per_trip: i32, trip_frames: u32) -> u64 {
    if missing <= 0 {
        return 0;
    }
    ceil_div(
        u64::from(missing.unsigned_abs()) * u64::from(trip_frames),
        u64::from(per_trip.unsigned_abs()),
    )
}

/// Split available workers between minerals and gas in proportion to the
/// remaining worker-frames each resource needs.
///
/// Gas gets at least one gatherer while gas is missing and a slot exists,
/// minerals keep at least one while minerals are missing and more than one
/// worker is free. Workers not needed on gas mine minerals.
pub(crate) fn split_gatherers(
    available: u32,
    mineral_need: u64,
    gas_need: u64,
    gas_slots: u32,
) -> (u32, u32) {
    let cap = gas_slots.min(available);
    if gas_need == 0 || cap == 0 {
        return (available, 0);
    }
    if mineral_need == 0 {
        return (available - cap, cap);
    }
    let total = mineral_need.saturating_add(gas_need);
    let share = (u128::from(available) * u128::from(gas_need) + u128::from(total / 2))
        / u128::from(total);
    let mut gas = u32::try_from(share).unwrap_or(u32::MAX).clamp(1, cap);
    if gas == available && available > 1 {
        gas -= 1;
    }
    (available - gas, gas)
}

impl WorldState {
    /// Advance time by at least `delta` frames with the given gatherers.
    ///
    /// The step is rounded up to a whole number of the shortest active
    /// gather cycle, and is at least one cycle long whenever anyone gathers.
    /// With no gatherers the step is exactly `delta`. Supply providers that
    /// complete within the step are folded into the supply total.
    pub fn advance_time(&mut self, delta: Frame, mineral_workers: u32, gas_workers: u32) {
        let cycle = [
            gather_cycle(mineral_workers, MINERAL_TRIP_FRAMES),
            gather_cycle(gas_workers, GAS_TRIP_FRAMES),
        ]
        .into_iter()
        .flatten()
        .min();
        let step = match cycle {
            Some(cycle) => {
                let cycles = ceil_div(u64::from(delta.max(1)), cycle);
                Frame::try_from(cycles * cycle).unwrap_or(Frame::MAX)
            }
            None => delta,
        };
        let step = step.min(Frame::MAX - self.frame);

        self.minerals += income(mineral_workers, step, MINERALS_PER_TRIP, MINERAL_TRIP_FRAMES);
        self.gas += income(gas_workers, step, GAS_PER_TRIP, GAS_TRIP_FRAMES);
        self.frame += step;
        self.fold_supply();
    }

    /// Advance time until the bank holds at least `minerals` and `gas`.
    ///
    /// # Errors
    ///
    /// [`PlanningError::InfeasibleAction`] if a missing resource has no
    /// gatherer or no refinery to come from.
    pub fn acquire_resources(&mut self, minerals: i32, gas: i32) -> Result<()> {
        let roles = *self.roles();
        let action = || format!("{minerals} minerals, {gas} gas");

        for _ in 0..MAX_GATHER_STEPS {
            let missing_minerals = minerals - self.minerals;
            let missing_gas = gas - self.gas;
            if missing_minerals <= 0 && missing_gas <= 0 {
                return Ok(());
            }
            if self.count(roles.worker) == 0 {
                return Err(PlanningError::infeasible(action(), "no workers"));
            }
            if missing_gas > 0 && self.count(roles.refinery) == 0 {
                return Err(PlanningError::infeasible(action(), "no refinery"));
            }

            let available = self.available_workers();
            if available == 0 {
                let Some(next) = self.next_worker_free() else {
                    return Err(PlanningError::infeasible(action(), "no worker becomes free"));
                };
                self.advance_time(next - self.frame, 0, 0);
                continue;
            }

            let mineral_need = worker_frames(missing_minerals, MINERALS_PER_TRIP, MINERAL_TRIP_FRAMES);
            let gas_need = worker_frames(missing_gas, GAS_PER_TRIP, GAS_TRIP_FRAMES);
            let gas_slots = self.completed_refineries() * GATHERERS_PER_REFINERY;
            let (mineral_workers, gas_workers) =
                split_gatherers(available, mineral_need, gas_need, gas_slots);

            let mut delta = u64::MAX;
            if mineral_need > 0 && mineral_workers > 0 {
                delta = delta.min(ceil_div(mineral_need, u64::from(mineral_workers)));
            }
            if gas_need > 0 && gas_workers > 0 {
                delta = delta.min(ceil_div(gas_need, u64::from(gas_workers)));
            }
            if let Some(next) = self.next_worker_free() {
                delta = delta.min(u64::from(next - self.frame));
            }
            if gas_need > 0 {
                if let Some(next) = self.next_refinery_completion() {
                    delta = delta.min(u64::from(next - self.frame));
                }
            }
            if delta == u64::MAX {
                return Err(PlanningError::infeasible(action(), "no income"));
            }

            tracing::trace!(
                frame = self.frame,
                delta,
                mineral_workers,
                gas_workers,
                "Gathering"
            );
            self.advance_time(
                Frame::try_from(delta).unwrap_or(Frame::MAX),
                mineral_workers,
                gas_workers,
            );
        }

        Err(PlanningError::SearchExhausted(format!(
            "gathering {} did not converge",
            action()
        )))
    }

    /// Advance time with the default worker layout until `target` is reached.
    ///
    /// The layout puts one gas gatherer on every [`WORKERS_PER_GAS_GATHERER`]
    /// available workers, capped by refinery capacity, and is re-derived
    /// whenever a worker or refinery frees up. At least one step is always
    /// taken, so a target already in the past still costs one gather cycle.
    pub fn advance_to_default_worker_layout(&mut self, target: Frame) {
        loop {
            let available = self.available_workers();
            let gas_workers = (available / WORKERS_PER_GAS_GATHERER)
                .min(self.completed_refineries() * GATHERERS_PER_REFINERY);
            let mineral_workers = available - gas_workers;

            let mut delta = target.saturating_sub(self.frame);
            for next in [self.next_worker_free(), self.next_refinery_completion()]
                .into_iter()
                .flatten()
            {
                delta = delta.min(next - self.frame);
            }

            let before = self.frame;
            self.advance_time(delta, mineral_workers, gas_workers);
            if self.frame >= target || (self.frame == before && delta == 0) {
                break;
            }
        }
    }

    /// Advance time until everything in flight has completed; returns the
    /// resulting frame.
    pub fn finish(&mut self) -> Frame {
        let target = self.last_completion();
        self.advance_to_default_worker_layout(target);
        self.frame
    }

    /// Frame [`finish`](Self::finish) would reach, leaving `self` untouched.
    #[must_use]
    pub fn finish_frame(&self) -> Frame {
        self.clone().finish()
    }
}
