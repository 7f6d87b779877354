//! Anytime tree search over build orders.
//!
//! Each [`Planner::step`] walks the tree from the root, applying the moves
//! on the way to a private copy of the snapshot, then prunes, expands and
//! rolls out, or scores a terminal node. The completion frame found is
//! backed up to the root. Between cycles the caller reads
//! [`Planner::best_move`], and relocates or resets the tree as the game
//! confirms or contradicts the plan.

mod config;
mod playout;
mod tree;

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub use config::PlannerConfig;
pub use playout::{BuildOrder, PlannedStep};
pub use tree::{Node, NodeId, SearchTree};

use crate::data::{TechTree, TechType, UnitType};
use crate::dependency::Requirements;
use crate::error::{PlanningError, Result};
use crate::goal::Goal;
use crate::moves::Move;
use crate::race::Race;
use crate::world::{Frame, WorldState};

/// Keeps the exploitation term finite when every child scores zero.
const SCORE_EPSILON: f64 = 1e-9;

/// What one search iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A leaf was expanded and one child rolled out to `frames`.
    Expanded {
        /// Completion frame of the rollout.
        frames: Frame,
    },
    /// The reached node already meets the goal and completes at `frames`.
    Terminal {
        /// Completion frame of the node.
        frames: Frame,
    },
    /// The reached node was detached.
    Pruned,
    /// The step failed and the tree was discarded.
    Reset,
}

/// Running counters, for logging and reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerStats {
    /// Search iterations run.
    pub iterations: u64,
    /// Nodes expanded.
    pub expansions: u64,
    /// Nodes detached by pruning.
    pub prunes: u64,
    /// Full resets, from errors or contradicting game events.
    pub resets: u64,
    /// Best completion frame found since the last restart.
    pub best_frame: Option<Frame>,
}

/// Anytime best-first planner for one goal.
#[derive(Debug, Clone)]
pub struct Planner {
    tech_tree: Arc<TechTree>,
    race: Race,
    goal: Goal,
    required: Vec<UnitType>,
    techs: Vec<TechType>,
    supply_provider: UnitType,
    config: PlannerConfig,
    rng: ChaCha8Rng,
    tree: SearchTree,
    best_found: Option<Frame>,
    stats: PlannerStats,
}

impl Planner {
    /// Create a planner for `goal`.
    ///
    /// The action space is the prerequisite closure of every goal unit,
    /// tech and upgrade, plus the supply provider. Techs that prerequisite
    /// units need are researched along the way.
    ///
    /// # Errors
    ///
    /// [`PlanningError::UnknownType`] if the tree has no role table for
    /// `race` or the goal holds an id the tree did not issue;
    /// [`PlanningError::InfeasibleAction`] if the goal names a type of
    /// another race.
    pub fn new(tech_tree: Arc<TechTree>, race: Race, goal: Goal, config: PlannerConfig) -> Result<Self> {
        let roles = tech_tree.race(race)?;

        for &unit_type in goal.units.keys() {
            let spec = tech_tree
                .get_unit(unit_type)
                .ok_or_else(|| PlanningError::UnknownType(format!("unit #{}", unit_type.0)))?;
            if spec.race != race {
                return Err(PlanningError::infeasible(&spec.name, "goal of another race"));
            }
        }
        for &tech in &goal.techs {
            let spec = tech_tree
                .get_tech(tech)
                .ok_or_else(|| PlanningError::UnknownType(format!("tech #{}", tech.0)))?;
            if spec.race != race {
                return Err(PlanningError::infeasible(&spec.name, "goal of another race"));
            }
        }
        for &upgrade in goal.upgrades.keys() {
            let spec = tech_tree
                .get_upgrade(upgrade)
                .ok_or_else(|| PlanningError::UnknownType(format!("upgrade #{}", upgrade.0)))?;
            if spec.race != race {
                return Err(PlanningError::infeasible(&spec.name, "goal of another race"));
            }
        }

        let mut requirements = Requirements::new();
        requirements.add_units(&tech_tree, goal.units.keys().copied());
        for &tech in &goal.techs {
            requirements.add_tech(&tech_tree, tech);
        }
        for (&upgrade, &level) in &goal.upgrades {
            requirements.add_upgrade(&tech_tree, upgrade, level);
        }
        requirements.add_units(&tech_tree, [roles.supply_provider]);

        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self {
            tech_tree,
            race,
            goal,
            required: requirements.units.into_iter().collect(),
            techs: requirements.techs.into_iter().collect(),
            supply_provider: roles.supply_provider,
            config,
            rng,
            tree: SearchTree::new(),
            best_found: None,
            stats: PlannerStats::default(),
        })
    }

    /// The search tree.
    #[must_use]
    pub const fn tree(&self) -> &SearchTree {
        &self.tree
    }

    /// Unit types the planner may produce.
    #[must_use]
    pub fn required_set(&self) -> &[UnitType] {
        &self.required
    }

    /// Techs the planner may research.
    #[must_use]
    pub fn required_techs(&self) -> &[TechType] {
        &self.techs
    }

    /// The goal.
    #[must_use]
    pub const fn goal(&self) -> &Goal {
        &self.goal
    }

    /// Race the planner plays.
    #[must_use]
    pub const fn race(&self) -> Race {
        self.race
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Counters.
    #[must_use]
    pub const fn stats(&self) -> PlannerStats {
        self.stats
    }

    /// Best completion frame found since the last restart.
    #[must_use]
    pub const fn best_found(&self) -> Option<Frame> {
        self.best_found
    }

    /// Run one iteration; on failure log it and reset the tree.
    pub fn step(&mut self, snapshot: &WorldState) -> StepOutcome {
        match self.try_step(snapshot) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(error = %err, "Planning step failed, resetting search tree");
                self.reset();
                StepOutcome::Reset
            }
        }
    }

    /// Run one iteration.
    ///
    /// # Errors
    ///
    /// Any engine error hit while replaying the selected path or rolling
    /// out. Nodes expanded before the failure stay in the tree.
    pub fn try_step(&mut self, snapshot: &WorldState) -> Result<StepOutcome> {
        self.stats.iterations += 1;
        let mut world = snapshot.clone();

        // Selection.
        let mut node = self.tree.root();
        while let Some(child) = self.select_child(node) {
            let mv = self
                .tree
                .node(child)
                .mv()
                .ok_or_else(|| PlanningError::SearchExhausted("child without a move".into()))?;
            mv.apply(&mut world)?;
            node = child;
        }

        // Pruning.
        let dead_end = self.tree.node(node).children().is_some_and(<[NodeId]>::is_empty);
        let finish = world.finish_frame();
        if dead_end || self.best_found.is_some_and(|best| finish > best) {
            let detached = self.tree.prune(node);
            self.stats.prunes += detached as u64;
            tracing::trace!(finish, detached, "Pruned node");
            return Ok(StepOutcome::Pruned);
        }

        if self.goal.is_met(&world) {
            let frames = world.finish();
            self.record(node, frames);
            return Ok(StepOutcome::Terminal { frames });
        }

        // Expansion.
        let moves = self.feasible_moves(&world);
        if moves.is_empty() {
            self.tree.mark_dead(node);
            let detached = self.tree.prune(node);
            self.stats.prunes += detached as u64;
            tracing::trace!(frame = world.frame(), "Dead end");
            return Ok(StepOutcome::Pruned);
        }
        self.tree.expand(node, &moves);
        self.stats.expansions += 1;
        tracing::trace!(frame = world.frame(), children = moves.len(), "Expanded node");

        // Simulation.
        let child = self
            .select_child(node)
            .ok_or_else(|| PlanningError::SearchExhausted("expanded node has no children".into()))?;
        if let Some(mv) = self.tree.node(child).mv() {
            mv.apply(&mut world)?;
        }
        let frames = self.rollout(&mut world)?;
        self.record(child, frames);
        Ok(StepOutcome::Expanded { frames })
    }

    /// Run the configured number of iterations against `snapshot` and
    /// return the best move found.
    pub fn run_cycle(&mut self, snapshot: &WorldState) -> Option<Move> {
        for _ in 0..self.config.iterations_per_cycle {
            self.step(snapshot);
        }
        let best = self.best_move();
        tracing::debug!(
            frame = snapshot.frame(),
            best_frame = ?self.best_found,
            nodes = self.tree.live_len(),
            iterations = self.stats.iterations,
            prunes = self.stats.prunes,
            resets = self.stats.resets,
            best_move = ?best.map(|mv| mv.name(&self.tech_tree).to_string()),
            "Planning cycle complete"
        );
        best
    }

    /// Root child with the lowest backed-up completion frame.
    #[must_use]
    pub fn best_move(&self) -> Option<Move> {
        let root = self.tree.node(self.tree.root());
        root.children()?
            .iter()
            .map(|&id| self.tree.node(id))
            .filter_map(|node| Some((node.best_frames_seen()?, node.mv()?)))
            .min_by_key(|&(frames, _)| frames)
            .map(|(_, mv)| mv)
    }

    /// Forget the best-found frame; the tree is kept.
    pub fn restart(&mut self) {
        self.best_found = None;
        self.stats.best_frame = None;
    }

    /// Forget the best-found frame and the whole tree.
    pub fn reset(&mut self) {
        self.restart();
        self.tree.clear();
        self.stats.resets += 1;
    }

    /// Re-root the tree at `node`, dropping everything off its subtree.
    ///
    /// The best-found frame is forgotten, since it was measured against
    /// the previous snapshot.
    pub fn relocate_to(&mut self, node: NodeId) {
        self.tree.reroot(node);
        self.restart();
        tracing::debug!(nodes = self.tree.live_len(), "Relocated search tree");
    }

    /// Re-root at the root child reached by `mv`. Returns whether such a
    /// child existed; if not, the tree is left untouched.
    pub fn relocate_to_move(&mut self, mv: Move) -> bool {
        let root = self.tree.node(self.tree.root());
        let target = root
            .children()
            .unwrap_or_default()
            .iter()
            .copied()
            .find(|&id| self.tree.node(id).mv() == Some(mv));
        match target {
            Some(id) => {
                self.relocate_to(id);
                true
            }
            None => false,
        }
    }

    fn record(&mut self, node: NodeId, frames: Frame) {
        self.tree.backup(node, frames);
        if self.best_found.map_or(true, |best| frames < best) {
            self.best_found = Some(frames);
            self.stats.best_frame = Some(frames);
        }
    }

    /// Child maximizing exploitation plus exploration plus jitter.
    fn select_child(&mut self, parent: NodeId) -> Option<NodeId> {
        let node = self.tree.node(parent);
        let children = node.children()?;
        let frames = |id: NodeId| f64::from(self.tree.node(id).best_frames_seen().unwrap_or(0));
        let max_frames = children.iter().map(|&c| frames(c)).fold(0.0, f64::max);
        let parent_visits = f64::from(node.visits());

        let mut best: Option<(f64, NodeId)> = None;
        for &child in children {
            let exploit = 1.0 - frames(child) / (max_frames + SCORE_EPSILON);
            let visits = f64::from(self.tree.node(child).visits());
            let explore = self.config.exploration * ((parent_visits + 1.0).ln() / (visits + 1.0)).sqrt();
            let jitter = self.rng.gen::<f64>() * self.config.jitter;
            let score = exploit + explore + jitter;
            if best.map_or(true, |(s, _)| score > s) {
                best = Some((score, child));
            }
        }
        best.map(|(_, id)| id)
    }

    /// One move per feasible required type, unresearched tech and missing
    /// upgrade level.
    fn feasible_moves(&self, world: &WorldState) -> Vec<Move> {
        let units = self
            .required
            .iter()
            .map(|&unit_type| Move::ProduceUnit(unit_type));
        let techs = self
            .techs
            .iter()
            .filter(|&&tech| world.tech_available_at(tech).is_none())
            .map(|&tech| Move::ResearchTech(tech));
        let upgrades = self
            .goal
            .upgrades
            .iter()
            .filter(|(&upgrade, &level)| world.upgrade_level(upgrade) < level)
            .map(|(&upgrade, _)| Move::ApplyUpgrade(upgrade));
        units
            .chain(techs)
            .chain(upgrades)
            .filter(|mv| mv.is_feasible(world))
            .collect()
    }

    /// Deterministic greedy completion; returns the completion frame.
    fn rollout(&self, world: &mut WorldState) -> Result<Frame> {
        let mut actions = 0;

        while !self.goal.is_met(world) {
            let mut progressed = false;

            for &unit_type in &self.required {
                if world.count(unit_type) == 0 && world.is_unit_feasible(unit_type) {
                    self.rollout_apply(world, Move::ProduceUnit(unit_type), &mut actions)?;
                    progressed = true;
                }
            }
            for &tech in &self.techs {
                if world.tech_available_at(tech).is_none() && world.is_tech_feasible(tech) {
                    self.rollout_apply(world, Move::ResearchTech(tech), &mut actions)?;
                    progressed = true;
                }
            }
            for (&upgrade, &level) in &self.goal.upgrades {
                if world.upgrade_level(upgrade) < level && world.is_upgrade_feasible(upgrade) {
                    self.rollout_apply(world, Move::ApplyUpgrade(upgrade), &mut actions)?;
                    progressed = true;
                }
            }
            let deficient: Vec<UnitType> = self.goal.deficient_units(world).collect();
            for unit_type in deficient {
                if world.is_unit_feasible(unit_type) {
                    self.rollout_apply(world, Move::ProduceUnit(unit_type), &mut actions)?;
                    progressed = true;
                }
            }

            if !progressed {
                let researching = self
                    .techs
                    .iter()
                    .filter_map(|&tech| world.tech_available_at(tech))
                    .filter(|&at| at > world.frame())
                    .min();
                if let Some(ready) = researching {
                    // Units gated on a tech wait for it rather than pile up supply.
                    world.advance_to_default_worker_layout(ready);
                } else if world.is_unit_feasible(self.supply_provider) {
                    self.rollout_apply(world, Move::ProduceUnit(self.supply_provider), &mut actions)?;
                } else {
                    // Nothing buildable; let in-flight work land.
                    let target = world.last_completion();
                    if target <= world.frame() {
                        return Err(PlanningError::SearchExhausted(
                            "rollout has no feasible action".into(),
                        ));
                    }
                    world.advance_to_default_worker_layout(target);
                }
            }
        }

        Ok(world.finish())
    }

    fn rollout_apply(&self, world: &mut WorldState, mv: Move, actions: &mut u32) -> Result<()> {
        *actions += 1;
        if *actions > self.config.max_rollout_actions {
            return Err(PlanningError::SearchExhausted(format!(
                "rollout exceeded {} actions",
                self.config.max_rollout_actions
            )));
        }
        mv.apply(world)
    }
}
