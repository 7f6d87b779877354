//! Offline playout of a complete build order.
//!
//! Drives the planner against its own simulation instead of a live game:
//! each cycle's best move is applied to a private world, and the tree is
//! relocated to the matching child, as a game would confirm it.

use serde::{Deserialize, Serialize};

use super::Planner;
use crate::error::Result;
use crate::moves::Move;
use crate::world::{Frame, WorldState};

/// One issued move and the frame at which the world had paid for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedStep {
    /// Frame after the move was applied.
    pub frame: Frame,
    /// The move.
    pub mv: Move,
}

/// Result of [`Planner::play_out`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOrder {
    /// Moves in issue order.
    pub steps: Vec<PlannedStep>,
    /// Whether the goal was reached within the move limit.
    pub goal_met: bool,
    /// Frame at which everything in flight completes, once the goal is met.
    pub completion_frame: Option<Frame>,
}

impl Planner {
    /// Plan from `snapshot` until the goal is met, the planner has no move
    /// to offer, or `max_moves` moves were issued.
    ///
    /// # Errors
    ///
    /// Errors from applying a chosen move to the simulated world.
    pub fn play_out(&mut self, snapshot: &WorldState, max_moves: usize) -> Result<BuildOrder> {
        let mut world = snapshot.clone();
        let mut steps = Vec::new();

        while !self.goal.is_met(&world) && steps.len() < max_moves {
            let Some(mv) = self.run_cycle(&world) else {
                tracing::debug!(frame = world.frame(), "Planner has no move to offer");
                break;
            };
            mv.apply(&mut world)?;
            steps.push(PlannedStep {
                frame: world.frame(),
                mv,
            });
            if !self.relocate_to_move(mv) {
                self.reset();
            }
        }

        let goal_met = self.goal.is_met(&world);
        let completion_frame = goal_met.then(|| world.finish());
        tracing::debug!(
            moves = steps.len(),
            goal_met,
            completion_frame = ?completion_frame,
            "Play-out finished"
        );
        Ok(BuildOrder {
            steps,
            goal_met,
            completion_frame,
        })
    }
}
