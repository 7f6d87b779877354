//! Error types for the planning core.

use thiserror::Error;

/// Result type alias using [`PlanningError`].
pub type Result<T> = std::result::Result<T, PlanningError>;

/// Top-level error type for the economic engine and the planner.
///
/// Engine operations never panic on impossible requests; they return
/// [`PlanningError::InfeasibleAction`] and leave the caller to discard the
/// branch. The planner treats [`PlanningError::SearchExhausted`] the same
/// way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanningError {
    /// No worker, producer or resource path exists for the requested action.
    #[error("Infeasible action {action}: {reason}")]
    InfeasibleAction {
        /// Name of the unit, tech or upgrade the action was for.
        action: String,
        /// What was missing.
        reason: String,
    },

    /// A lookup or rollout ran out of options during simulation.
    #[error("Search exhausted: {0}")]
    SearchExhausted(String),

    /// A type name did not resolve against the tech tree.
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// Tech tree or scenario text failed to parse or validate.
    #[error("Failed to parse data '{source_name}': {message}")]
    DataParseError {
        /// Name of the document that failed to parse.
        source_name: String,
        /// Error message.
        message: String,
    },
}

impl PlanningError {
    /// Build an [`PlanningError::InfeasibleAction`].
    pub fn infeasible(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InfeasibleAction {
            action: action.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error only invalidates the current search branch.
    ///
    /// Both variants raised during simulation are recovered from by
    /// resetting the planner.
    #[must_use]
    pub const fn is_branch_failure(&self) -> bool {
        matches!(
            self,
            Self::InfeasibleAction { .. } | Self::SearchExhausted(_)
        )
    }
}
