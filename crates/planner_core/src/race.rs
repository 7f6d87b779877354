//! Race definitions and identifiers.

use serde::{Deserialize, Serialize};

/// Playable race.
///
/// The race selects which unit types play the worker, supply-provider,
/// resource-depot and refinery roles, and how builders behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Race {
    /// Builders stay with the structure until it completes.
    Terran,
    /// Builders warp in the structure and walk away.
    Protoss,
    /// Builders turn into the structure.
    Zerg,
}

impl Race {
    /// All races, in declaration order.
    pub const ALL: [Self; 3] = [Self::Terran, Self::Protoss, Self::Zerg];

    /// Get the display name for this race.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Terran => "Terran",
            Self::Protoss => "Protoss",
            Self::Zerg => "Zerg",
        }
    }

    /// What happens to a worker that starts a structure, unless the tech
    /// tree's role table says otherwise.
    #[must_use]
    pub const fn default_builder_policy(&self) -> BuilderPolicy {
        match self {
            Self::Terran => BuilderPolicy::BusyUntilComplete,
            Self::Protoss => BuilderPolicy::BusyWhileTravelling,
            Self::Zerg => BuilderPolicy::Consumed,
        }
    }
}

/// Fate of the worker assigned to construct a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuilderPolicy {
    /// Worker is unavailable until the structure completes.
    BusyUntilComplete,
    /// Worker is unavailable only while walking to the site.
    BusyWhileTravelling,
    /// Worker is removed from the workforce for good.
    Consumed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builder_policies() {
        assert_eq!(
            Race::Terran.default_builder_policy(),
            BuilderPolicy::BusyUntilComplete
        );
        assert_eq!(
            Race::Protoss.default_builder_policy(),
            BuilderPolicy::BusyWhileTravelling
        );
        assert_eq!(Race::Zerg.default_builder_policy(), BuilderPolicy::Consumed);
    }

    #[test]
    fn test_race_ron_round_trip_name() {
        let race: Race = ron::from_str("Zerg").unwrap();
        assert_eq!(race, Race::Zerg);
        assert_eq!(race.display_name(), "Zerg");
    }
}
