//! Unit data structures for data-driven unit definitions.

use serde::{Deserialize, Serialize};

use crate::race::Race;

/// Bitflags for the economic roles a unit type can play.
///
/// Computed from RON `tags` at load time.
///
/// # Example
///
/// ```
/// use planner_core::data::UnitTraits;
///
/// let traits = UnitTraits::BUILDING.union(UnitTraits::REFINERY);
/// assert!(traits.contains(UnitTraits::REFINERY));
/// assert!(!traits.contains(UnitTraits::WORKER));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct UnitTraits(u8);

impl UnitTraits {
    /// Structure placed by a worker (or attached as an add-on).
    pub const BUILDING: Self = Self(1 << 0);
    /// Structure attached to a parent structure.
    pub const ADDON: Self = Self(1 << 1);
    /// Gathers resources and constructs structures.
    pub const WORKER: Self = Self(1 << 2);
    /// Enables gas gathering.
    pub const REFINERY: Self = Self(1 << 3);
    /// Main base that workers return cargo to.
    pub const RESOURCE_DEPOT: Self = Self(1 << 4);

    /// Empty trait set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Check if all flags in `other` are set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Union of flags.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Build traits from RON tags. Unknown tags are returned as errors.
    pub fn from_tags(tags: &[String]) -> Result<Self, String> {
        let mut traits = Self::empty();
        for tag in tags {
            let flag = match tag.as_str() {
                "building" => Self::BUILDING,
                "addon" => Self::ADDON.union(Self::BUILDING),
                "worker" => Self::WORKER,
                "refinery" => Self::REFINERY.union(Self::BUILDING),
                "resource_depot" => Self::RESOURCE_DEPOT.union(Self::BUILDING),
                other => return Err(other.to_string()),
            };
            traits = traits.union(flag);
        }
        Ok(traits)
    }
}

/// Data-driven unit definition.
///
/// References other types by name; resolved into a
/// [`UnitSpec`](super::UnitSpec) when the tree is built.
///
/// # Example RON
///
/// ```ron
/// UnitData(
///     name: "Marine",
///     race: Terran,
///     minerals: 50,
///     build_time: 360,
///     supply_required: 2,
///     producer: Some("Barracks"),
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitData {
    /// Unique name, used for cross references.
    pub name: String,

    /// Race that can build this type.
    pub race: Race,

    /// Mineral price.
    #[serde(default)]
    pub minerals: i32,

    /// Gas price.
    #[serde(default)]
    pub gas: i32,

    /// Build time in frames.
    pub build_time: u32,

    /// Supply consumed (half-units).
    #[serde(default)]
    pub supply_required: i32,

    /// Supply provided once complete (half-units).
    #[serde(default)]
    pub supply_provided: i32,

    /// Role tags: `building`, `addon`, `worker`, `refinery`, `resource_depot`.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Type that produces this one. `None` only for types that cannot be
    /// built, such as a starting structure with no builder.
    #[serde(default)]
    pub producer: Option<String>,

    /// Unit types that must exist before this one can be started.
    #[serde(default)]
    pub requires: Vec<String>,

    /// Tech that must be researched first.
    #[serde(default)]
    pub required_tech: Option<String>,

    /// Add-on the producer must carry.
    #[serde(default)]
    pub required_addon: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traits_from_tags() {
        let traits = UnitTraits::from_tags(&["addon".to_string()]).unwrap();
        assert!(traits.contains(UnitTraits::ADDON));
        assert!(traits.contains(UnitTraits::BUILDING));
        assert!(!traits.contains(UnitTraits::WORKER));

        let err = UnitTraits::from_tags(&["flying".to_string()]).unwrap_err();
        assert_eq!(err, "flying");
    }

    #[test]
    fn test_unit_data_defaults() {
        let data: UnitData = ron::from_str(
            r#"UnitData(name: "Zealot", race: Protoss, minerals: 100, build_time: 600, supply_required: 4, producer: Some("Gateway"))"#,
        )
        .unwrap();
        assert_eq!(data.gas, 0);
        assert_eq!(data.supply_provided, 0);
        assert!(data.tags.is_empty());
        assert!(data.requires.is_empty());
        assert_eq!(data.producer.as_deref(), Some("Gateway"));
    }
}
