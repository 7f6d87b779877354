//! Tech-tree data: unit, tech and upgrade definitions.
//!
//! Two layers live here:
//! - RON-facing `*Data` structs that reference other types by name, and
//! - the resolved [`TechTree`] registry whose specs reference each other by
//!   numeric id.
//!
//! **Note:** This module contains no IO. Callers hand in RON text.

mod standard_tree;
mod tech_data;
mod tech_tree;
mod unit_data;

pub mod standard;

pub use tech_data::{RaceData, TechData, TechTreeData, UpgradeData};
pub use tech_tree::{RaceSpec, TechSpec, TechTree, UnitSpec, UpgradeSpec};
pub use unit_data::{UnitData, UnitTraits};

use serde::{Deserialize, Serialize};

/// Numeric identifier for a unit or structure type.
///
/// Issued by a [`TechTree`] in load order; only meaningful against the tree
/// that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitType(pub u16);

/// Numeric identifier for a one-off technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TechType(pub u16);

/// Numeric identifier for a levelled upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UpgradeType(pub u16);

impl UnitType {
    /// Index into the issuing tree's unit table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl TechType {
    /// Index into the issuing tree's tech table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl UpgradeType {
    /// Index into the issuing tree's upgrade table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}
