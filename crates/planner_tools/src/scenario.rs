//! Scenario files: an observed position, a goal and planner settings.
//!
//! # Example RON
//!
//! ```ron
//! Scenario(
//!     observation: (
//!         race: Terran,
//!         minerals: 50,
//!         supply_used: 8,
//!         supply_total: 20,
//!         units: [(type_name: "CommandCenter"), (type_name: "SCV")],
//!     ),
//!     goal: (units: {"Marine": 4}),
//!     config: (seed: 7),
//! )
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use planner_core::data::TechTree;
use planner_core::goal::GoalByName;
use planner_core::planner::PlannerConfig;
use planner_core::snapshot::Observation;
use planner_core::PlanningError;

use crate::error::{read_file, Result};

/// A planning problem as written on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Starting position.
    pub observation: Observation,
    /// What to build.
    pub goal: GoalByName,
    /// Search settings.
    #[serde(default)]
    pub config: PlannerConfig,
    /// Custom tech tree, relative to the scenario file. The built-in tree
    /// is used when absent.
    #[serde(default)]
    pub tech_tree: Option<PathBuf>,
}

impl Scenario {
    /// Parse a RON scenario.
    ///
    /// # Errors
    ///
    /// [`PlanningError::DataParseError`] on malformed input.
    pub fn from_ron_str(source_name: &str, text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| {
            PlanningError::DataParseError {
                source_name: source_name.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Read and parse a scenario file.
    ///
    /// # Errors
    ///
    /// IO errors, or parse errors as for [`Scenario::from_ron_str`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = read_file(path)?;
        Self::from_ron_str(&path.display().to_string(), &text)
    }

    /// Resolve the tech tree, reading a custom one relative to `base_dir`.
    ///
    /// # Errors
    ///
    /// IO errors, or parse and validation errors of the custom tree.
    pub fn resolve_tech_tree(&self, base_dir: &Path) -> Result<Arc<TechTree>> {
        let Some(relative) = &self.tech_tree else {
            return Ok(TechTree::standard());
        };
        let path = base_dir.join(relative);
        let text = read_file(&path)?;
        let tree = TechTree::from_ron_str(&path.display().to_string(), &text)?;
        tracing::debug!(path = %path.display(), units = tree.unit_count(), "Loaded custom tech tree");
        Ok(Arc::new(tree))
    }
}
