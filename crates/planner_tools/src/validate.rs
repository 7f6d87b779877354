//! Data validation utilities.

use std::path::{Path, PathBuf};

use planner_core::data::TechTree;
use planner_core::race::Race;

use crate::error::{read_file, Result, ToolError};

/// What a valid tech-tree file declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSummary {
    /// File the tree came from.
    pub path: PathBuf,
    /// Unit and structure types.
    pub units: usize,
    /// Techs.
    pub techs: usize,
    /// Upgrades.
    pub upgrades: usize,
    /// Races with a complete role table.
    pub races: Vec<Race>,
}

/// Validate one RON tech-tree file.
///
/// # Errors
///
/// IO errors, syntax errors, unresolved names or inconsistent race roles.
pub fn validate_tech_tree(path: &Path) -> Result<TreeSummary> {
    let text = read_file(path)?;
    let tree = TechTree::from_ron_str(&path.display().to_string(), &text)?;
    let races = Race::ALL
        .into_iter()
        .filter(|&race| tree.race(race).is_ok())
        .collect();
    Ok(TreeSummary {
        path: path.to_path_buf(),
        units: tree.unit_count(),
        techs: tree.tech_count(),
        upgrades: tree.upgrade_count(),
        races,
    })
}

/// Validate every tech-tree file in a directory.
///
/// Files whose top-level value is a `TechTreeData` document are checked;
/// other RON files, such as scenarios, are skipped.
///
/// # Errors
///
/// Returns the first failure, in file-name order.
pub fn validate_data_directory(path: &Path) -> Result<Vec<TreeSummary>> {
    let entries = std::fs::read_dir(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    files.sort();

    let mut summaries = Vec::new();
    for file in files {
        let text = read_file(&file)?;
        if !is_tech_tree_document(&text) {
            tracing::debug!(file = %file.display(), "Skipping non tech-tree file");
            continue;
        }
        summaries.push(validate_tech_tree(&file)?);
    }
    Ok(summaries)
}

/// Validate a single file or every tree in a directory.
///
/// # Errors
///
/// As for [`validate_tech_tree`] and [`validate_data_directory`].
pub fn validate_path(path: &Path) -> Result<Vec<TreeSummary>> {
    if path.is_dir() {
        validate_data_directory(path)
    } else {
        validate_tech_tree(path).map(|summary| vec![summary])
    }
}

fn is_tech_tree_document(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("//"))
        .is_some_and(|line| line.starts_with("TechTreeData"))
}
