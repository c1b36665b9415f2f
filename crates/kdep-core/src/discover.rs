//! Discovery of unit directories, with optional include/exclude filtering.

use crate::error::{KdepError, Result};
use crate::paths::{absolute_clean, relative_to, to_node_id};
use crate::unit::unit_exists;
use regex::Regex;
use std::path::Path;
use walkdir::WalkDir;

/// Include/exclude patterns, matched against the full walked directory path.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryFilter {
    pub include: Option<Regex>,
    pub exclude: Option<Regex>,
}

impl DiscoveryFilter {
    pub fn from_patterns(include: Option<&str>, exclude: Option<&str>) -> Result<Self> {
        Ok(Self {
            include: include.map(compile).transpose()?,
            exclude: exclude.map(compile).transpose()?,
        })
    }

    /// A path is kept when it matches `include` (if set) and not `exclude`.
    pub fn accepts(&self, path: &str) -> bool {
        if let Some(include) = &self.include
            && !include.is_match(path)
        {
            return false;
        }
        if let Some(exclude) = &self.exclude
            && exclude.is_match(path)
        {
            return false;
        }
        true
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| KdepError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// List every directory under `root` holding a unit, relative to `root`
/// (`.` for `root` itself), in walk order.
pub fn list_unit_dirs(root: &Path, filter: &DiscoveryFilter) -> Result<Vec<String>> {
    let root = absolute_clean(root)?;
    let mut dirs = Vec::new();

    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_dir() || !unit_exists(entry.path())? {
            continue;
        }
        if !filter.accepts(&entry.path().to_string_lossy()) {
            tracing::debug!(dir = %entry.path().display(), "filtered out");
            continue;
        }
        dirs.push(to_node_id(&relative_to(&root, entry.path())));
    }

    Ok(dirs)
}
