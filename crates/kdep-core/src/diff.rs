//! Rendered-output diffing across two checkouts of the same tree.

use crate::discover::{DiscoveryFilter, list_unit_dirs};
use crate::error::Result;
use crate::render::Renderer;
use crate::unit::ensure_unit;
use serde::Serialize;
use similar::TextDiff;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Produces a textual difference between two rendered documents.
pub trait Differ {
    /// Returns an empty string when the documents are identical.
    fn diff(&self, base: &str, target: &str) -> String;
}

/// Unified diff over lines.
#[derive(Debug, Clone)]
pub struct UnifiedDiffer {
    pub context_lines: usize,
}

impl Default for UnifiedDiffer {
    fn default() -> Self {
        Self { context_lines: 3 }
    }
}

impl Differ for UnifiedDiffer {
    fn diff(&self, base: &str, target: &str) -> String {
        if base == target {
            return String::new();
        }
        TextDiff::from_lines(base, target)
            .unified_diff()
            .context_radius(self.context_lines)
            .header("base", "target")
            .to_string()
    }
}

/// Outcome for one unit directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DiffResult {
    Unchanged,
    Changed { diff: String },
    Failed { kind: String, message: String },
}

/// Per-directory results, ordered by directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiffMap {
    pub results: BTreeMap<String, DiffResult>,
}

impl DiffMap {
    pub fn changed_dirs(&self) -> Vec<&str> {
        self.dirs_where(|r| matches!(r, DiffResult::Changed { .. }))
    }

    pub fn failed_dirs(&self) -> Vec<&str> {
        self.dirs_where(|r| matches!(r, DiffResult::Failed { .. }))
    }

    fn dirs_where(&self, pred: impl Fn(&DiffResult) -> bool) -> Vec<&str> {
        self.results
            .iter()
            .filter(|(_, r)| pred(r))
            .map(|(dir, _)| dir.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    pub filter: DiscoveryFilter,
}

/// Render and diff every unit directory found in either `base` or `target`.
///
/// A directory present on only one side gets an empty unit bootstrapped on the
/// other, so it diffs against empty output. Per-directory failures are
/// recorded in the map; only discovery failures abort.
pub fn diff_trees(
    base: &Path,
    target: &Path,
    opts: &DiffOptions,
    renderer: &dyn Renderer,
    differ: &dyn Differ,
) -> Result<DiffMap> {
    tracing::info!(base = %base.display(), target = %target.display(), "starting diff");
    let base_dirs = list_unit_dirs(base, &opts.filter)?;
    tracing::debug!(?base_dirs, "base unit directories");
    let target_dirs = list_unit_dirs(target, &opts.filter)?;
    tracing::debug!(?target_dirs, "target unit directories");

    let dirs: BTreeSet<String> = base_dirs.into_iter().chain(target_dirs).collect();

    let mut map = DiffMap::default();
    for dir in dirs {
        let result = match diff_dir(&base.join(&dir), &target.join(&dir), renderer, differ) {
            Ok(diff) if diff.is_empty() => DiffResult::Unchanged,
            Ok(diff) => DiffResult::Changed { diff },
            Err(e) => {
                tracing::warn!(dir = %dir, error = %e, "diff failed");
                DiffResult::Failed {
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                }
            }
        };
        map.results.insert(dir, result);
    }

    Ok(map)
}

fn diff_dir(
    base_dir: &Path,
    target_dir: &Path,
    renderer: &dyn Renderer,
    differ: &dyn Differ,
) -> Result<String> {
    ensure_unit(base_dir)?;
    ensure_unit(target_dir)?;
    let base_out = renderer.render(base_dir)?;
    let target_out = renderer.render(target_dir)?;
    Ok(differ.diff(&base_out, &target_out))
}
