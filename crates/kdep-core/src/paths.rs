//! Lexical path helpers for node identifiers.
//!
//! Node identifiers are `/`-separated paths relative to the tree root. They are
//! computed lexically (no symlink resolution), so `..` segments collapse against
//! the preceding segment the same way `filepath.Clean`-style normalizers do.

use crate::error::{KdepError, Result};
use path_clean::PathClean;
use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against the current directory and clean it.
pub fn absolute_clean(path: &Path) -> Result<PathBuf> {
    let abs = std::path::absolute(path).map_err(|e| KdepError::fs(path, e))?;
    Ok(abs.clean())
}

/// Compute `target` relative to `base`. Both must be absolute and cleaned.
///
/// Returns `.` when the two paths are equal, and climbs with `..` when `target`
/// lies outside `base`.
pub fn relative_to(base: &Path, target: &Path) -> PathBuf {
    let base_parts: Vec<Component<'_>> = base.components().collect();
    let target_parts: Vec<Component<'_>> = target.components().collect();

    let common = base_parts
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push("..");
    }
    for part in &target_parts[common..] {
        rel.push(part.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    rel
}

/// Render a path as a `/`-separated node identifier. An absolute path keeps
/// its leading `/`.
pub fn to_node_id(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
        })
        .collect();
    let joined = parts.join("/");
    if path.has_root() {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Normalize a user-supplied node identifier (`./a//pod.yaml` -> `a/pod.yaml`).
pub fn normalize_node_id(id: &str) -> String {
    to_node_id(&Path::new(id).clean())
}

/// Identify a changed path inside the tree at `root`. Absolute paths are
/// rewritten relative to `root`; relative ones are normalized as given.
pub fn tree_node_id(root: &Path, changed: &str) -> Result<String> {
    let path = Path::new(changed);
    if !path.has_root() {
        return Ok(normalize_node_id(changed));
    }
    let root = absolute_clean(root)?;
    Ok(to_node_id(&relative_to(&root, &path.clean())))
}
