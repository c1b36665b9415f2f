//! Kustomization units: locating, parsing, and extracting declared references.

use crate::error::{KdepError, Result};
use crate::paths::{absolute_clean, relative_to, to_node_id};
use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Accepted unit filenames, in preference order.
pub const UNIT_FILENAMES: [&str; 2] = ["kustomization.yaml", "kustomization.yml"];

/// The subset of a kustomization document that declares references.
/// Every other field is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kustomization {
    #[serde(default)]
    pub resources: Option<Vec<String>>,
    #[serde(default)]
    pub components: Option<Vec<String>>,
    #[serde(default)]
    pub patches_strategic_merge: Option<Vec<String>>,
}

/// Which list a reference was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefCategory {
    Resource,
    Component,
    PatchStrategicMerge,
}

/// What a reference resolved to on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    /// A plain file.
    File,
    /// A directory; the identifier names its unit file.
    Unit,
    /// Nothing on disk (remote or generated); recorded unresolved.
    External,
}

/// A single resolved reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
    pub category: RefCategory,
    pub kind: RefKind,
}

impl Kustomization {
    /// All declared entries in (resources, components, patches) order.
    pub fn declared(&self) -> Vec<(RefCategory, &str)> {
        let lists = [
            (RefCategory::Resource, &self.resources),
            (RefCategory::Component, &self.components),
            (RefCategory::PatchStrategicMerge, &self.patches_strategic_merge),
        ];
        lists
            .into_iter()
            .flat_map(|(category, list)| {
                list.iter()
                    .flatten()
                    .map(move |entry| (category, entry.as_str()))
            })
            .collect()
    }

    /// Parse a unit document. Only the first document of a multi-document
    /// stream is read. Empty or comment-only documents declare nothing.
    pub fn from_yaml(path: &Path, content: &str) -> Result<Self> {
        let malformed = |source| KdepError::MalformedConfig {
            path: path.to_path_buf(),
            source,
        };
        let Some(document) = serde_yaml::Deserializer::from_str(content).next() else {
            return Ok(Self::default());
        };
        let value = serde_yaml::Value::deserialize(document).map_err(malformed)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value).map_err(malformed)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| KdepError::fs(path, e))?;
        Self::from_yaml(path, &content)
    }
}

/// Find the unit file in `dir`, preferring `kustomization.yaml`.
pub fn find_unit(dir: &Path) -> Result<Option<PathBuf>> {
    for name in UNIT_FILENAMES {
        let candidate = dir.join(name);
        if candidate
            .try_exists()
            .map_err(|e| KdepError::fs(&candidate, e))?
        {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

pub fn unit_exists(dir: &Path) -> Result<bool> {
    Ok(find_unit(dir)?.is_some())
}

/// Extract the references declared by the unit in `dir`, as identifiers
/// relative to `base`.
pub fn extract_refs(base: &Path, dir: &Path) -> Result<Vec<String>> {
    Ok(extract_references(base, dir)?
        .into_iter()
        .map(|r| r.id)
        .collect())
}

/// Like [`extract_refs`], keeping the category and on-disk kind of each entry.
pub fn extract_references(base: &Path, dir: &Path) -> Result<Vec<Reference>> {
    let base = absolute_clean(base)?;
    let dir = absolute_clean(dir)?;

    let unit_path = find_unit(&dir)?.ok_or_else(|| KdepError::ConfigNotFound { dir: dir.clone() })?;
    let unit = Kustomization::load(&unit_path)?;

    let mut refs = Vec::new();
    for (category, entry) in unit.declared() {
        let candidate = dir.join(entry).clean();
        let (target, kind) = match fs::metadata(&candidate) {
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                tracing::debug!(
                    unit = %unit_path.display(),
                    entry,
                    "reference not on disk, recording as external"
                );
                (candidate, RefKind::External)
            }
            Err(e) => return Err(KdepError::fs(&candidate, e)),
            Ok(meta) if meta.is_dir() => {
                let nested = find_unit(&candidate)?.ok_or_else(|| KdepError::MissingNestedConfig {
                    dir: candidate.clone(),
                    referenced_by: unit_path.clone(),
                })?;
                (nested, RefKind::Unit)
            }
            Ok(_) => (candidate, RefKind::File),
        };
        refs.push(Reference {
            id: to_node_id(&relative_to(&base, &target)),
            category,
            kind,
        });
    }

    tracing::debug!(unit = %unit_path.display(), refs = refs.len(), "extracted references");
    Ok(refs)
}

/// Create `dir` (with parents) and an empty `kustomization.yaml` inside it.
/// Fails if that file already exists.
pub fn create_unit(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| KdepError::fs(dir, e))?;
    let path = dir.join(UNIT_FILENAMES[0]);
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| KdepError::fs(&path, e))?;
    Ok(path)
}

/// Return the unit in `dir`, creating an empty one if none exists.
pub fn ensure_unit(dir: &Path) -> Result<PathBuf> {
    match find_unit(dir)? {
        Some(path) => Ok(path),
        None => {
            tracing::info!(dir = %dir.display(), "bootstrapping empty kustomization");
            create_unit(dir)
        }
    }
}
