//! Reference graph over a Kustomize tree: forward edges (unit -> references)
//! and their inversion (node -> referrers).

use crate::error::Result;
use crate::paths::{absolute_clean, relative_to, to_node_id};
use crate::unit::{extract_refs, find_unit};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

/// Unit identifier -> declared references, in declaration order.
pub type ForwardRefs = BTreeMap<String, Vec<String>>;

/// Node identifier -> units that reference it. Duplicates are preserved.
pub type ReverseRefs = BTreeMap<String, Vec<String>>;

/// Walk `root` and extract the references of every unit found beneath it.
///
/// Keys are unit file paths relative to `root`. The first failure aborts the
/// whole build; no partial map is returned.
pub fn build_refs(root: &Path) -> Result<ForwardRefs> {
    let root = absolute_clean(root)?;
    let mut refs = ForwardRefs::new();

    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let Some(unit_path) = find_unit(entry.path())? else {
            continue;
        };
        let unit_id = to_node_id(&relative_to(&root, &unit_path));
        let unit_refs = extract_refs(&root, entry.path())?;
        refs.insert(unit_id, unit_refs);
    }

    tracing::debug!(root = %root.display(), units = refs.len(), "built forward references");
    Ok(refs)
}

/// Invert forward references: for every `a -> b`, record `a` under `b`.
pub fn invert_refs(forward: &ForwardRefs) -> ReverseRefs {
    let mut reverse = ReverseRefs::new();
    for (source, targets) in forward {
        for target in targets {
            reverse
                .entry(target.clone())
                .or_default()
                .push(source.clone());
        }
    }
    reverse
}

/// Forward and reverse edge sets built from a single snapshot of the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefGraph {
    pub forward: ForwardRefs,
    pub reverse: ReverseRefs,
}

impl RefGraph {
    pub fn build(root: &Path) -> Result<Self> {
        Ok(Self::from_forward(build_refs(root)?))
    }

    pub fn from_forward(forward: ForwardRefs) -> Self {
        let reverse = invert_refs(&forward);
        Self { forward, reverse }
    }

    /// Units referencing `id`. Empty when nothing does.
    pub fn referrers(&self, id: &str) -> &[String] {
        self.reverse
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// True when nothing in the tree references `id`.
    pub fn is_root(&self, id: &str) -> bool {
        self.referrers(id).is_empty()
    }

    /// All units that no other unit references, in identifier order.
    pub fn root_units(&self) -> Vec<&str> {
        self.forward
            .keys()
            .filter(|unit| self.is_root(unit))
            .map(String::as_str)
            .collect()
    }

    pub fn unit_count(&self) -> usize {
        self.forward.len()
    }

    pub fn edge_count(&self) -> usize {
        self.forward.values().map(Vec::len).sum()
    }
}
