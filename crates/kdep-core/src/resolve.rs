//! Change-impact resolution: climb referrers from a changed file to the root
//! units that transitively include it.

use crate::error::{KdepError, Result};
use crate::graph::RefGraph;
use crate::paths::{normalize_node_id, tree_node_id};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Root units affected by a set of changed files.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImpactReport {
    /// Changed files, normalized and deduplicated in input order.
    pub changed: Vec<String>,
    /// Deduplicated union of affected roots, in discovery order.
    pub roots: Vec<String>,
    /// Affected roots per changed file.
    pub by_file: BTreeMap<String, Vec<String>>,
}

/// Find the root units affected by `changed`, building the graph from `root`.
///
/// `changed` is a path relative to `root`, or an absolute path inside it. A
/// file nothing references is its own root.
pub fn find_parents(changed: &str, root: &Path) -> Result<Vec<String>> {
    let changed = tree_node_id(root, changed)?;
    let graph = RefGraph::build(root)?;
    find_parents_in(&graph, &changed)
}

/// Like [`find_parents`], against an already built graph.
pub fn find_parents_in(graph: &RefGraph, changed: &str) -> Result<Vec<String>> {
    let mut climb = Climb::new(graph);
    climb.visit(&normalize_node_id(changed))?;
    Ok(climb.roots)
}

/// Resolve several changed files against one snapshot of `root`.
pub fn resolve_changes<S: AsRef<str>>(root: &Path, changed: &[S]) -> Result<ImpactReport> {
    let changed = changed
        .iter()
        .map(|file| tree_node_id(root, file.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    let graph = RefGraph::build(root)?;
    resolve_changes_in(&graph, &changed)
}

pub fn resolve_changes_in<S: AsRef<str>>(graph: &RefGraph, changed: &[S]) -> Result<ImpactReport> {
    let mut report = ImpactReport::default();
    let mut seen = HashSet::new();

    for file in changed {
        let file = normalize_node_id(file.as_ref());
        if report.by_file.contains_key(&file) {
            continue;
        }
        let roots = find_parents_in(graph, &file)?;
        tracing::debug!(file = %file, roots = roots.len(), "resolved changed file");
        for root in &roots {
            if seen.insert(root.clone()) {
                report.roots.push(root.clone());
            }
        }
        report.changed.push(file.clone());
        report.by_file.insert(file, roots);
    }

    Ok(report)
}

/// State for one resolution: the current referrer chain, nodes whose
/// ancestors are fully collected, and the roots found so far.
struct Climb<'g> {
    graph: &'g RefGraph,
    stack: Vec<String>,
    on_stack: HashSet<String>,
    finished: HashSet<String>,
    roots: Vec<String>,
    seen_roots: HashSet<String>,
}

impl<'g> Climb<'g> {
    fn new(graph: &'g RefGraph) -> Self {
        Self {
            graph,
            stack: Vec::new(),
            on_stack: HashSet::new(),
            finished: HashSet::new(),
            roots: Vec::new(),
            seen_roots: HashSet::new(),
        }
    }

    fn visit(&mut self, node: &str) -> Result<()> {
        if self.on_stack.contains(node) {
            let start = self.stack.iter().position(|n| n == node).unwrap_or(0);
            let mut chain = self.stack[start..].to_vec();
            chain.push(node.to_string());
            return Err(KdepError::CyclicReference { chain });
        }
        // Converging paths (A -> C, B -> C) reach the same ancestors.
        if self.finished.contains(node) {
            return Ok(());
        }

        let graph = self.graph;
        let referrers = graph.referrers(node);
        if referrers.is_empty() {
            if self.seen_roots.insert(node.to_string()) {
                self.roots.push(node.to_string());
            }
        } else {
            self.stack.push(node.to_string());
            self.on_stack.insert(node.to_string());
            for referrer in referrers {
                self.visit(referrer)?;
            }
            self.on_stack.remove(node);
            self.stack.pop();
        }

        self.finished.insert(node.to_string());
        Ok(())
    }
}
