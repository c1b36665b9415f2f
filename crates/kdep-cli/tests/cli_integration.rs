//! Integration tests for kdep-cli functionality.
//! Tests the underlying library functions that the CLI commands invoke.

use kdep_core::config::{KdepConfig, OutputFormat};
use kdep_core::discover::list_unit_dirs;
use kdep_core::graph::RefGraph;
use kdep_core::resolve::resolve_changes_in;
use std::fs;
use std::path::Path;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn sample_tree(root: &Path) {
    write(root, "base/kustomization.yaml", "resources: [deployment.yaml]\n");
    write(root, "base/deployment.yaml", "kind: Deployment\n");
    write(root, "overlays/staging/kustomization.yaml", "resources: [../../base]\n");
    write(root, "overlays/production/kustomization.yaml", "resources: [../../base]\n");
    write(root, "vendor/thirdparty/kustomization.yaml", "resources: [crd.yaml]\n");
    write(root, "vendor/thirdparty/crd.yaml", "kind: CustomResourceDefinition\n");
}

#[test]
fn test_config_defaults_without_file() {
    let tmpdir = tempfile::tempdir().unwrap();
    let config = KdepConfig::load_file(tmpdir.path()).unwrap();
    assert_eq!(config.render.executable, "kustomize");
    assert_eq!(config.output.format, OutputFormat::Text);
}

#[test]
fn test_config_exclude_applies_to_listing() {
    let tmpdir = tempfile::tempdir().unwrap();
    sample_tree(tmpdir.path());
    write(
        tmpdir.path(),
        ".kdep/config.toml",
        "[discovery]\nexclude = \"/vendor/\"\n",
    );

    let config = KdepConfig::load_file(tmpdir.path()).unwrap();
    let filter = config.discovery.filter().unwrap();
    let dirs = list_unit_dirs(tmpdir.path(), &filter).unwrap();
    assert_eq!(
        dirs,
        vec!["base", "overlays/production", "overlays/staging"]
    );
}

#[test]
fn test_parents_report_serializes() {
    let tmpdir = tempfile::tempdir().unwrap();
    sample_tree(tmpdir.path());

    let graph = RefGraph::build(tmpdir.path()).unwrap();
    let changed = vec!["base/deployment.yaml".to_string()];
    let report = resolve_changes_in(&graph, &changed).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    let mut roots: Vec<&str> = json["roots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    roots.sort();
    assert_eq!(
        roots,
        vec![
            "overlays/production/kustomization.yaml",
            "overlays/staging/kustomization.yaml",
        ]
    );
}

#[test]
fn test_graph_dump_serializes_both_directions() {
    let tmpdir = tempfile::tempdir().unwrap();
    sample_tree(tmpdir.path());

    let graph = RefGraph::build(tmpdir.path()).unwrap();
    let forward = serde_json::to_value(&graph.forward).unwrap();
    let reverse = serde_json::to_value(&graph.reverse).unwrap();

    assert_eq!(
        forward["base/kustomization.yaml"],
        serde_json::json!(["base/deployment.yaml"])
    );
    assert_eq!(reverse["base/kustomization.yaml"].as_array().unwrap().len(), 2);
}

#[cfg(unix)]
#[test]
fn test_diff_with_external_renderer() {
    use kdep_core::diff::{DiffOptions, UnifiedDiffer, diff_trees};
    use kdep_core::render::CommandRenderer;

    let base = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    sample_tree(base.path());
    sample_tree(target.path());
    write(target.path(), "base/service.yaml", "kind: Service\n");

    // `ls <dir>` stands in for the build tool: output changes when files do.
    let renderer = CommandRenderer::new("ls", Vec::new());
    let map = diff_trees(
        base.path(),
        target.path(),
        &DiffOptions::default(),
        &renderer,
        &UnifiedDiffer::default(),
    )
    .unwrap();

    assert_eq!(map.changed_dirs(), vec!["base"]);
    assert!(map.failed_dirs().is_empty());
}
