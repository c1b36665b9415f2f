//! Resolution against the committed fixture tree in `tests/fixtures/kustomize`.

use kdep_core::graph::{RefGraph, build_refs};
use kdep_core::resolve::{find_parents, resolve_changes};
use kdep_core::unit::extract_refs;
use std::path::{Path, PathBuf};

fn manifest_dir() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

fn fixture_root() -> PathBuf {
    manifest_dir().join("tests").join("fixtures").join("kustomize")
}

#[test]
fn test_extract_refs_relative_to_manifest_dir() {
    let root = fixture_root();

    let a = extract_refs(manifest_dir(), &root.join("a")).unwrap();
    assert_eq!(a, vec!["tests/fixtures/kustomize/a/pod.yaml"]);

    let b = extract_refs(manifest_dir(), &root.join("b")).unwrap();
    assert_eq!(b, vec!["tests/fixtures/kustomize/b/pod.yaml"]);

    let refs = extract_refs(manifest_dir(), &root.join("refs")).unwrap();
    assert_eq!(
        refs,
        vec![
            "tests/fixtures/kustomize/refs/pod.yaml",
            "tests/fixtures/kustomize/refs/deployment.yaml",
            "tests/fixtures/kustomize/a/kustomization.yaml",
            "tests/fixtures/kustomize/refs/components/kustomization.yaml",
            "tests/fixtures/kustomize/refs/release-patch.yaml",
        ]
    );
}

#[test]
fn test_forward_edges() {
    let forward = build_refs(&fixture_root()).unwrap();

    assert_eq!(forward.len(), 4);
    assert_eq!(forward["a/kustomization.yaml"], vec!["a/pod.yaml"]);
    assert_eq!(forward["b/kustomization.yaml"], vec!["b/pod.yaml"]);
    assert_eq!(
        forward["refs/kustomization.yaml"],
        vec![
            "refs/pod.yaml",
            "refs/deployment.yaml",
            "a/kustomization.yaml",
            "refs/components/kustomization.yaml",
            "refs/release-patch.yaml",
        ]
    );
    assert!(forward["refs/components/kustomization.yaml"].is_empty());
}

#[test]
fn test_reverse_edges() {
    let graph = RefGraph::build(&fixture_root()).unwrap();

    assert_eq!(graph.referrers("a/pod.yaml"), ["a/kustomization.yaml"]);
    assert_eq!(graph.referrers("a/kustomization.yaml"), ["refs/kustomization.yaml"]);
    assert_eq!(
        graph.referrers("refs/components/kustomization.yaml"),
        ["refs/kustomization.yaml"]
    );
    assert!(graph.is_root("refs/kustomization.yaml"));
    assert!(graph.is_root("b/kustomization.yaml"));
    assert_eq!(
        graph.root_units(),
        vec!["b/kustomization.yaml", "refs/kustomization.yaml"]
    );
}

#[test]
fn test_find_parents() {
    let root = fixture_root();

    // a/pod.yaml -> a -> refs, and nothing references refs.
    assert_eq!(
        find_parents("a/pod.yaml", &root).unwrap(),
        vec!["refs/kustomization.yaml"]
    );
    assert_eq!(
        find_parents("refs/pod.yaml", &root).unwrap(),
        vec!["refs/kustomization.yaml"]
    );
    // b is unreferenced, so it is its own root.
    assert_eq!(
        find_parents("b/pod.yaml", &root).unwrap(),
        vec!["b/kustomization.yaml"]
    );
}

#[test]
fn test_find_parents_of_root_unit() {
    let root = fixture_root();
    assert_eq!(
        find_parents("refs/kustomization.yaml", &root).unwrap(),
        vec!["refs/kustomization.yaml"]
    );
}

#[test]
fn test_find_parents_of_component() {
    let root = fixture_root();
    assert_eq!(
        find_parents("refs/components/kustomization.yaml", &root).unwrap(),
        vec!["refs/kustomization.yaml"]
    );
}

#[test]
fn test_resolve_changes_batch() {
    let report = resolve_changes(
        &fixture_root(),
        &["a/pod.yaml", "b/pod.yaml", "refs/release-patch.yaml"],
    )
    .unwrap();
    assert_eq!(
        report.roots,
        vec!["refs/kustomization.yaml", "b/kustomization.yaml"]
    );
    assert_eq!(report.by_file.len(), 3);
}
