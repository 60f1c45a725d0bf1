//! Guarded deletion against a scratch directory.

use std::fs;

use filekit::{remove_paths, DeletePolicy, Error};

#[test]
fn test_removes_files_and_trees() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("a.pdf");
    let tree = dir.path().join("parts");
    fs::write(&file, b"x").unwrap();
    fs::create_dir_all(tree.join("nested/deeper")).unwrap();
    fs::write(tree.join("nested/deeper/b.pdf"), b"y").unwrap();

    let report = remove_paths([&file, &tree], &DeletePolicy::empty());
    assert!(report.is_success());
    assert_eq!(report.removed.len(), 2);
    assert!(!file.exists());
    assert!(!tree.exists());
    assert!(dir.path().exists());
}

#[test]
fn test_missing_paths_are_not_failures() {
    let dir = tempfile::tempdir().unwrap();
    let gone = dir.path().join("never-created");

    let report = remove_paths([&gone], &DeletePolicy::empty());
    assert!(report.is_success());
    assert!(report.removed.is_empty());
    assert_eq!(report.missing.len(), 1);
}

#[test]
fn test_protected_tree_is_refused_and_batch_continues() {
    let dir = tempfile::tempdir().unwrap();
    let keep = dir.path().join("keep");
    let scratch = dir.path().join("scratch.txt");
    fs::create_dir_all(&keep).unwrap();
    fs::write(keep.join("inside.txt"), b"k").unwrap();
    fs::write(&scratch, b"s").unwrap();

    let root = fs::canonicalize(dir.path()).unwrap();
    let policy = DeletePolicy::empty().protect_tree(root.join("keep"));
    let report = remove_paths([keep.join("inside.txt"), scratch.clone()], &policy);

    assert!(!report.is_success());
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0].1, Error::ProtectedPath(_)));
    assert!(keep.join("inside.txt").exists());
    assert!(!scratch.exists());
}

#[test]
fn test_relative_paths_resolve_against_cwd() {
    let policy = DeletePolicy::empty();
    // A relative path that does not exist resolves to <cwd>/..., which is
    // never a root, and is then reported missing.
    let report = remove_paths(["definitely-missing-filekit-test-path"], &policy);
    assert!(report.is_success());
    assert_eq!(report.missing.len(), 1);
    assert!(report.missing[0].is_absolute());
}

#[cfg(unix)]
#[test]
fn test_symlink_is_removed_not_its_target() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("target");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("data.txt"), b"d").unwrap();

    let link_dir = dir.path().join("links");
    fs::create_dir_all(&link_dir).unwrap();
    let link = link_dir.join("to-target");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    let report = remove_paths([&link_dir], &DeletePolicy::empty());
    assert!(report.is_success());
    assert!(!link_dir.exists());
    assert!(target.join("data.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_removing_a_link_keeps_its_target() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("target.txt");
    let link = dir.path().join("link.txt");
    fs::write(&target, b"t").unwrap();
    std::os::unix::fs::symlink(&target, &link).unwrap();

    let report = remove_paths([&link], &DeletePolicy::empty());
    assert!(report.is_success());
    assert!(fs::symlink_metadata(&link).is_err());
    assert!(target.exists());
}

#[cfg(target_os = "linux")]
#[test]
fn test_roots_are_refused_even_with_empty_policy() {
    let report = remove_paths(["/", "/usr", "/usr/.."], &DeletePolicy::empty());
    assert_eq!(report.failures.len(), 3);
    assert!(report
        .failures
        .iter()
        .all(|(_, err)| matches!(err, Error::ProtectedPath(_))));
}
