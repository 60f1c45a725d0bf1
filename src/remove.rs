//! Guarded recursive deletion.
//!
//! [`remove_paths`] deletes files and directory trees in bulk. Every path
//! is first checked against a [`DeletePolicy`]; filesystem roots and their
//! direct children are always refused, plus whatever the policy lists.
//! Failures do not stop the batch: they are collected in the returned
//! [`RemovalReport`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// A path the policy refuses to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtectedPath {
    /// Refuse this exact path; its contents may still be deleted.
    Exact(PathBuf),
    /// Refuse this path and everything below it.
    Tree(PathBuf),
}

impl ProtectedPath {
    fn blocks(&self, path: &Path) -> bool {
        match self {
            ProtectedPath::Exact(protected) => path == protected,
            ProtectedPath::Tree(protected) => path.starts_with(protected),
        }
    }
}

/// Which paths [`remove_paths`] may touch.
#[derive(Debug, Clone)]
pub struct DeletePolicy {
    protected: Vec<ProtectedPath>,
}

impl DeletePolicy {
    /// Only the built-in root rules.
    pub fn empty() -> Self {
        Self {
            protected: Vec::new(),
        }
    }

    /// Home directory, drive roots and well-known system directories.
    pub fn system() -> Self {
        let mut policy = Self::empty();
        if let Some(dirs) = directories::BaseDirs::new() {
            policy = policy.protect(dirs.home_dir());
        }
        for path in [
            "/",
            "C:/",
            "D:/",
            "/bin",
            "/sbin",
            "/usr",
            "/Windows",
            "/Program Files",
        ] {
            policy = policy.protect(path);
        }
        policy
    }

    /// Refuse deleting exactly `path`.
    pub fn protect(mut self, path: impl Into<PathBuf>) -> Self {
        self.protected.push(ProtectedPath::Exact(path.into()));
        self
    }

    /// Refuse deleting `path` and anything inside it.
    pub fn protect_tree(mut self, path: impl Into<PathBuf>) -> Self {
        self.protected.push(ProtectedPath::Tree(path.into()));
        self
    }

    /// The configured protections, in insertion order.
    pub fn protected(&self) -> &[ProtectedPath] {
        &self.protected
    }

    /// Whether `path` may be deleted.
    ///
    /// `path` should be absolute; [`remove_paths`] resolves paths before
    /// asking.
    pub fn is_safe_to_delete(&self, path: &Path) -> bool {
        if self.protected.iter().any(|p| p.blocks(path)) {
            return false;
        }
        // Filesystem roots, and anything sitting directly under one.
        match path.parent() {
            None => false,
            Some(parent) => parent.parent().is_some(),
        }
    }
}

impl Default for DeletePolicy {
    fn default() -> Self {
        Self::system()
    }
}

/// Outcome of a [`remove_paths`] batch.
#[derive(Debug, Default)]
pub struct RemovalReport {
    /// Paths that were deleted.
    pub removed: Vec<PathBuf>,
    /// Paths that did not exist.
    pub missing: Vec<PathBuf>,
    /// Paths that were refused or could not be deleted.
    pub failures: Vec<(PathBuf, Error)>,
}

impl RemovalReport {
    /// True when nothing was refused and nothing failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Make `path` absolute. Symlinks in the parent directories are followed,
/// a symlink in the last component is not, so deleting a link never
/// deletes its target.
fn resolve(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let canonical = match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => fs::canonicalize(parent).map(|p| p.join(name)),
        // Roots and paths ending in `..`
        _ => fs::canonicalize(&absolute),
    };
    match canonical {
        Ok(resolved) => Ok(resolved),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(absolute),
        Err(e) => Err(e),
    }
}

/// Delete one resolved path. Returns `Ok(false)` if it did not exist.
fn remove_one(path: &Path) -> io::Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(true)
}

/// Delete files and directories (recursively), best effort.
///
/// Each path is resolved to an absolute path and checked against
/// `policy`. Missing paths are skipped without counting as failures.
///
/// # Example
///
/// ```no_run
/// use filekit::remove::{remove_paths, DeletePolicy};
///
/// let report = remove_paths(["/tmp/job-42/out", "/tmp/job-42/in.pdf"], &DeletePolicy::system());
/// if !report.is_success() {
///     for (path, err) in &report.failures {
///         eprintln!("{}: {}", path.display(), err);
///     }
/// }
/// ```
pub fn remove_paths<I, P>(paths: I, policy: &DeletePolicy) -> RemovalReport
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut report = RemovalReport::default();

    for path in paths {
        let path = path.as_ref();
        let resolved = match resolve(path) {
            Ok(resolved) => resolved,
            Err(e) => {
                log::error!("cannot resolve '{}': {}", path.display(), e);
                report.failures.push((path.to_path_buf(), e.into()));
                continue;
            }
        };

        if !policy.is_safe_to_delete(&resolved) {
            log::warn!("refusing to delete protected path '{}'", resolved.display());
            report
                .failures
                .push((resolved.clone(), Error::ProtectedPath(resolved)));
            continue;
        }

        match remove_one(&resolved) {
            Ok(true) => {
                log::info!("deleted '{}'", resolved.display());
                report.removed.push(resolved);
            }
            Ok(false) => report.missing.push(resolved),
            Err(e) => {
                log::error!("cannot delete '{}': {}", resolved.display(), e);
                report.failures.push((resolved, e.into()));
            }
        }
    }

    report
}
