//! Repository detection by upward directory traversal.
//!
//! A directory is considered to be under version control when it, or any of
//! its ancestors, contains a `.git` marker. The marker may be a directory
//! (regular repository) or a file (worktree or submodule pointer); both count
//! and the marker's contents are never read.

use std::path::{Path, PathBuf};

/// Name of the on-disk repository marker.
pub const REPOSITORY_MARKER: &str = ".git";

/// Detects enclosing version-control working trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepositoryDetector;

impl RepositoryDetector {
    /// Creates a new detector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns true if `start` lies inside a repository.
    #[must_use]
    pub fn is_inside_repository(&self, start: &Path) -> bool {
        self.find_repository_root(start).is_some()
    }

    /// Returns the nearest directory at or above `start` holding a marker.
    ///
    /// Symbolic links in `start` are resolved first so the walk follows the
    /// real path. The walk ends once the filesystem root has been checked.
    #[must_use]
    pub fn find_repository_root(&self, start: &Path) -> Option<PathBuf> {
        let resolved = resolve(start);
        let found = resolved.ancestors().find(|dir| has_marker(dir));

        match found {
            Some(root) => {
                tracing::debug!(start = %start.display(), root = %root.display(), "Found repository marker");
                Some(root.to_path_buf())
            },
            None => {
                tracing::debug!(start = %start.display(), "No repository marker above start");
                None
            },
        }
    }
}

/// Returns true if `start` lies inside a repository.
#[must_use]
pub fn is_inside_repository(start: &Path) -> bool {
    RepositoryDetector::new().is_inside_repository(start)
}

/// Canonicalizes `path`, falling back to an absolute form of the input.
fn resolve(path: &Path) -> PathBuf {
    match path.canonicalize() {
        Ok(real) => real,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Could not resolve path, using it as given");
            if path.is_absolute() {
                return path.to_path_buf();
            }
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        },
    }
}

/// Checks one directory for a marker. Unreadable directories count as absent.
fn has_marker(dir: &Path) -> bool {
    match dir.join(REPOSITORY_MARKER).try_exists() {
        Ok(present) => present,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
            false
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn nested(temp: &TempDir, rel: &str) -> PathBuf {
        let dir = temp.path().join(rel);
        fs::create_dir_all(&dir).expect("create nested dirs");
        dir
    }

    // Temp dirs may themselves live inside a checkout; these tests only make
    // negative assertions when the temp root is clean.
    fn temp_root_is_clean(temp: &TempDir) -> bool {
        let clean = !is_inside_repository(temp.path());
        if !clean {
            eprintln!(
                "skipping: temp dir {} is inside a repository",
                temp.path().display()
            );
        }
        clean
    }

    // =========================================================================
    // Positive detection
    // =========================================================================

    #[test]
    fn test_marker_directory_at_start() {
        let temp = TempDir::new().expect("create temp dir");
        fs::create_dir(temp.path().join(".git")).expect("create .git");
        assert!(is_inside_repository(temp.path()));
    }

    #[test]
    fn test_marker_directory_two_levels_up() {
        let temp = TempDir::new().expect("create temp dir");
        let repo = nested(&temp, "repo");
        fs::create_dir(repo.join(".git")).expect("create .git");
        let start = nested(&temp, "repo/packages/kata");

        assert!(is_inside_repository(&start));
    }

    #[test]
    fn test_marker_file_worktree_pointer() {
        let temp = TempDir::new().expect("create temp dir");
        let start = nested(&temp, "worktree");
        fs::write(start.join(".git"), "gitdir: /somewhere/else/.git/worktrees/wt\n")
            .expect("write .git file");

        assert!(is_inside_repository(&start));
    }

    #[test]
    fn test_find_repository_root_returns_nearest() {
        let temp = TempDir::new().expect("create temp dir");
        let outer = nested(&temp, "outer");
        fs::create_dir(outer.join(".git")).expect("create outer .git");
        let inner = nested(&temp, "outer/inner");
        fs::write(inner.join(".git"), "gitdir: ../.git/modules/inner").expect("write .git file");
        let start = nested(&temp, "outer/inner/src");

        let root = RepositoryDetector::new()
            .find_repository_root(&start)
            .expect("root found");
        assert_eq!(root, inner.canonicalize().expect("canonicalize inner"));
    }

    // =========================================================================
    // Negative detection
    // =========================================================================

    #[test]
    fn test_no_marker_anywhere() {
        let temp = TempDir::new().expect("create temp dir");
        if !temp_root_is_clean(&temp) {
            return;
        }
        let start = nested(&temp, "a/b/c");
        assert!(!is_inside_repository(&start));
    }

    #[test]
    fn test_sibling_marker_is_ignored() {
        let temp = TempDir::new().expect("create temp dir");
        if !temp_root_is_clean(&temp) {
            return;
        }
        let sibling = nested(&temp, "sibling_repo");
        fs::create_dir(sibling.join(".git")).expect("create .git");
        let start = nested(&temp, "our_project");

        assert!(!is_inside_repository(&start));
    }

    #[test]
    fn test_marker_below_start_is_ignored() {
        let temp = TempDir::new().expect("create temp dir");
        if !temp_root_is_clean(&temp) {
            return;
        }
        let child = nested(&temp, "project/child");
        fs::create_dir(child.join(".git")).expect("create .git");
        let start = temp.path().join("project");

        assert!(!is_inside_repository(&start));
    }

    // =========================================================================
    // Symlinks and termination
    // =========================================================================

    #[cfg(unix)]
    #[test]
    fn test_symlink_resolves_to_real_path() {
        let temp = TempDir::new().expect("create temp dir");
        let repo = nested(&temp, "repo");
        fs::create_dir(repo.join(".git")).expect("create .git");
        let real = nested(&temp, "repo/kata");

        let links = nested(&temp, "links");
        let link = links.join("kata");
        std::os::unix::fs::symlink(&real, &link).expect("create symlink");

        assert_eq!(is_inside_repository(&link), is_inside_repository(&real));
        assert!(is_inside_repository(&link));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_out_of_repository() {
        let temp = TempDir::new().expect("create temp dir");
        if !temp_root_is_clean(&temp) {
            return;
        }
        let real = nested(&temp, "plain/kata");
        let repo = nested(&temp, "repo");
        fs::create_dir(repo.join(".git")).expect("create .git");
        let link = repo.join("kata");
        std::os::unix::fs::symlink(&real, &link).expect("create symlink");

        // The link sits inside the repository but its target does not.
        assert!(!is_inside_repository(&link));
    }

    #[test]
    fn test_terminates_at_filesystem_root() {
        let root = Path::new("/");
        // Only termination matters; the answer depends on the host.
        let _ = is_inside_repository(root);
    }

    #[test]
    fn test_nonexistent_start_does_not_panic() {
        let temp = TempDir::new().expect("create temp dir");
        fs::create_dir(temp.path().join(".git")).expect("create .git");
        let missing = temp.path().join("not/created/yet");

        assert!(is_inside_repository(&missing));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_does_not_abort() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("create temp dir");
        fs::create_dir(temp.path().join(".git")).expect("create .git");
        let locked = nested(&temp, "locked");
        let start = nested(&temp, "locked/inner");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).expect("lock dir");

        let detected = is_inside_repository(&start);

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("unlock dir");
        assert!(detected);
    }
}
