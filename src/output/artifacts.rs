//! Scoped cleanup of transient files

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Deletes every tracked file when dropped.
///
/// Removal runs on every exit path, including early returns through `?`.
/// A file that is already gone is not an error; any other removal failure
/// is logged and never replaces the caller's result.
#[derive(Debug, Default)]
pub struct ArtifactGuard {
    paths: Vec<PathBuf>,
}

impl ArtifactGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `path` for removal and hand it back
    pub fn track(&mut self, path: impl Into<PathBuf>) -> PathBuf {
        let path = path.into();
        self.paths.push(path.clone());
        path
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Remove everything now instead of at drop
    pub fn clean(&mut self) {
        for path in self.paths.drain(..) {
            remove_quietly(&path);
        }
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        self.clean();
    }
}

fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed temporary file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), "Failed to remove temporary file: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_drop_removes_tracked_files() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.mp4");
        let b = dir.path().join("b.mp4");
        std::fs::write(&a, b"a").unwrap();

        {
            let mut guard = ArtifactGuard::new();
            guard.track(&a);
            // never created; must not panic
            guard.track(&b);
            assert_eq!(guard.paths().len(), 2);
        }

        assert!(!a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn test_guard_runs_on_early_return() {
        fn fails(dir: &Path) -> Result<(), String> {
            let mut guard = ArtifactGuard::new();
            let tmp = guard.track(dir.join("seg.mp4"));
            std::fs::write(&tmp, b"x").map_err(|e| e.to_string())?;
            Err("extraction failed".to_string())
        }

        let dir = TempDir::new().unwrap();
        assert!(fails(dir.path()).is_err());
        assert!(!dir.path().join("seg.mp4").exists());
    }
}
