//! Project path management
//!
//! Handles project root detection and safe replacement of persisted files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::config::{Config, ResolvedPaths};

/// Environment variable for project root configuration
pub const ROOT_PATH_ENV: &str = "GENELINK_ROOT";

/// Project paths wrapper that combines config and resolved paths
pub struct ProjectPaths {
    pub resolved: ResolvedPaths,
    pub config: Config,
}

impl ProjectPaths {
    /// Create ProjectPaths from environment variable or current directory.
    pub fn new() -> Self {
        Self::from_root(get_project_root())
    }

    /// Create ProjectPaths from a specific root directory
    pub fn from_root(root: PathBuf) -> Self {
        let config = Config::load(&root);
        Self::from_root_with_config(root, config)
    }

    pub fn from_root_with_config(root: PathBuf, config: Config) -> Self {
        let resolved = config.resolve_paths(&root);
        Self { resolved, config }
    }

    pub fn root(&self) -> &Path {
        &self.resolved.root
    }
}

impl Default for ProjectPaths {
    fn default() -> Self {
        Self::new()
    }
}

/// Get project root from environment variable or current directory.
/// Priority: GENELINK_ROOT env var > current directory
pub fn get_project_root() -> PathBuf {
    if let Ok(path) = std::env::var(ROOT_PATH_ENV) {
        let root = PathBuf::from(&path);
        if root.exists() {
            return root;
        }
        tracing::warn!(
            "{} is set to '{}' but path does not exist. Falling back to current directory.",
            ROOT_PATH_ENV,
            path
        );
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Write `bytes` to a temporary sibling of `path`, then rename it into place.
///
/// The previous file at `path` is untouched unless the whole write succeeds.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let result = (|| {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// Populate a staging sibling of `dir`, then swap it in for `dir`.
///
/// `populate` writes every file into the staging directory. If it fails,
/// the staging directory is removed and `dir` keeps its previous contents.
/// `dir` is replaced as a whole, so it must not hold anything else.
pub fn replace_dir_atomic<F, E>(dir: &Path, populate: F) -> Result<(), E>
where
    F: FnOnce(&Path) -> Result<(), E>,
    E: From<std::io::Error>,
{
    let parent = match dir.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let staging = parent.join(format!(".{}.staging", name));
    let previous = parent.join(format!(".{}.previous", name));

    fs::create_dir_all(&staging)?;
    if let Err(e) = populate(&staging) {
        let _ = fs::remove_dir_all(&staging);
        return Err(e);
    }

    if previous.exists() {
        fs::remove_dir_all(&previous)?;
    }
    let had_previous = dir.exists();
    if had_previous {
        fs::rename(dir, &previous)?;
    }
    if let Err(e) = fs::rename(&staging, dir) {
        if had_previous {
            let _ = fs::rename(&previous, dir);
        }
        let _ = fs::remove_dir_all(&staging);
        return Err(e.into());
    }
    if had_previous {
        if let Err(e) = fs::remove_dir_all(&previous) {
            tracing::warn!("Could not remove {}: {}", previous.display(), e);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/out.json");

        write_atomic(&path, b"[1,2,3]").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[1,2,3]");
        assert!(!dir.path().join("nested/deeper/.out.json.tmp").exists());
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_replace_dir_atomic_swaps_whole_dir() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("index");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("a.txt"), "old a").unwrap();
        fs::write(target.join("stale.txt"), "stale").unwrap();

        replace_dir_atomic(&target, |staging| -> std::io::Result<()> {
            fs::write(staging.join("a.txt"), "new a")
        })
        .unwrap();

        assert_eq!(fs::read_to_string(target.join("a.txt")).unwrap(), "new a");
        assert!(!target.join("stale.txt").exists());
        assert!(!dir.path().join(".index.staging").exists());
        assert!(!dir.path().join(".index.previous").exists());
    }

    #[test]
    fn test_replace_dir_atomic_failure_keeps_old() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("index");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("a.txt"), "old a").unwrap();
        fs::write(target.join("b.txt"), "old b").unwrap();

        let result = replace_dir_atomic(&target, |staging| -> std::io::Result<()> {
            fs::write(staging.join("a.txt"), "new a")?;
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        });

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(target.join("a.txt")).unwrap(), "old a");
        assert_eq!(fs::read_to_string(target.join("b.txt")).unwrap(), "old b");
        assert!(!dir.path().join(".index.staging").exists());
    }

    #[test]
    fn test_project_paths_from_root() {
        let dir = TempDir::new().unwrap();
        let paths = ProjectPaths::from_root(dir.path().to_path_buf());
        assert_eq!(paths.root(), dir.path());
        assert_eq!(paths.resolved.index_dir, dir.path().join("models/index"));
    }
}
