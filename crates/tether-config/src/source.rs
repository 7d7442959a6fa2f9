//! Where configuration text comes from.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{ConfigError, ConfigResult};

/// Existence check and read access for configuration paths.
pub trait Source: Send + Sync {
    /// Whether `path` exists. Errors only on I/O failure.
    fn exists(&self, path: &Path) -> ConfigResult<bool>;

    /// Read `path` as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> ConfigResult<String>;
}

/// The local filesystem, optionally rooted at a base directory.
#[derive(Clone, Debug, Default)]
pub struct FsSource {
    root: Option<PathBuf>,
}

impl FsSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `root`.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Source for FsSource {
    fn exists(&self, path: &Path) -> ConfigResult<bool> {
        let full = self.resolve(path);
        full.try_exists().map_err(|source| ConfigError::Io { path: full, source })
    }

    fn read_to_string(&self, path: &Path) -> ConfigResult<String> {
        let full = self.resolve(path);
        std::fs::read_to_string(&full).map_err(|source| ConfigError::Io { path: full, source })
    }
}

/// In-memory files for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: RwLock<HashMap<PathBuf, String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        files.insert(path.into(), text.into());
    }

    /// Remove a file. Returns `true` if it existed.
    pub fn remove(&self, path: &Path) -> bool {
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        files.remove(path).is_some()
    }

    /// Builder form of [`MemorySource::insert`].
    pub fn with_file(self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }
}

impl Source for MemorySource {
    fn exists(&self, path: &Path) -> ConfigResult<bool> {
        let files = self.files.read().map_err(|e| poisoned(path, e))?;
        Ok(files.contains_key(path))
    }

    fn read_to_string(&self, path: &Path) -> ConfigResult<String> {
        let files = self.files.read().map_err(|e| poisoned(path, e))?;
        files.get(path).cloned().ok_or_else(|| ConfigError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }
}

fn poisoned(path: &Path, err: impl std::fmt::Display) -> ConfigError {
    ConfigError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::other(format!("lock poisoned: {err}")),
    }
}

impl<S: Source + ?Sized> Source for &S {
    fn exists(&self, path: &Path) -> ConfigResult<bool> {
        (**self).exists(path)
    }

    fn read_to_string(&self, path: &Path) -> ConfigResult<String> {
        (**self).read_to_string(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_round_trip() {
        let source = MemorySource::new().with_file("a.json", "{}");
        assert!(source.exists(Path::new("a.json")).unwrap());
        assert_eq!(source.read_to_string(Path::new("a.json")).unwrap(), "{}");
        assert!(source.remove(Path::new("a.json")));
        assert!(!source.exists(Path::new("a.json")).unwrap());
        assert!(matches!(
            source.read_to_string(Path::new("a.json")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn fs_source_resolves_against_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.toml"), "a = 1\n").unwrap();

        let source = FsSource::rooted(dir.path());
        assert!(source.exists(Path::new("app.toml")).unwrap());
        assert!(!source.exists(Path::new("other.toml")).unwrap());
        assert_eq!(source.read_to_string(Path::new("app.toml")).unwrap(), "a = 1\n");

        let absolute = dir.path().join("app.toml");
        assert!(FsSource::new().exists(&absolute).unwrap());
    }
}
