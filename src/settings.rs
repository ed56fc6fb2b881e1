//! Cache Settings & Source Resolution
//!
//! This module defines the configuration surface of the collision cache.
//!
//! Two settings exist:
//! - the cooked-blob cache directory, which also switches write-through
//!   caching on or off
//! - an optional asset root that relative source paths are resolved against
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use myth_collision::CacheSettings;
//!
//! // Read MYTH_PHYSICS_CACHE_PATH / MYTH_PHYSICS_ASSET_ROOT once at startup
//! let settings = CacheSettings::from_env();
//!
//! // Or configure explicitly
//! let settings = CacheSettings {
//!     cache_dir: Some("target/physics_cache".into()),
//!     ..Default::default()
//! };
//! ```

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Environment variable selecting the cooked-blob cache directory.
pub const CACHE_PATH_ENV: &str = "MYTH_PHYSICS_CACHE_PATH";

/// Environment variable selecting the base directory for relative sources.
pub const ASSET_ROOT_ENV: &str = "MYTH_PHYSICS_ASSET_ROOT";

/// Configuration of the cooked-blob cache.
///
/// When `cache_dir` is unset or empty, cooked blobs are still looked up next
/// to their source asset, but nothing is ever written back to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Directory holding `*.mesh_physx`, `*.triangle_physx` and
    /// `*.heightfield_physx` blobs.
    pub cache_dir: Option<PathBuf>,
    /// Base directory for relative source paths.
    pub asset_root: Option<PathBuf>,
}

impl CacheSettings {
    /// Reads the settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        let read = |name: &str| {
            std::env::var_os(name)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        };
        let settings = Self {
            cache_dir: read(CACHE_PATH_ENV),
            asset_root: read(ASSET_ROOT_ENV),
        };
        log::debug!("Physics cache settings from environment: {settings:?}");
        settings
    }

    /// Parses settings embedded in a host JSON configuration.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Returns true when cooked blobs are persisted to disk.
    #[must_use]
    pub fn caching_enabled(&self) -> bool {
        self.cache_dir
            .as_ref()
            .is_some_and(|dir| !dir.as_os_str().is_empty())
    }

    /// Resolves a source path to the canonical string used as registry key.
    ///
    /// Returns `None` for an empty source. Relative paths are joined onto the
    /// asset root. Existing files are canonicalized. For missing ones, `.` and
    /// `..` are removed lexically and the deepest existing ancestor is
    /// canonicalized, so the key matches the one the file gets once it exists.
    #[must_use]
    pub fn resolve_source(&self, source: &str) -> Option<String> {
        let source = source.trim();
        if source.is_empty() {
            return None;
        }

        let path = Path::new(source);
        let joined = match &self.asset_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        };

        let resolved = match std::fs::canonicalize(&joined) {
            Ok(path) => path,
            Err(_) => resolve_missing(&joined)?,
        };
        Some(resolved.to_string_lossy().into_owned())
    }
}

fn resolve_missing(path: &Path) -> Option<PathBuf> {
    let absolute = normalize_lexically(&std::path::absolute(path).ok()?);
    let mut missing = Vec::new();
    let mut existing = absolute.as_path();
    loop {
        if let Ok(base) = std::fs::canonicalize(existing) {
            return Some(missing.iter().rev().fold(base, |acc, name| acc.join(name)));
        }
        missing.push(existing.file_name()?);
        existing = existing.parent()?;
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_disables_caching() {
        assert!(!CacheSettings::default().caching_enabled());
    }

    #[test]
    fn empty_cache_dir_disables_caching() {
        let settings = CacheSettings {
            cache_dir: Some(PathBuf::new()),
            asset_root: None,
        };
        assert!(!settings.caching_enabled());
    }

    #[test]
    fn empty_source_is_unresolvable() {
        let settings = CacheSettings::default();
        assert_eq!(settings.resolve_source(""), None);
        assert_eq!(settings.resolve_source("   "), None);
    }

    #[test]
    fn relative_source_joins_asset_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("rock.mesh"), b"x").unwrap();
        let settings = CacheSettings {
            cache_dir: None,
            asset_root: Some(dir.path().to_path_buf()),
        };

        let resolved = settings.resolve_source("rock.mesh").unwrap();
        let expected = std::fs::canonicalize(dir.path().join("rock.mesh")).unwrap();
        assert_eq!(resolved, expected.to_string_lossy());
    }

    #[test]
    fn missing_source_is_made_absolute() {
        let settings = CacheSettings::default();
        let resolved = settings.resolve_source("does/not/exist.mesh").unwrap();
        assert!(Path::new(&resolved).is_absolute());
        assert!(resolved.ends_with("exist.mesh"));
    }

    #[test]
    fn missing_source_matches_key_after_creation() {
        let dir = tempfile::tempdir().unwrap();
        let settings = CacheSettings::default();
        let spelled = dir.path().join("nested/../late.mesh");

        let before = settings.resolve_source(&spelled.to_string_lossy()).unwrap();
        assert!(!before.contains(".."));

        std::fs::write(dir.path().join("late.mesh"), b"x").unwrap();
        let after = settings
            .resolve_source(&dir.path().join("late.mesh").to_string_lossy())
            .unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn dot_components_are_dropped() {
        assert_eq!(
            normalize_lexically(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
        assert_eq!(normalize_lexically(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn json_round_trip() {
        let settings = CacheSettings {
            cache_dir: Some(PathBuf::from("/tmp/physx")),
            asset_root: None,
        };
        let text = serde_json::to_string(&settings).unwrap();
        assert_eq!(CacheSettings::from_json(&text).unwrap(), settings);
        assert_eq!(CacheSettings::from_json("{}").unwrap(), CacheSettings::default());
    }
}
