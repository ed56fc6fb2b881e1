//! Cooked Blob Cache
//!
//! Disk-backed cache of cooked collision blobs.
//!
//! # File naming
//!
//! - With a cache directory: `<cache_dir>/<source file name>.<ext>`
//! - Without one: `<full source path>.<ext>`, next to the source asset
//!
//! where `<ext>` is `mesh_physx`, `triangle_physx` or `heightfield_physx`.
//!
//! Lookups always happen; writes only happen when a cache directory is
//! configured. Blobs carry no version or checksum of their own, so a stale
//! file is only detected when the backend refuses to create an object from it.

use std::path::{Path, PathBuf};

use crate::errors::CookedKind;
use crate::settings::CacheSettings;

impl CookedKind {
    /// File extension of cached blobs of this kind.
    #[must_use]
    pub fn cache_extension(self) -> &'static str {
        match self {
            Self::ConvexMesh => "mesh_physx",
            Self::TriangleMesh => "triangle_physx",
            Self::HeightField => "heightfield_physx",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BlobCache {
    dir: Option<PathBuf>,
}

impl BlobCache {
    #[must_use]
    pub fn new(settings: &CacheSettings) -> Self {
        Self {
            dir: settings
                .caching_enabled()
                .then(|| settings.cache_dir.clone())
                .flatten(),
        }
    }

    /// Returns true when cooked blobs are written back to disk.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    #[must_use]
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Location of the cached blob of `kind` for `source`.
    #[must_use]
    pub fn blob_path(&self, source: &str, kind: CookedKind) -> PathBuf {
        let ext = kind.cache_extension();
        match &self.dir {
            Some(dir) => {
                let name = Path::new(source)
                    .file_name()
                    .map_or_else(|| source.into(), |n| n.to_string_lossy());
                dir.join(format!("{name}.{ext}"))
            }
            None => PathBuf::from(format!("{source}.{ext}")),
        }
    }

    /// Reads the cached blob for `source`, if one exists.
    #[must_use]
    pub fn read(&self, source: &str, kind: CookedKind) -> Option<Vec<u8>> {
        let path = self.blob_path(source, kind);
        match std::fs::read(&path) {
            Ok(blob) => Some(blob),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("Could not read cached {kind} {}: {e}", path.display());
                None
            }
        }
    }

    /// Read-through lookup: loads the cached blob and hands it to `create`.
    ///
    /// Returns `None` when there is no blob or `create` rejects it.
    pub fn load<T>(
        &self,
        source: &str,
        kind: CookedKind,
        create: impl FnOnce(&[u8]) -> Option<T>,
    ) -> Option<T> {
        let blob = self.read(source, kind)?;
        let path = self.blob_path(source, kind);
        let object = create(&blob);
        if object.is_some() {
            log::debug!("Read {kind} from cache file {}", path.display());
        } else {
            log::debug!(
                "Cache file {} holds no usable {kind}, cooking again",
                path.display()
            );
        }
        object
    }

    /// Write-through: persists a freshly cooked blob.
    ///
    /// Returns true when the blob was written. Failures are logged and
    /// otherwise ignored.
    pub fn store(&self, source: &str, kind: CookedKind, blob: &[u8]) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let path = self.blob_path(source, kind);
        let result = path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|()| std::fs::write(&path, blob));
        match result {
            Ok(()) => {
                log::debug!("Wrote {} bytes to {}", blob.len(), path.display());
                true
            }
            Err(e) => {
                log::warn!("Could not open {} for writing: {e}", path.display());
                false
            }
        }
    }
}
