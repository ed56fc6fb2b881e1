//! Collision Asset Context
//!
//! [`CollisionAssets`] owns everything shared between collision shapes: the
//! cooking backend, the blob cache and one registry per resource kind. A
//! scene builds one context and hands it to every shape it constructs;
//! dropping the context tears all resources down with it.
//!
//! # Handles
//!
//! [`MeshHandle`] and [`HeightFieldHandle`] are slotmap keys returned by the
//! `acquire_*` methods. Each acquire must be paired with exactly one release.
//! A released handle never aliases a resource created later.

use std::sync::Arc;

use slotmap::new_key_type;

use crate::cache::BlobCache;
use crate::cooking::PhysicsBackend;
use crate::registry::ResourceRegistry;
use crate::resources::{Cooker, PhysicsHeightField, PhysicsMesh};
use crate::settings::CacheSettings;

new_key_type! {
    pub struct MeshHandle;
    pub struct HeightFieldHandle;
}

pub struct CollisionAssets<B: PhysicsBackend> {
    backend: B,
    settings: CacheSettings,
    cache: BlobCache,
    meshes: ResourceRegistry<MeshHandle, PhysicsMesh<B>>,
    height_fields: ResourceRegistry<HeightFieldHandle, PhysicsHeightField<B>>,
}

impl<B: PhysicsBackend> CollisionAssets<B> {
    #[must_use]
    pub fn new(backend: B, settings: CacheSettings) -> Self {
        let cache = BlobCache::new(&settings);
        match cache.dir() {
            Some(dir) => log::debug!("Physics cache enabled at {}", dir.display()),
            None => log::debug!("Physics cache disabled"),
        }
        Self {
            backend,
            settings,
            cache,
            meshes: ResourceRegistry::new(),
            height_fields: ResourceRegistry::new(),
        }
    }

    /// Builds a context configured from the process environment.
    #[must_use]
    pub fn from_env(backend: B) -> Self {
        Self::new(backend, CacheSettings::from_env())
    }

    #[inline]
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    #[must_use]
    pub fn cache(&self) -> &BlobCache {
        &self.cache
    }

    // ========================================================================
    // Meshes
    // ========================================================================

    /// Checks out the mesh resource for `source`.
    ///
    /// Never fails: an unresolvable source yields a private resource whose
    /// cooked objects are always unavailable.
    pub fn acquire_mesh(&mut self, source: &str) -> MeshHandle {
        let path = self.settings.resolve_source(source);
        if path.is_none() {
            log::warn!("Mesh source {source:?} cannot be resolved");
        }
        self.meshes
            .acquire(path.as_deref(), || PhysicsMesh::new(path.clone()))
    }

    /// Returns one checkout of `handle`. Returns true when this destroyed the
    /// resource.
    pub fn release_mesh(&mut self, handle: MeshHandle) -> bool {
        let destroyed = self.meshes.release(handle);
        if let Some(mesh) = &destroyed {
            log::debug!("Destroyed mesh resource {:?}", mesh.source());
        }
        destroyed.is_some()
    }

    #[must_use]
    pub fn mesh(&self, handle: MeshHandle) -> Option<&PhysicsMesh<B>> {
        self.meshes.get(handle)
    }

    /// Convex mesh of `handle`, cooked or read from the cache on first use.
    pub fn convex_mesh(&mut self, handle: MeshHandle) -> Option<Arc<B::ConvexMesh>> {
        let cooker = Cooker {
            backend: &self.backend,
            cache: &self.cache,
        };
        self.meshes.get_mut(handle)?.convex_mesh(cooker)
    }

    /// Triangle mesh of `handle`, cooked or read from the cache on first use.
    pub fn triangle_mesh(&mut self, handle: MeshHandle) -> Option<Arc<B::TriangleMesh>> {
        let cooker = Cooker {
            backend: &self.backend,
            cache: &self.cache,
        };
        self.meshes.get_mut(handle)?.triangle_mesh(cooker)
    }

    #[must_use]
    pub fn mesh_ref_count(&self, handle: MeshHandle) -> u32 {
        self.meshes.ref_count(handle)
    }

    /// Number of live mesh resources.
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    // ========================================================================
    // Height Fields
    // ========================================================================

    /// Checks out the heightfield resource for `source`.
    pub fn acquire_height_field(&mut self, source: &str) -> HeightFieldHandle {
        let path = self.settings.resolve_source(source);
        if path.is_none() {
            log::warn!("Height field source {source:?} cannot be resolved");
        }
        self.height_fields
            .acquire(path.as_deref(), || PhysicsHeightField::new(path.clone()))
    }

    /// Returns one checkout of `handle`. Returns true when this destroyed the
    /// resource.
    pub fn release_height_field(&mut self, handle: HeightFieldHandle) -> bool {
        let destroyed = self.height_fields.release(handle);
        if let Some(field) = &destroyed {
            log::debug!("Destroyed height field resource {:?}", field.source());
        }
        destroyed.is_some()
    }

    #[must_use]
    pub fn height_field_resource(
        &self,
        handle: HeightFieldHandle,
    ) -> Option<&PhysicsHeightField<B>> {
        self.height_fields.get(handle)
    }

    /// Heightfield of `handle`, cooked or read from the cache on first use.
    pub fn height_field(&mut self, handle: HeightFieldHandle) -> Option<Arc<B::HeightField>> {
        let cooker = Cooker {
            backend: &self.backend,
            cache: &self.cache,
        };
        self.height_fields.get_mut(handle)?.height_field(cooker)
    }

    /// `(rows, columns)` of the heightfield, `(0, 0)` until it has been loaded.
    #[must_use]
    pub fn height_field_dimensions(&self, handle: HeightFieldHandle) -> (u32, u32) {
        self.height_fields
            .get(handle)
            .map_or((0, 0), |f| (f.rows(), f.columns()))
    }

    #[must_use]
    pub fn height_field_ref_count(&self, handle: HeightFieldHandle) -> u32 {
        self.height_fields.ref_count(handle)
    }

    /// Number of live heightfield resources.
    #[must_use]
    pub fn height_field_count(&self) -> usize {
        self.height_fields.len()
    }
}
