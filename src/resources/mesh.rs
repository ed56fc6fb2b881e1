use std::sync::Arc;

use super::Cooker;
use crate::assets::RawMeshData;
use crate::cooking::{ConvexFlags, ConvexMeshDesc, PhysicsBackend, TriangleMeshDesc};
use crate::errors::{CollisionError, CookedKind, Result};

/// Convex and triangle meshes cooked from one mesh file.
///
/// Both variants are independent: a mesh file referenced by a convex shape and
/// a triangle shape carries one cooked object of each kind.
pub struct PhysicsMesh<B: PhysicsBackend> {
    source: Option<String>,
    raw: Option<RawMeshData>,
    convex: Option<Arc<B::ConvexMesh>>,
    triangle: Option<Arc<B::TriangleMesh>>,
}

impl<B: PhysicsBackend> PhysicsMesh<B> {
    #[must_use]
    pub fn new(source: Option<String>) -> Self {
        Self {
            source,
            raw: None,
            convex: None,
            triangle: None,
        }
    }

    /// Resolved source path; `None` when the source could not be resolved.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Decoded mesh data, if it has been loaded.
    #[must_use]
    pub fn raw_data(&self) -> Option<&RawMeshData> {
        self.raw.as_ref()
    }

    #[must_use]
    pub fn has_convex_mesh(&self) -> bool {
        self.convex.is_some()
    }

    #[must_use]
    pub fn has_triangle_mesh(&self) -> bool {
        self.triangle.is_some()
    }

    /// Returns the convex mesh, cooking it on first use.
    pub fn convex_mesh(&mut self, cooker: Cooker<'_, B>) -> Option<Arc<B::ConvexMesh>> {
        if let Some(mesh) = &self.convex {
            return Some(Arc::clone(mesh));
        }
        let source = self.source.clone()?;
        let kind = CookedKind::ConvexMesh;

        let mesh = match cooker
            .cache
            .load(&source, kind, |blob| cooker.backend.create_convex_mesh(blob))
        {
            Some(mesh) => mesh,
            None => match self.cook_convex(cooker, &source) {
                Ok(mesh) => mesh,
                Err(e) => {
                    report_failure(kind, &source, &e);
                    return None;
                }
            },
        };

        let mesh = Arc::new(mesh);
        self.convex = Some(Arc::clone(&mesh));
        Some(mesh)
    }

    /// Returns the triangle mesh, cooking it on first use.
    pub fn triangle_mesh(&mut self, cooker: Cooker<'_, B>) -> Option<Arc<B::TriangleMesh>> {
        if let Some(mesh) = &self.triangle {
            return Some(Arc::clone(mesh));
        }
        let source = self.source.clone()?;
        let kind = CookedKind::TriangleMesh;

        let mesh = match cooker
            .cache
            .load(&source, kind, |blob| cooker.backend.create_triangle_mesh(blob))
        {
            Some(mesh) => mesh,
            None => match self.cook_triangle(cooker, &source) {
                Ok(mesh) => mesh,
                Err(e) => {
                    report_failure(kind, &source, &e);
                    return None;
                }
            },
        };

        let mesh = Arc::new(mesh);
        self.triangle = Some(Arc::clone(&mesh));
        Some(mesh)
    }

    fn cook_convex(&mut self, cooker: Cooker<'_, B>, source: &str) -> Result<B::ConvexMesh> {
        let kind = CookedKind::ConvexMesh;
        let raw = self.load_raw(source)?;
        let points = raw.positions();
        log::debug!("Prepare cooking {} verts from {source}", points.len());

        let blob = cooker.backend.cook_convex_mesh(&ConvexMeshDesc {
            points: &points,
            flags: ConvexFlags::COMPUTE_CONVEX,
        })?;
        cooker.cache.store(source, kind, &blob);

        let mesh = cooker
            .backend
            .create_convex_mesh(&blob)
            .ok_or_else(|| CollisionError::cooking(kind, "cooked blob was not accepted"))?;
        log::debug!("Created convex mesh from {source}");
        Ok(mesh)
    }

    fn cook_triangle(&mut self, cooker: Cooker<'_, B>, source: &str) -> Result<B::TriangleMesh> {
        let kind = CookedKind::TriangleMesh;
        let raw = self.load_raw(source)?;
        let points = raw.positions();
        let indices = raw.indices();
        log::debug!(
            "Prepare cooking {} verts {} idxs from {source}",
            points.len(),
            indices.len()
        );

        let blob = cooker.backend.cook_triangle_mesh(&TriangleMeshDesc {
            points: &points,
            triangles: &indices,
        })?;
        cooker.cache.store(source, kind, &blob);

        let mesh = cooker
            .backend
            .create_triangle_mesh(&blob)
            .ok_or_else(|| CollisionError::cooking(kind, "cooked blob was not accepted"))?;
        log::debug!("Created triangle mesh from {source}");
        Ok(mesh)
    }

    /// Decodes the mesh file once. Failures are not memoized.
    fn load_raw(&mut self, source: &str) -> Result<&RawMeshData> {
        let raw = match &mut self.raw {
            Some(raw) => raw,
            slot => slot.insert(RawMeshData::load(source)?),
        };
        Ok(raw)
    }
}

pub(super) fn report_failure(kind: CookedKind, source: &str, err: &CollisionError) {
    match err {
        CollisionError::ConfigurationMismatch(_) => {
            log::error!("Unsupported asset layout in {source}: {err}");
        }
        CollisionError::Cooking { .. } | CollisionError::DegenerateHeightField { .. } => {
            log::warn!("Could not create {kind} from {source}: {err}");
        }
        _ => log::warn!("Could not read {source} for {kind}: {err}"),
    }
}
