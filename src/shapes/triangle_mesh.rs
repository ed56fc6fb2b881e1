use glam::Vec3;

use super::{GeometryState, MeshSource, ShapeEvent, ShapeState, TriangleMeshGeometry};
use crate::assets_server::{CollisionAssets, MeshHandle};
use crate::cooking::PhysicsBackend;

/// A collision shape using the triangles of a mesh file.
///
/// Engines only accept triangle meshes on static and kinematic bodies.
pub struct TriangleMeshShape<B: PhysicsBackend> {
    mesh: MeshSource,
    shape: ShapeState,
    geometry: Option<TriangleMeshGeometry<B::TriangleMesh>>,
}

impl<B: PhysicsBackend> Default for TriangleMeshShape<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: PhysicsBackend> TriangleMeshShape<B> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            mesh: MeshSource::default(),
            shape: ShapeState::default(),
            geometry: None,
        }
    }

    #[must_use]
    pub fn mesh_source(&self) -> &str {
        self.mesh.source()
    }

    #[must_use]
    pub fn mesh_handle(&self) -> Option<MeshHandle> {
        self.mesh.handle()
    }

    /// Points the shape at a new mesh file, releasing the previous one.
    pub fn set_mesh_source(&mut self, assets: &mut CollisionAssets<B>, source: &str) {
        if !self.mesh.set(assets, source) {
            return;
        }
        self.geometry = None;
        self.shape.mark_source_dirty();
        self.shape.emit(ShapeEvent::NeedsRebuild);
        self.shape.emit(ShapeEvent::SourceChanged);
    }

    /// Scale inherited from the scene node the shape is attached to.
    #[must_use]
    pub fn scene_scale(&self) -> Vec3 {
        self.shape.scene_scale()
    }

    pub fn set_scene_scale(&mut self, scale: Vec3) {
        self.shape.set_scene_scale(scale);
    }

    #[must_use]
    pub fn state(&self) -> GeometryState {
        self.shape.state()
    }

    /// The current descriptor, rebuilding it when dirty.
    pub fn geometry(
        &mut self,
        assets: &mut CollisionAssets<B>,
    ) -> Option<&TriangleMeshGeometry<B::TriangleMesh>> {
        if !self.shape.is_clean() || self.geometry.is_none() {
            self.rebuild(assets);
        }
        self.geometry.as_ref()
    }

    fn rebuild(&mut self, assets: &mut CollisionAssets<B>) {
        let previous = self.geometry.take();
        let mesh = match (self.shape.state(), previous) {
            (GeometryState::ScaleDirty, Some(previous)) => Some(previous.mesh),
            _ => self.mesh.handle().and_then(|h| assets.triangle_mesh(h)),
        };
        let Some(mesh) = mesh else {
            return;
        };
        self.geometry = Some(TriangleMeshGeometry {
            mesh,
            scale: self.shape.scene_scale(),
        });
        self.shape.mark_clean();
    }

    pub fn drain_events(&mut self) -> Vec<ShapeEvent> {
        self.shape.drain_events()
    }

    /// Drops the descriptor and returns the mesh checkout.
    pub fn release(&mut self, assets: &mut CollisionAssets<B>) {
        self.geometry = None;
        self.mesh.release(assets);
        self.shape.mark_source_dirty();
    }
}
