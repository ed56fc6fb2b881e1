//! Collision Shapes
//!
//! A shape turns a cooked resource plus its scale or extents into an engine
//! geometry descriptor. Descriptors are immutable: any change to the source
//! or the scale discards the current descriptor, and the next call to
//! `geometry()` builds a fresh one.
//!
//! # State
//!
//! Each shape tracks a [`GeometryState`]. A source change needs the cooked
//! object to be fetched again; a scale change only needs a new descriptor
//! around the cooked object already held. When the cooked object is
//! unavailable, `geometry()` returns `None` and the shape stays dirty so the
//! caller can retry on its next update.
//!
//! # Events
//!
//! Mutations queue [`ShapeEvent`]s. `NeedsRebuild` asks the owner to rebuild
//! the physics body; `ExtentsChanged` and `SourceChanged` report property
//! changes. Owners collect them with `drain_events()`.
//!
//! # Lifetime
//!
//! Shapes hold handles into a [`CollisionAssets`](crate::CollisionAssets)
//! context and must be torn down with `release()` against that same context.

mod convex_mesh;
mod geometry;
mod height_field;
mod triangle_mesh;

pub use convex_mesh::ConvexMeshShape;
pub use geometry::{ConvexMeshGeometry, HeightFieldGeometry, TriangleMeshGeometry};
pub use height_field::{DEFAULT_EXTENT, HeightFieldShape};
pub use triangle_mesh::TriangleMeshShape;

use glam::Vec3;

use crate::assets_server::{CollisionAssets, MeshHandle};
use crate::cooking::PhysicsBackend;

/// Tolerance for scale and extent comparisons.
pub(crate) const FUZZY_EPSILON: f32 = 1e-5;

/// Whether a shape's geometry descriptor matches its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryState {
    /// The descriptor is current.
    Clean,
    /// Only the scale changed; the cooked object is still valid.
    ScaleDirty,
    /// The source changed, or no descriptor has been built yet.
    #[default]
    SourceDirty,
}

/// Change notifications raised by shape mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeEvent {
    /// The owning body must rebuild its physics shape.
    NeedsRebuild,
    SourceChanged,
    ExtentsChanged,
}

/// Bookkeeping shared by every shape kind.
#[derive(Debug)]
pub(crate) struct ShapeState {
    state: GeometryState,
    scene_scale: Vec3,
    events: Vec<ShapeEvent>,
}

impl Default for ShapeState {
    fn default() -> Self {
        Self {
            state: GeometryState::default(),
            scene_scale: Vec3::ONE,
            events: Vec::new(),
        }
    }
}

impl ShapeState {
    pub(crate) fn state(&self) -> GeometryState {
        self.state
    }

    pub(crate) fn is_clean(&self) -> bool {
        self.state == GeometryState::Clean
    }

    pub(crate) fn mark_clean(&mut self) {
        self.state = GeometryState::Clean;
    }

    pub(crate) fn mark_source_dirty(&mut self) {
        self.state = GeometryState::SourceDirty;
    }

    pub(crate) fn mark_scale_dirty(&mut self) {
        if self.state == GeometryState::Clean {
            self.state = GeometryState::ScaleDirty;
        }
    }

    pub(crate) fn scene_scale(&self) -> Vec3 {
        self.scene_scale
    }

    /// Returns true when the scale actually changed.
    pub(crate) fn set_scene_scale(&mut self, scale: Vec3) -> bool {
        if self.scene_scale.abs_diff_eq(scale, FUZZY_EPSILON) {
            return false;
        }
        self.scene_scale = scale;
        self.mark_scale_dirty();
        self.emit(ShapeEvent::NeedsRebuild);
        true
    }

    pub(crate) fn emit(&mut self, event: ShapeEvent) {
        self.events.push(event);
    }

    pub(crate) fn drain_events(&mut self) -> Vec<ShapeEvent> {
        std::mem::take(&mut self.events)
    }
}

/// A shape's checkout of a mesh resource.
#[derive(Debug, Default)]
pub(crate) struct MeshSource {
    source: String,
    handle: Option<MeshHandle>,
}

impl MeshSource {
    pub(crate) fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn handle(&self) -> Option<MeshHandle> {
        self.handle
    }

    /// Swaps the checked-out resource. Returns false when `source` is
    /// already the current source.
    pub(crate) fn set<B: PhysicsBackend>(
        &mut self,
        assets: &mut CollisionAssets<B>,
        source: &str,
    ) -> bool {
        if self.source == source && (self.handle.is_some() || source.is_empty()) {
            return false;
        }
        let old = self.handle.replace(assets.acquire_mesh(source));
        if let Some(old) = old {
            assets.release_mesh(old);
        }
        self.source = source.to_string();
        true
    }

    pub(crate) fn release<B: PhysicsBackend>(&mut self, assets: &mut CollisionAssets<B>) {
        if let Some(handle) = self.handle.take() {
            assets.release_mesh(handle);
        }
    }
}
