use glam::Vec3;

use super::{FUZZY_EPSILON, GeometryState, HeightFieldGeometry, ShapeEvent, ShapeState};
use crate::assets_server::{CollisionAssets, HeightFieldHandle};
use crate::cooking::PhysicsBackend;

/// Span of the longer horizontal axis when extents are left at their default.
pub const DEFAULT_EXTENT: f32 = 100.0;

/// A collision shape built from a heightmap image.
///
/// Unless extents are set explicitly, they default to [`DEFAULT_EXTENT`] on
/// every axis for a square heightmap. For a non-square one the shorter
/// horizontal axis is reduced so the field keeps the image's aspect ratio.
///
/// The heightfield grid starts at its local origin, so [`offset`](Self::offset)
/// reports the translation that centers it.
pub struct HeightFieldShape<B: PhysicsBackend> {
    source: String,
    handle: Option<HeightFieldHandle>,
    extents: Vec3,
    extents_explicit: bool,
    offset: Vec3,
    shape: ShapeState,
    geometry: Option<HeightFieldGeometry<B::HeightField>>,
}

impl<B: PhysicsBackend> Default for HeightFieldShape<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: PhysicsBackend> HeightFieldShape<B> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: String::new(),
            handle: None,
            extents: Vec3::splat(DEFAULT_EXTENT),
            extents_explicit: false,
            offset: Vec3::ZERO,
            shape: ShapeState::default(),
            geometry: None,
        }
    }

    #[must_use]
    pub fn height_map(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn height_field_handle(&self) -> Option<HeightFieldHandle> {
        self.handle
    }

    /// Points the shape at a new heightmap, releasing the previous one.
    pub fn set_height_map(&mut self, assets: &mut CollisionAssets<B>, source: &str) {
        if self.source == source && (self.handle.is_some() || source.is_empty()) {
            return;
        }
        let old = self.handle.replace(assets.acquire_height_field(source));
        if let Some(old) = old {
            assets.release_height_field(old);
        }
        self.source = source.to_string();

        self.geometry = None;
        self.shape.mark_source_dirty();
        self.shape.emit(ShapeEvent::NeedsRebuild);
        self.shape.emit(ShapeEvent::SourceChanged);
    }

    #[must_use]
    pub fn extents(&self) -> Vec3 {
        self.extents
    }

    /// Fixes the extents. Automatic defaults are never computed again.
    pub fn set_extents(&mut self, extents: Vec3) {
        self.extents_explicit = true;
        if self.extents.abs_diff_eq(extents, FUZZY_EPSILON) {
            return;
        }
        self.extents = extents;
        self.shape.mark_scale_dirty();
        self.shape.emit(ShapeEvent::NeedsRebuild);
        self.shape.emit(ShapeEvent::ExtentsChanged);
    }

    #[must_use]
    pub fn extents_set_explicitly(&self) -> bool {
        self.extents_explicit
    }

    /// Translation centering the grid on the shape origin, as of the last
    /// successful `geometry()` call.
    #[must_use]
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

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
    ///
    /// Returns `None` while the heightfield is unavailable or has fewer than
    /// two rows or columns.
    pub fn geometry(
        &mut self,
        assets: &mut CollisionAssets<B>,
    ) -> Option<&HeightFieldGeometry<B::HeightField>> {
        if !self.shape.is_clean() || self.geometry.is_none() {
            self.rebuild(assets);
        }
        self.geometry.as_ref()
    }

    fn rebuild(&mut self, assets: &mut CollisionAssets<B>) {
        self.geometry = None;
        let Some(handle) = self.handle else {
            return;
        };

        let field = assets.height_field(handle);
        let (rows, columns) = assets.height_field_dimensions(handle);
        self.update_extents(rows, columns);

        let Some(field) = field else {
            return;
        };
        let scaled = self.extents * self.shape.scene_scale();
        let Some(geometry) = HeightFieldGeometry::new(field, scaled, rows, columns) else {
            log::warn!(
                "Height field {} has {columns} x {rows} samples, needs at least 2 x 2",
                self.source
            );
            return;
        };
        self.offset = Vec3::new(-scaled.x / 2.0, 0.0, -scaled.z / 2.0);
        log::debug!("Created height field geometry with extents {scaled} for {columns} x {rows}");

        self.geometry = Some(geometry);
        self.shape.mark_clean();
    }

    /// Recomputes default extents from the grid's aspect ratio.
    fn update_extents(&mut self, rows: u32, columns: u32) {
        if self.extents_explicit || rows == 0 || columns == 0 {
            return;
        }
        let extents = default_extents(rows, columns);
        if extents != self.extents {
            self.extents = extents;
            self.shape.emit(ShapeEvent::ExtentsChanged);
        }
    }

    pub fn drain_events(&mut self) -> Vec<ShapeEvent> {
        self.shape.drain_events()
    }

    /// Drops the descriptor and returns the heightfield checkout.
    pub fn release(&mut self, assets: &mut CollisionAssets<B>) {
        self.geometry = None;
        if let Some(handle) = self.handle.take() {
            assets.release_height_field(handle);
        }
        self.shape.mark_source_dirty();
    }
}

fn default_extents(rows: u32, columns: u32) -> Vec3 {
    match rows.cmp(&columns) {
        std::cmp::Ordering::Equal => Vec3::splat(DEFAULT_EXTENT),
        std::cmp::Ordering::Less => {
            let f = rows as f32 / columns as f32;
            Vec3::new(DEFAULT_EXTENT, DEFAULT_EXTENT, DEFAULT_EXTENT * f)
        }
        std::cmp::Ordering::Greater => {
            let f = columns as f32 / rows as f32;
            Vec3::new(DEFAULT_EXTENT * f, DEFAULT_EXTENT, DEFAULT_EXTENT)
        }
    }
}
