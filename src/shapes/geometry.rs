//! Engine geometry descriptors.
//!
//! A descriptor pairs a shared cooked object with the scale it is placed at.
//! Descriptors are never mutated; shapes replace them wholesale.

use std::sync::Arc;

use glam::Vec3;

/// A convex mesh placed at a per-axis scale.
#[derive(Debug)]
pub struct ConvexMeshGeometry<M> {
    pub mesh: Arc<M>,
    pub scale: Vec3,
}

/// A triangle mesh placed at a per-axis scale.
#[derive(Debug)]
pub struct TriangleMeshGeometry<M> {
    pub mesh: Arc<M>,
    pub scale: Vec3,
}

/// A heightfield and the factors mapping its samples into world units.
#[derive(Debug)]
pub struct HeightFieldGeometry<H> {
    pub field: Arc<H>,
    /// World units per height sample step.
    pub height_scale: f32,
    /// World distance between adjacent columns (x axis).
    pub row_scale: f32,
    /// World distance between adjacent rows (z axis).
    pub column_scale: f32,
}

impl<H> HeightFieldGeometry<H> {
    /// Scale factors spreading a `rows` by `columns` grid over `extents`.
    ///
    /// Returns `None` for grids with fewer than two rows or columns.
    #[must_use]
    pub fn new(field: Arc<H>, extents: Vec3, rows: u32, columns: u32) -> Option<Self> {
        if rows < 2 || columns < 2 {
            return None;
        }
        Some(Self {
            field,
            height_scale: extents.y / 65536.0,
            row_scale: extents.x / (columns - 1) as f32,
            column_scale: extents.z / (rows - 1) as f32,
        })
    }
}
