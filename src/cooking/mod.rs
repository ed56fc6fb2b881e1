//! Cooking Backend Contract
//!
//! The physics engine that consumes cooked collision data is an external
//! collaborator. This module defines what the cache needs from it:
//!
//! - **Cooking**: turn a point/triangle/sample description into an opaque
//!   serialized blob ([`PhysicsBackend::cook_convex_mesh`] and friends).
//! - **Creation**: turn a blob back into an engine object
//!   ([`PhysicsBackend::create_convex_mesh`] and friends). Creation must fail
//!   (return `None`) for blobs it cannot understand, which is how stale disk
//!   cache files are detected.
//!
//! [`SoftwareBackend`] is a pure-Rust implementation of this contract used by
//! tools and tests.

pub mod software;

use bitflags::bitflags;
use glam::Vec3;

use crate::assets::{HeightFieldSample, Indices};
use crate::errors::Result;

pub use software::{
    BackendStats, CookedConvexMesh, CookedHeightField, CookedTriangleMesh, SoftwareBackend,
};

bitflags! {
    /// Options for convex mesh cooking.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConvexFlags: u32 {
        /// Compute the hull from the point cloud instead of expecting a
        /// ready-made hull.
        const COMPUTE_CONVEX = 1 << 0;
    }
}

/// Input of convex mesh cooking.
#[derive(Debug, Clone, Copy)]
pub struct ConvexMeshDesc<'a> {
    pub points: &'a [Vec3],
    pub flags: ConvexFlags,
}

/// Input of triangle mesh cooking.
#[derive(Debug, Clone, Copy)]
pub struct TriangleMeshDesc<'a> {
    pub points: &'a [Vec3],
    /// Index triples, in the width the mesh was loaded with.
    pub triangles: &'a Indices,
}

impl TriangleMeshDesc<'_> {
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }
}

/// Input of heightfield cooking.
#[derive(Debug, Clone, Copy)]
pub struct HeightFieldDesc<'a> {
    pub rows: u32,
    pub columns: u32,
    /// Row-major samples, `rows * columns` long.
    pub samples: &'a [HeightFieldSample],
}

/// The native physics engine, as seen by the cooking cache.
pub trait PhysicsBackend {
    type ConvexMesh;
    type TriangleMesh;
    type HeightField;

    fn cook_convex_mesh(&self, desc: &ConvexMeshDesc<'_>) -> Result<Vec<u8>>;
    fn cook_triangle_mesh(&self, desc: &TriangleMeshDesc<'_>) -> Result<Vec<u8>>;
    fn cook_height_field(&self, desc: &HeightFieldDesc<'_>) -> Result<Vec<u8>>;

    fn create_convex_mesh(&self, blob: &[u8]) -> Option<Self::ConvexMesh>;
    fn create_triangle_mesh(&self, blob: &[u8]) -> Option<Self::TriangleMesh>;
    fn create_height_field(&self, blob: &[u8]) -> Option<Self::HeightField>;

    /// Row count recorded in a heightfield object.
    fn height_field_rows(&self, field: &Self::HeightField) -> u32;
    /// Column count recorded in a heightfield object.
    fn height_field_columns(&self, field: &Self::HeightField) -> u32;
}
