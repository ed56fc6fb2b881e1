//! Pure-Rust reference implementation of [`PhysicsBackend`].
//!
//! Blobs are framed as `magic [u8; 4] | version u32 | payload`, little endian.
//! A blob with the wrong magic, version or length is rejected on creation.

use std::cell::Cell;

use glam::Vec3;
use rustc_hash::FxHashSet;

use super::{ConvexFlags, ConvexMeshDesc, HeightFieldDesc, PhysicsBackend, TriangleMeshDesc};
use crate::assets::{HeightFieldSample, Indices};
use crate::errors::{CollisionError, CookedKind, Result};

const CONVEX_MAGIC: [u8; 4] = *b"CVXM";
const TRIANGLE_MAGIC: [u8; 4] = *b"TRIM";
const HEIGHT_FIELD_MAGIC: [u8; 4] = *b"HFLD";
const BLOB_VERSION: u32 = 1;

/// Relative tolerance below which a point set is considered flat.
const FLATNESS_EPSILON: f32 = 1e-6;

/// A cooked convex hull.
#[derive(Debug, Clone, PartialEq)]
pub struct CookedConvexMesh {
    pub points: Vec<Vec3>,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
}

/// A cooked triangle mesh with 32-bit indices.
#[derive(Debug, Clone, PartialEq)]
pub struct CookedTriangleMesh {
    pub points: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

/// A cooked heightfield.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookedHeightField {
    pub rows: u32,
    pub columns: u32,
    pub samples: Vec<HeightFieldSample>,
}

/// Cook and create call counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendStats {
    pub convex_cooks: u32,
    pub triangle_cooks: u32,
    pub height_field_cooks: u32,
    pub convex_creates: u32,
    pub triangle_creates: u32,
    pub height_field_creates: u32,
}

/// Reference cooking backend.
#[derive(Debug, Default)]
pub struct SoftwareBackend {
    stats: Cell<BackendStats>,
}

impl SoftwareBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stats(&self) -> BackendStats {
        self.stats.get()
    }

    fn record(&self, f: impl FnOnce(&mut BackendStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}

impl PhysicsBackend for SoftwareBackend {
    type ConvexMesh = CookedConvexMesh;
    type TriangleMesh = CookedTriangleMesh;
    type HeightField = CookedHeightField;

    fn cook_convex_mesh(&self, desc: &ConvexMeshDesc<'_>) -> Result<Vec<u8>> {
        let err = |reason: &str| CollisionError::cooking(CookedKind::ConvexMesh, reason);
        if !desc.flags.contains(ConvexFlags::COMPUTE_CONVEX) {
            return Err(err("only COMPUTE_CONVEX cooking is supported"));
        }
        if desc.points.iter().any(|p| !p.is_finite()) {
            return Err(err("non-finite point"));
        }

        let mut seen = FxHashSet::default();
        let points: Vec<Vec3> = desc
            .points
            .iter()
            .copied()
            .filter(|p| seen.insert(p.to_array().map(f32::to_bits)))
            .collect();
        if points.len() < 4 {
            return Err(err("fewer than 4 distinct points"));
        }
        if is_flat(&points) {
            return Err(err("points do not span a volume"));
        }

        let mut blob = BlobWriter::new(CONVEX_MAGIC);
        blob.u32(points.len() as u32);
        for p in &points {
            blob.vec3(*p);
        }
        self.record(|s| s.convex_cooks += 1);
        Ok(blob.finish())
    }

    fn cook_triangle_mesh(&self, desc: &TriangleMeshDesc<'_>) -> Result<Vec<u8>> {
        let err = |reason: String| CollisionError::cooking(CookedKind::TriangleMesh, reason);
        let triangle_count = desc.triangle_count();
        if triangle_count == 0 {
            return Err(err("mesh has no triangles".to_string()));
        }

        let indices: Vec<u32> = match desc.triangles {
            Indices::U16(v) => v.iter().map(|&i| u32::from(i)).collect(),
            Indices::U32(v) => v.clone(),
        };
        let vertex_count = desc.points.len();
        if let Some(bad) = indices[..triangle_count * 3]
            .iter()
            .find(|&&i| i as usize >= vertex_count)
        {
            return Err(err(format!(
                "index {bad} out of range for {vertex_count} vertices"
            )));
        }

        let mut blob = BlobWriter::new(TRIANGLE_MAGIC);
        blob.u32(vertex_count as u32);
        blob.u32(triangle_count as u32);
        for p in desc.points {
            blob.vec3(*p);
        }
        for &i in &indices[..triangle_count * 3] {
            blob.u32(i);
        }
        self.record(|s| s.triangle_cooks += 1);
        Ok(blob.finish())
    }

    fn cook_height_field(&self, desc: &HeightFieldDesc<'_>) -> Result<Vec<u8>> {
        if desc.rows == 0 || desc.columns == 0 {
            return Err(CollisionError::DegenerateHeightField {
                rows: desc.rows,
                columns: desc.columns,
            });
        }
        let expected = desc.rows as usize * desc.columns as usize;
        if desc.samples.len() != expected {
            return Err(CollisionError::cooking(
                CookedKind::HeightField,
                format!("expected {expected} samples, got {}", desc.samples.len()),
            ));
        }

        let mut blob = BlobWriter::new(HEIGHT_FIELD_MAGIC);
        blob.u32(desc.rows);
        blob.u32(desc.columns);
        for sample in desc.samples {
            blob.bytes(&sample.height.to_le_bytes());
            blob.bytes(&[sample.material_index0, sample.material_index1]);
        }
        self.record(|s| s.height_field_cooks += 1);
        Ok(blob.finish())
    }

    fn create_convex_mesh(&self, blob: &[u8]) -> Option<CookedConvexMesh> {
        let mut r = BlobReader::open(blob, CONVEX_MAGIC)?;
        let count = r.u32()? as usize;
        let points = (0..count).map(|_| r.vec3()).collect::<Option<Vec<_>>>()?;
        r.finish()?;

        let bounds_min = points.iter().copied().fold(Vec3::splat(f32::MAX), Vec3::min);
        let bounds_max = points.iter().copied().fold(Vec3::splat(f32::MIN), Vec3::max);
        self.record(|s| s.convex_creates += 1);
        Some(CookedConvexMesh {
            points,
            bounds_min,
            bounds_max,
        })
    }

    fn create_triangle_mesh(&self, blob: &[u8]) -> Option<CookedTriangleMesh> {
        let mut r = BlobReader::open(blob, TRIANGLE_MAGIC)?;
        let vertex_count = r.u32()? as usize;
        let triangle_count = r.u32()? as usize;
        let points = (0..vertex_count)
            .map(|_| r.vec3())
            .collect::<Option<Vec<_>>>()?;
        let triangles = (0..triangle_count)
            .map(|_| Some([r.u32()?, r.u32()?, r.u32()?]))
            .collect::<Option<Vec<_>>>()?;
        r.finish()?;

        self.record(|s| s.triangle_creates += 1);
        Some(CookedTriangleMesh { points, triangles })
    }

    fn create_height_field(&self, blob: &[u8]) -> Option<CookedHeightField> {
        let mut r = BlobReader::open(blob, HEIGHT_FIELD_MAGIC)?;
        let rows = r.u32()?;
        let columns = r.u32()?;
        let count = rows as usize * columns as usize;
        let samples = (0..count)
            .map(|_| {
                let [h0, h1, m0, m1] = r.array::<4>()?;
                Some(HeightFieldSample {
                    height: i16::from_le_bytes([h0, h1]),
                    material_index0: m0,
                    material_index1: m1,
                })
            })
            .collect::<Option<Vec<_>>>()?;
        r.finish()?;

        self.record(|s| s.height_field_creates += 1);
        Some(CookedHeightField {
            rows,
            columns,
            samples,
        })
    }

    fn height_field_rows(&self, field: &CookedHeightField) -> u32 {
        field.rows
    }

    fn height_field_columns(&self, field: &CookedHeightField) -> u32 {
        field.columns
    }
}

/// True when all points lie (nearly) on one plane.
fn is_flat(points: &[Vec3]) -> bool {
    let p0 = points[0];
    let Some(p1) = points
        .iter()
        .copied()
        .max_by(|a, b| a.distance_squared(p0).total_cmp(&b.distance_squared(p0)))
    else {
        return true;
    };
    let extent = p1.distance(p0);
    if extent <= f32::EPSILON {
        return true;
    }

    let axis = (p1 - p0) / extent;
    let Some(p2) = points.iter().copied().max_by(|a, b| {
        axis.cross(*a - p0)
            .length_squared()
            .total_cmp(&axis.cross(*b - p0).length_squared())
    }) else {
        return true;
    };
    let normal = axis.cross(p2 - p0);
    if normal.length() <= FLATNESS_EPSILON * extent {
        return true;
    }

    let normal = normal.normalize();
    points
        .iter()
        .all(|p| normal.dot(*p - p0).abs() <= FLATNESS_EPSILON * extent)
}

struct BlobWriter {
    data: Vec<u8>,
}

impl BlobWriter {
    fn new(magic: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(64);
        data.extend_from_slice(&magic);
        data.extend_from_slice(&BLOB_VERSION.to_le_bytes());
        Self { data }
    }

    fn bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    fn u32(&mut self, v: u32) {
        self.bytes(&v.to_le_bytes());
    }

    fn vec3(&mut self, v: Vec3) {
        for c in v.to_array() {
            self.bytes(&c.to_le_bytes());
        }
    }

    fn finish(self) -> Vec<u8> {
        self.data
    }
}

struct BlobReader<'a> {
    data: &'a [u8],
}

impl<'a> BlobReader<'a> {
    fn open(blob: &'a [u8], magic: [u8; 4]) -> Option<Self> {
        let mut r = Self { data: blob };
        if r.array::<4>()? != magic || r.u32()? != BLOB_VERSION {
            return None;
        }
        Some(r)
    }

    fn array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let (head, tail) = self.data.split_first_chunk::<N>()?;
        self.data = tail;
        Some(*head)
    }

    fn u32(&mut self) -> Option<u32> {
        self.array().map(u32::from_le_bytes)
    }

    fn vec3(&mut self) -> Option<Vec3> {
        let x = f32::from_le_bytes(self.array()?);
        let y = f32::from_le_bytes(self.array()?);
        let z = f32::from_le_bytes(self.array()?);
        Some(Vec3::new(x, y, z))
    }

    /// Trailing bytes mean the blob was not written by this backend.
    fn finish(self) -> Option<()> {
        self.data.is_empty().then_some(())
    }
}
