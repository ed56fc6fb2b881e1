//! Raw mesh data extracted from a mesh file for cooking.
//!
//! The vertex layout is validated once at decode time; afterwards positions and
//! indices are read through typed accessors instead of raw byte offsets.

use std::path::Path;

use glam::Vec3;

use super::mesh_file::{ComponentType, MeshFile, POSITION_ATTRIBUTE};
use crate::errors::{CollisionError, Result};

/// Width of one index element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexWidth {
    U16,
    U32,
}

impl IndexWidth {
    #[must_use]
    pub fn byte_size(self) -> usize {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

/// Index data in its loaded width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indices {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl Indices {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn width(&self) -> IndexWidth {
        match self {
            Self::U16(_) => IndexWidth::U16,
            Self::U32(_) => IndexWidth::U32,
        }
    }
}

/// Vertex and index buffers of a decoded mesh, ready for cooking.
#[derive(Debug, Clone)]
pub struct RawMeshData {
    vertex_stride: usize,
    vertex_count: usize,
    vertex_bytes: Vec<u8>,
    position_offset: usize,
    index_width: IndexWidth,
    index_count: usize,
    index_bytes: Vec<u8>,
}

impl RawMeshData {
    /// Reads and validates the mesh file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mesh = MeshFile::load(path)?;

        log::debug!(
            "Loaded mesh from {}: {} attrs, {} bytes, stride {}, {} verts, {} subsets",
            path.display(),
            mesh.vertex_buffer.entries.len(),
            mesh.vertex_buffer.data.len(),
            mesh.vertex_buffer.stride,
            mesh.vertex_buffer.vertex_count(),
            mesh.subsets.len(),
        );
        for entry in &mesh.vertex_buffer.entries {
            log::debug!(
                "  attr {} {:?} x{} offset {}",
                entry.name,
                entry.component_type,
                entry.component_count,
                entry.offset
            );
        }
        if let Some(sub) = mesh.subsets.first() {
            log::debug!(
                "  subset {} count {} offset {} bounds {:?}..{:?}",
                sub.name,
                sub.count,
                sub.offset,
                sub.bounds_min,
                sub.bounds_max
            );
        }

        Self::from_mesh_file(mesh)
    }

    /// Validates the attribute layout of a decoded mesh file.
    ///
    /// Every attribute must be 32-bit float and a position attribute with at
    /// least three components must fit inside one vertex.
    pub fn from_mesh_file(mesh: MeshFile) -> Result<Self> {
        let vb = mesh.vertex_buffer;
        if let Some(entry) = vb
            .entries
            .iter()
            .find(|e| e.component_type != ComponentType::Float32)
        {
            return Err(CollisionError::ConfigurationMismatch(format!(
                "attribute {} has component type {:?}, expected Float32",
                entry.name, entry.component_type
            )));
        }

        let position = vb.entry(POSITION_ATTRIBUTE).ok_or_else(|| {
            CollisionError::ConfigurationMismatch(format!(
                "mesh has no {POSITION_ATTRIBUTE} attribute"
            ))
        })?;
        if position.component_count < 3 {
            return Err(CollisionError::ConfigurationMismatch(format!(
                "position attribute has {} components",
                position.component_count
            )));
        }

        let vertex_stride = vb.stride as usize;
        let position_offset = position.offset as usize;
        if position_offset + 12 > vertex_stride {
            return Err(CollisionError::ConfigurationMismatch(format!(
                "position offset {position_offset} + 12 exceeds stride {vertex_stride}"
            )));
        }

        let vertex_count = vb.data.len() / vertex_stride;
        let ib = mesh.index_buffer;
        let index_width = match ib.component_type {
            ComponentType::UnsignedInt16 => IndexWidth::U16,
            ComponentType::UnsignedInt32 => IndexWidth::U32,
            other => {
                return Err(CollisionError::ConfigurationMismatch(format!(
                    "index type {other:?} is not 16 or 32 bit"
                )));
            }
        };
        let index_count = ib.data.len() / index_width.byte_size();

        Ok(Self {
            vertex_stride,
            vertex_count,
            vertex_bytes: vb.data,
            position_offset,
            index_width,
            index_count,
            index_bytes: ib.data,
        })
    }

    #[inline]
    #[must_use]
    pub fn vertex_stride(&self) -> usize {
        self.vertex_stride
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    #[inline]
    #[must_use]
    pub fn position_offset(&self) -> usize {
        self.position_offset
    }

    #[inline]
    #[must_use]
    pub fn index_width(&self) -> IndexWidth {
        self.index_width
    }

    #[inline]
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.index_count
    }

    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.index_count / 3
    }

    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        &self.vertex_bytes
    }

    /// Position of vertex `i`.
    #[must_use]
    pub fn position(&self, i: usize) -> Option<Vec3> {
        if i >= self.vertex_count {
            return None;
        }
        let start = self.vertex_stride * i + self.position_offset;
        let bytes = self.vertex_bytes.get(start..start + 12)?;
        let xyz: [f32; 3] = bytemuck::pod_read_unaligned(bytes);
        Some(Vec3::from_array(xyz))
    }

    /// All vertex positions, tightly packed.
    #[must_use]
    pub fn positions(&self) -> Vec<Vec3> {
        (0..self.vertex_count)
            .filter_map(|i| self.position(i))
            .collect()
    }

    /// The index buffer in its loaded width.
    #[must_use]
    pub fn indices(&self) -> Indices {
        match self.index_width {
            IndexWidth::U16 => Indices::U16(bytemuck::pod_collect_to_vec(&self.index_bytes)),
            IndexWidth::U32 => Indices::U32(bytemuck::pod_collect_to_vec(&self.index_bytes)),
        }
    }
}
