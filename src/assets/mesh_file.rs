//! Mesh Binary Format
//!
//! Reader and writer for the engine's binary mesh container. A mesh file holds
//! one interleaved vertex buffer described by a list of named attributes, one
//! index buffer and a list of draw subsets.
//!
//! # Layout (little endian)
//!
//! ```text
//! magic            [u8; 4] = "MYMS"
//! version          u32     = 1
//! vertex_stride    u32
//! entry_count      u32
//!   name_len       u16, name [u8; name_len] (UTF-8)
//!   component_type u8
//!   component_count u8
//!   offset         u32
//! vertex_data_len  u32, vertex_data [u8; vertex_data_len]
//! index_type       u8
//! index_data_len   u32, index_data [u8; index_data_len]
//! subset_count     u32
//!   name_len       u16, name [u8; name_len]
//!   count          u32
//!   offset         u32
//!   bounds_min     [f32; 3]
//!   bounds_max     [f32; 3]
//! ```

use std::io::Write;
use std::path::Path;

use glam::Vec3;

use crate::errors::{CollisionError, Result};

const MAGIC: [u8; 4] = *b"MYMS";
const VERSION: u32 = 1;

/// Name of the vertex attribute holding positions.
pub const POSITION_ATTRIBUTE: &str = "attr_pos";

/// Scalar type of a vertex attribute or index component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ComponentType {
    UnsignedInt8 = 1,
    Int8 = 2,
    UnsignedInt16 = 3,
    Int16 = 4,
    UnsignedInt32 = 5,
    Int32 = 6,
    UnsignedInt64 = 7,
    Int64 = 8,
    Float16 = 9,
    Float32 = 10,
    Float64 = 11,
}

impl ComponentType {
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            1 => Self::UnsignedInt8,
            2 => Self::Int8,
            3 => Self::UnsignedInt16,
            4 => Self::Int16,
            5 => Self::UnsignedInt32,
            6 => Self::Int32,
            7 => Self::UnsignedInt64,
            8 => Self::Int64,
            9 => Self::Float16,
            10 => Self::Float32,
            11 => Self::Float64,
            _ => return None,
        })
    }

    /// Size of one component in bytes.
    #[must_use]
    pub fn byte_size(self) -> usize {
        match self {
            Self::UnsignedInt8 | Self::Int8 => 1,
            Self::UnsignedInt16 | Self::Int16 | Self::Float16 => 2,
            Self::UnsignedInt32 | Self::Int32 | Self::Float32 => 4,
            Self::UnsignedInt64 | Self::Int64 | Self::Float64 => 8,
        }
    }
}

/// One named attribute inside the interleaved vertex buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexEntry {
    pub name: String,
    pub component_type: ComponentType,
    pub component_count: u8,
    /// Byte offset inside one vertex.
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VertexBuffer {
    pub stride: u32,
    pub entries: Vec<VertexEntry>,
    pub data: Vec<u8>,
}

impl VertexBuffer {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.data.len() / self.stride as usize
        }
    }

    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&VertexEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexBuffer {
    pub component_type: ComponentType,
    pub data: Vec<u8>,
}

impl IndexBuffer {
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.data.len() / self.component_type.byte_size()
    }
}

/// A draw range of the mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSubset {
    pub name: String,
    pub count: u32,
    pub offset: u32,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
}

/// A decoded mesh file.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshFile {
    pub vertex_buffer: VertexBuffer,
    pub index_buffer: IndexBuffer,
    pub subsets: Vec<MeshSubset>,
}

impl MeshFile {
    /// Builds a mesh file from tightly packed positions and 32-bit indices.
    #[must_use]
    pub fn from_positions(positions: &[Vec3], indices: &[u32]) -> Self {
        let (min, max) = positions.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );
        Self {
            vertex_buffer: VertexBuffer {
                stride: 12,
                entries: vec![VertexEntry {
                    name: POSITION_ATTRIBUTE.to_string(),
                    component_type: ComponentType::Float32,
                    component_count: 3,
                    offset: 0,
                }],
                data: bytemuck::cast_slice(positions).to_vec(),
            },
            index_buffer: IndexBuffer {
                component_type: ComponentType::UnsignedInt32,
                data: bytemuck::cast_slice(indices).to_vec(),
            },
            subsets: vec![MeshSubset {
                name: "default".to_string(),
                count: indices.len() as u32,
                offset: 0,
                bounds_min: min,
                bounds_max: max,
            }],
        }
    }

    /// Loads and decodes a mesh file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CollisionError::AssetNotFound(path.display().to_string()));
        }
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Decodes a mesh file from memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = ByteReader::new(bytes);

        if r.take(4)? != MAGIC {
            return Err(CollisionError::MeshFormat("bad magic".to_string()));
        }
        let version = r.u32()?;
        if version != VERSION {
            return Err(CollisionError::MeshFormat(format!(
                "unsupported version {version}"
            )));
        }

        let stride = r.u32()?;
        let entry_count = r.u32()?;
        let mut entries = Vec::with_capacity(entry_count.min(64) as usize);
        for _ in 0..entry_count {
            let name = r.string()?;
            let component_type = r.component_type()?;
            let component_count = r.u8()?;
            let offset = r.u32()?;
            entries.push(VertexEntry {
                name,
                component_type,
                component_count,
                offset,
            });
        }
        let vertex_len = r.u32()? as usize;
        let vertex_data = r.take(vertex_len)?.to_vec();

        let index_type = r.component_type()?;
        let index_len = r.u32()? as usize;
        let index_data = r.take(index_len)?.to_vec();

        let subset_count = r.u32()?;
        let mut subsets = Vec::with_capacity(subset_count.min(64) as usize);
        for _ in 0..subset_count {
            subsets.push(MeshSubset {
                name: r.string()?,
                count: r.u32()?,
                offset: r.u32()?,
                bounds_min: r.vec3()?,
                bounds_max: r.vec3()?,
            });
        }

        let mesh = Self {
            vertex_buffer: VertexBuffer {
                stride,
                entries,
                data: vertex_data,
            },
            index_buffer: IndexBuffer {
                component_type: index_type,
                data: index_data,
            },
            subsets,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    fn validate(&self) -> Result<()> {
        let vb = &self.vertex_buffer;
        if vb.stride == 0 {
            return Err(CollisionError::MeshFormat("zero vertex stride".to_string()));
        }
        if vb.data.len() % vb.stride as usize != 0 {
            return Err(CollisionError::MeshFormat(format!(
                "vertex data length {} is not a multiple of stride {}",
                vb.data.len(),
                vb.stride
            )));
        }
        for entry in &vb.entries {
            let end = entry.offset as usize
                + entry.component_type.byte_size() * entry.component_count as usize;
            if end > vb.stride as usize {
                return Err(CollisionError::MeshFormat(format!(
                    "attribute {} ends at byte {end}, past stride {}",
                    entry.name, vb.stride
                )));
            }
        }

        let ib = &self.index_buffer;
        if !matches!(
            ib.component_type,
            ComponentType::UnsignedInt16 | ComponentType::UnsignedInt32
        ) {
            return Err(CollisionError::MeshFormat(format!(
                "unsupported index type {:?}",
                ib.component_type
            )));
        }
        if ib.data.len() % ib.component_type.byte_size() != 0 {
            return Err(CollisionError::MeshFormat(
                "truncated index buffer".to_string(),
            ));
        }
        Ok(())
    }

    /// Encodes the mesh into its binary representation.
    pub fn write_to(&self, w: &mut impl Write) -> std::io::Result<()> {
        let vb = &self.vertex_buffer;
        w.write_all(&MAGIC)?;
        w.write_all(&VERSION.to_le_bytes())?;
        w.write_all(&vb.stride.to_le_bytes())?;
        w.write_all(&(vb.entries.len() as u32).to_le_bytes())?;
        for entry in &vb.entries {
            write_string(w, &entry.name)?;
            w.write_all(&[entry.component_type as u8, entry.component_count])?;
            w.write_all(&entry.offset.to_le_bytes())?;
        }
        w.write_all(&(vb.data.len() as u32).to_le_bytes())?;
        w.write_all(&vb.data)?;

        let ib = &self.index_buffer;
        w.write_all(&[ib.component_type as u8])?;
        w.write_all(&(ib.data.len() as u32).to_le_bytes())?;
        w.write_all(&ib.data)?;

        w.write_all(&(self.subsets.len() as u32).to_le_bytes())?;
        for subset in &self.subsets {
            write_string(w, &subset.name)?;
            w.write_all(&subset.count.to_le_bytes())?;
            w.write_all(&subset.offset.to_le_bytes())?;
            w.write_all(bytemuck::cast_slice(&subset.bounds_min.to_array()))?;
            w.write_all(bytemuck::cast_slice(&subset.bounds_max.to_array()))?;
        }
        Ok(())
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut out);
        out
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_bytes())?;
        Ok(())
    }
}

fn write_string(w: &mut impl Write, s: &str) -> std::io::Result<()> {
    w.write_all(&(s.len() as u16).to_le_bytes())?;
    w.write_all(s.as_bytes())
}

struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                CollisionError::MeshFormat(format!(
                    "unexpected end of file at byte {} (wanted {len} more)",
                    self.pos
                ))
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.array()?))
    }

    fn vec3(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(self.f32()?, self.f32()?, self.f32()?))
    }

    fn string(&mut self) -> Result<String> {
        let len = self.u16()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| CollisionError::MeshFormat("attribute name is not UTF-8".to_string()))
    }

    fn component_type(&mut self) -> Result<ComponentType> {
        let raw = self.u8()?;
        ComponentType::from_u8(raw)
            .ok_or_else(|| CollisionError::MeshFormat(format!("unknown component type {raw}")))
    }
}
