//! Source asset decoding.
//!
//! Turns on-disk assets into the raw inputs of the cooking step:
//! - [`mesh_file`]: the binary mesh container
//! - [`raw_mesh`]: validated vertex/index buffers extracted from a mesh file
//! - [`height_map`]: heightmap images sampled into 16-bit elevation grids

pub mod height_map;
pub mod mesh_file;
pub mod raw_mesh;

pub use height_map::{HeightFieldSample, HeightMapImage, HeightSampleGrid, encode_height};
pub use mesh_file::{ComponentType, MeshFile, MeshSubset, POSITION_ATTRIBUTE, VertexEntry};
pub use raw_mesh::{IndexWidth, Indices, RawMeshData};
