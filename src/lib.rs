//! # Myth Collision
//!
//! Loading, cooking and caching of collision resources for the Myth engine.
//!
//! Source assets (mesh files and heightmap images) are decoded into raw
//! geometry, cooked by a [`PhysicsBackend`] into engine objects, and kept in
//! two cache tiers:
//!
//! - **Memory**: one resource per canonical source path, shared by every shape
//!   that references it and destroyed when the last shape releases it.
//! - **Disk**: cooked blobs written next to the asset or into a configured
//!   cache directory, so later runs skip decoding and cooking entirely.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use myth_collision::{CollisionAssets, ConvexMeshShape, SoftwareBackend};
//!
//! let mut assets = CollisionAssets::from_env(SoftwareBackend::new());
//!
//! let mut shape = ConvexMeshShape::new();
//! shape.set_mesh_source(&mut assets, "models/rock.mesh");
//! if let Some(geometry) = shape.geometry(&mut assets) {
//!     println!("hull with {} points", geometry.mesh.points.len());
//! }
//! shape.release(&mut assets);
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod assets;
pub mod assets_server;
pub mod cache;
pub mod cooking;
pub mod errors;
pub mod material;
pub mod registry;
pub mod resources;
pub mod settings;
pub mod shapes;

pub use assets::{HeightFieldSample, HeightSampleGrid, MeshFile, RawMeshData};
pub use assets_server::{CollisionAssets, HeightFieldHandle, MeshHandle};
pub use cache::BlobCache;
pub use cooking::{PhysicsBackend, SoftwareBackend};
pub use errors::{CollisionError, CookedKind, Result};
pub use material::PhysicsMaterial;
pub use registry::ResourceRegistry;
pub use settings::CacheSettings;
pub use shapes::{
    ConvexMeshGeometry, ConvexMeshShape, GeometryState, HeightFieldGeometry, HeightFieldShape,
    ShapeEvent, TriangleMeshGeometry, TriangleMeshShape,
};
