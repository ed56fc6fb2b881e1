//! Cooked collision resources.
//!
//! A resource owns everything derived from one source asset: the decoded raw
//! data and the engine objects cooked from it. Each derived value is computed
//! lazily, memoized, and only discarded together with the resource.
//!
//! Lookup order for every cooked object:
//! 1. the memoized object
//! 2. the disk cache
//! 3. decode the source asset and cook

pub mod height_field;
pub mod mesh;

pub use height_field::PhysicsHeightField;
pub use mesh::PhysicsMesh;

use crate::cache::BlobCache;
use crate::cooking::PhysicsBackend;

/// Everything a resource needs to produce a cooked object.
pub struct Cooker<'a, B: PhysicsBackend> {
    pub backend: &'a B,
    pub cache: &'a BlobCache,
}

impl<B: PhysicsBackend> Clone for Cooker<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: PhysicsBackend> Copy for Cooker<'_, B> {}
