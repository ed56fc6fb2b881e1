//! Error Types
//!
//! This module defines the error types used throughout the collision cache.
//!
//! # Overview
//!
//! The main error type [`CollisionError`] covers every failure mode of the
//! loading and cooking pipeline:
//! - Source assets that are missing, unreadable or format-invalid
//! - Disk cache I/O failures
//! - Cooking failures reported by the physics backend
//! - Asset pipeline mismatches (unsupported vertex attribute layouts)
//!
//! # Usage
//!
//! Internal steps return [`Result<T>`]. The cooked-object accessors on
//! [`CollisionAssets`](crate::CollisionAssets) collapse these errors into an
//! `Option` after logging them, so callers only ever test for availability.

use thiserror::Error;

/// The kind of cooked object a cooking step was producing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CookedKind {
    ConvexMesh,
    TriangleMesh,
    HeightField,
}

impl std::fmt::Display for CookedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ConvexMesh => "convex mesh",
            Self::TriangleMesh => "triangle mesh",
            Self::HeightField => "height field",
        };
        f.write_str(name)
    }
}

/// The main error type for collision resource loading and cooking.
#[derive(Error, Debug)]
pub enum CollisionError {
    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// The source path is empty, unresolvable or does not exist.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// The mesh file could not be parsed.
    #[error("Mesh format error: {0}")]
    MeshFormat(String),

    /// The heightmap image could not be decoded.
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// The asset uses a layout this pipeline does not support.
    #[error("Configuration mismatch: {0}")]
    ConfigurationMismatch(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================================================
    // Cooking Errors
    // ========================================================================
    /// The backend rejected a cooking description.
    #[error("Failed to cook {kind}: {reason}")]
    Cooking {
        /// What was being cooked
        kind: CookedKind,
        /// Backend supplied reason
        reason: String,
    },

    /// A heightmap decoded to an empty grid.
    #[error("Degenerate height field: {rows} rows x {columns} columns")]
    DegenerateHeightField {
        /// Number of sample rows
        rows: u32,
        /// Number of sample columns
        columns: u32,
    },

    /// Settings could not be parsed.
    #[error("Settings parse error: {0}")]
    Settings(#[from] serde_json::Error),
}

impl CollisionError {
    pub(crate) fn cooking(kind: CookedKind, reason: impl Into<String>) -> Self {
        Self::Cooking {
            kind,
            reason: reason.into(),
        }
    }
}

impl From<image::ImageError> for CollisionError {
    fn from(err: image::ImageError) -> Self {
        CollisionError::ImageDecode(err.to_string())
    }
}

/// Alias for `Result<T, CollisionError>`.
pub type Result<T> = std::result::Result<T, CollisionError>;
