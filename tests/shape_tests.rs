//! Mesh Shape Tests
//!
//! Tests for:
//! - Geometry state transitions of convex and triangle mesh shapes
//! - Change events on source and scale mutations
//! - Resource checkout bookkeeping when sources change or shapes release
//! - Unavailable meshes leaving the shape dirty

use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::Vec3;
use myth_collision::{
    CacheSettings, CollisionAssets, ConvexMeshShape, GeometryState, MeshFile, ShapeEvent,
    SoftwareBackend, TriangleMeshShape,
};

fn write_tetrahedron(dir: &Path, name: &str, size: f32) -> anyhow::Result<PathBuf> {
    let path = dir.join(name);
    let points = [
        Vec3::ZERO,
        Vec3::new(size, 0.0, 0.0),
        Vec3::new(0.0, size, 0.0),
        Vec3::new(0.0, 0.0, size),
    ];
    MeshFile::from_positions(&points, &[0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3]).save(&path)?;
    Ok(path)
}

fn assets() -> CollisionAssets<SoftwareBackend> {
    CollisionAssets::new(SoftwareBackend::new(), CacheSettings::default())
}

// ============================================================================
// Convex Mesh Shape
// ============================================================================

#[test]
fn new_shape_has_no_geometry() {
    let mut assets = assets();
    let mut shape = ConvexMeshShape::<SoftwareBackend>::new();
    assert_eq!(shape.state(), GeometryState::SourceDirty);
    assert!(shape.geometry(&mut assets).is_none());
    assert!(shape.mesh_handle().is_none());
    assert!(shape.drain_events().is_empty());
}

#[test]
fn setting_source_emits_rebuild_and_source_events() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let source = write_tetrahedron(dir.path(), "tet.mesh", 1.0)?;
    let source = source.to_string_lossy();
    let mut assets = assets();
    let mut shape = ConvexMeshShape::new();

    shape.set_mesh_source(&mut assets, &source);
    assert_eq!(
        shape.drain_events(),
        vec![ShapeEvent::NeedsRebuild, ShapeEvent::SourceChanged]
    );
    assert_eq!(shape.mesh_source(), source);

    shape.set_mesh_source(&mut assets, &source);
    assert!(shape.drain_events().is_empty());
    assert_eq!(assets.mesh_count(), 1);
    Ok(())
}

#[test]
fn geometry_is_built_once_until_dirty() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let source = write_tetrahedron(dir.path(), "tet.mesh", 1.0)?;
    let mut assets = assets();
    let mut shape = ConvexMeshShape::new();
    shape.set_mesh_source(&mut assets, &source.to_string_lossy());

    let first = Arc::clone(&shape.geometry(&mut assets).expect("geometry").mesh);
    assert_eq!(shape.state(), GeometryState::Clean);
    let again = Arc::clone(&shape.geometry(&mut assets).expect("geometry").mesh);
    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(assets.backend().stats().convex_cooks, 1);
    Ok(())
}

#[test]
fn scale_change_rebuilds_descriptor_around_same_mesh() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let source = write_tetrahedron(dir.path(), "tet.mesh", 1.0)?;
    let mut assets = assets();
    let mut shape = ConvexMeshShape::new();
    shape.set_mesh_source(&mut assets, &source.to_string_lossy());
    let mesh = Arc::clone(&shape.geometry(&mut assets).expect("geometry").mesh);
    shape.drain_events();

    let scale = Vec3::new(2.0, 3.0, 4.0);
    shape.set_scene_scale(scale);
    assert_eq!(shape.state(), GeometryState::ScaleDirty);
    assert_eq!(shape.drain_events(), vec![ShapeEvent::NeedsRebuild]);

    let geometry = shape.geometry(&mut assets).expect("rescaled geometry");
    assert_eq!(geometry.scale, scale);
    assert!(Arc::ptr_eq(&mesh, &geometry.mesh));

    shape.set_scene_scale(scale);
    assert_eq!(shape.state(), GeometryState::Clean);
    assert!(shape.drain_events().is_empty());
    Ok(())
}

#[test]
fn changing_source_releases_previous_mesh() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let small = write_tetrahedron(dir.path(), "small.mesh", 1.0)?;
    let large = write_tetrahedron(dir.path(), "large.mesh", 5.0)?;
    let mut assets = assets();
    let mut shape = ConvexMeshShape::new();

    shape.set_mesh_source(&mut assets, &small.to_string_lossy());
    let first = shape.mesh_handle().expect("checked out");
    assert!(shape.geometry(&mut assets).is_some());

    shape.set_mesh_source(&mut assets, &large.to_string_lossy());
    assert_eq!(shape.state(), GeometryState::SourceDirty);
    assert_eq!(assets.mesh_count(), 1);
    assert!(assets.mesh(first).is_none());

    let geometry = shape.geometry(&mut assets).expect("geometry");
    assert_eq!(geometry.mesh.bounds_max, Vec3::splat(5.0));

    shape.release(&mut assets);
    assert_eq!(assets.mesh_count(), 0);
    assert!(shape.mesh_handle().is_none());
    Ok(())
}

#[test]
fn shapes_sharing_a_source_share_the_mesh() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let source = write_tetrahedron(dir.path(), "tet.mesh", 1.0)?;
    let source = source.to_string_lossy();
    let mut assets = assets();
    let mut a = ConvexMeshShape::new();
    let mut b = ConvexMeshShape::new();
    a.set_mesh_source(&mut assets, &source);
    b.set_mesh_source(&mut assets, &source);

    let mesh_a = Arc::clone(&a.geometry(&mut assets).expect("geometry a").mesh);
    a.release(&mut assets);
    let mesh_b = Arc::clone(&b.geometry(&mut assets).expect("geometry b").mesh);
    assert!(Arc::ptr_eq(&mesh_a, &mesh_b));
    assert_eq!(assets.backend().stats().convex_cooks, 1);
    Ok(())
}

// ============================================================================
// Triangle Mesh Shape
// ============================================================================

#[test]
fn triangle_shape_builds_triangle_geometry() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let source = write_tetrahedron(dir.path(), "tet.mesh", 1.0)?;
    let mut assets = assets();
    let mut shape = TriangleMeshShape::new();
    shape.set_mesh_source(&mut assets, &source.to_string_lossy());

    let geometry = shape.geometry(&mut assets).expect("geometry");
    assert_eq!(geometry.mesh.triangles.len(), 4);
    assert_eq!(geometry.scale, Vec3::ONE);
    assert_eq!(assets.backend().stats().convex_cooks, 0);
    Ok(())
}

#[test]
fn corrupt_source_keeps_shape_dirty_until_fixed() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("tet.mesh");
    std::fs::write(&source, b"garbage")?;
    let mut assets = assets();
    let mut shape = TriangleMeshShape::new();
    shape.set_mesh_source(&mut assets, &source.to_string_lossy());

    assert!(shape.geometry(&mut assets).is_none());
    assert!(shape.geometry(&mut assets).is_none());
    assert_eq!(shape.state(), GeometryState::SourceDirty);

    write_tetrahedron(dir.path(), "tet.mesh", 1.0)?;
    assert!(shape.geometry(&mut assets).is_some());
    assert_eq!(shape.state(), GeometryState::Clean);
    Ok(())
}
