//! Height Field Tests
//!
//! Tests for:
//! - Brightness to height sample encoding
//! - Heightmap decoding into row-major sample grids
//! - Default extents policy and explicit extents
//! - Centering offset and scale factors of the built geometry
//! - Sharing one heightfield between shapes
//! - Disk cache round trip recovering grid dimensions

use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::Vec3;
use image::{GrayImage, ImageBuffer, Luma};
use myth_collision::assets::encode_height;
use myth_collision::{
    CacheSettings, CollisionAssets, GeometryState, HeightFieldShape, HeightSampleGrid,
    ShapeEvent, SoftwareBackend,
};

fn write_height_map(dir: &Path, name: &str, width: u32, height: u32) -> anyhow::Result<PathBuf> {
    let path = dir.join(name);
    let image = GrayImage::from_fn(width, height, |x, y| Luma([((x + y) % 256) as u8]));
    image.save(&path)?;
    Ok(path)
}

fn assets() -> CollisionAssets<SoftwareBackend> {
    CollisionAssets::new(SoftwareBackend::new(), CacheSettings::default())
}

// ============================================================================
// Sample Encoding
// ============================================================================

#[test]
fn mid_gray_encodes_zero() {
    assert_eq!(encode_height(0.5), 0);
}

#[test]
fn white_and_black_hit_the_range_limits() {
    assert_eq!(encode_height(1.0), 0x7FFF);
    assert_eq!(encode_height(0.0), -0x8000);
}

#[test]
fn encoding_is_monotonic() {
    let samples: Vec<i16> = (0..=255).map(|v| encode_height(v as f32 / 255.0)).collect();
    assert!(samples.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn grid_rows_follow_image_rows() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("ramp.png");
    GrayImage::from_fn(4, 2, |x, _| Luma([if x == 3 { 255 } else { 0 }])).save(&path)?;

    let grid = HeightSampleGrid::load(&path)?;
    assert_eq!((grid.rows(), grid.columns()), (2, 4));
    assert_eq!(grid.samples().len(), 8);
    for row in 0..2 {
        assert_eq!(grid.sample(row, 0).map(|s| s.height), Some(-0x8000));
        assert_eq!(grid.sample(row, 3).map(|s| s.height), Some(0x7FFF));
    }
    assert!(grid.samples().iter().all(|s| s.material_index0 == 0 && s.material_index1 == 0));
    assert_eq!(grid.sample(2, 0), None);
    Ok(())
}

#[test]
fn sixteen_bit_height_map_keeps_full_precision() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("terrain16.png");
    let raw = vec![0x8000, 0x80FE, 0x8000, 0x80FE];
    let image = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(2, 2, raw).expect("2x2 buffer");
    image.save(&path)?;

    let grid = HeightSampleGrid::load(&path)?;
    let low = grid.sample(0, 0).expect("sample").height;
    let high = grid.sample(0, 1).expect("sample").height;
    assert!(low.abs() <= 1, "low sample {low}");
    assert!((high - 254).abs() <= 1, "high sample {high}");
    assert_eq!(grid.sample(1, 0).map(|s| s.height), Some(low));
    Ok(())
}

#[test]
fn missing_image_is_not_found() {
    let err = HeightSampleGrid::load("/nowhere/hills.png").unwrap_err();
    assert!(matches!(err, myth_collision::CollisionError::AssetNotFound(_)));
}

// ============================================================================
// Default Extents
// ============================================================================

#[test]
fn wide_height_map_defaults_to_half_depth() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_height_map(dir.path(), "wide.png", 64, 32)?;
    let mut assets = assets();
    let mut shape = HeightFieldShape::new();
    shape.set_height_map(&mut assets, &path.to_string_lossy());
    shape.drain_events();

    let geometry = shape.geometry(&mut assets).expect("height field geometry");
    assert_eq!(geometry.field.rows, 32);
    assert_eq!(geometry.field.columns, 64);
    assert!((geometry.row_scale - 100.0 / 63.0).abs() < 1e-5);
    assert!((geometry.column_scale - 50.0 / 31.0).abs() < 1e-5);
    assert!((geometry.height_scale - 100.0 / 65536.0).abs() < 1e-9);

    assert_eq!(shape.extents(), Vec3::new(100.0, 100.0, 50.0));
    assert_eq!(shape.offset(), Vec3::new(-50.0, 0.0, -25.0));
    assert_eq!(shape.drain_events(), vec![ShapeEvent::ExtentsChanged]);
    assert_eq!(shape.state(), GeometryState::Clean);
    Ok(())
}

#[test]
fn square_height_map_keeps_uniform_extents() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_height_map(dir.path(), "square.png", 64, 64)?;
    let mut assets = assets();
    let mut shape = HeightFieldShape::new();
    shape.set_height_map(&mut assets, &path.to_string_lossy());
    shape.drain_events();

    assert!(shape.geometry(&mut assets).is_some());
    assert_eq!(shape.extents(), Vec3::splat(100.0));
    assert!(shape.drain_events().is_empty());
    Ok(())
}

#[test]
fn explicit_extents_suppress_defaults() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_height_map(dir.path(), "wide.png", 64, 32)?;
    let mut assets = assets();
    let mut shape = HeightFieldShape::new();
    shape.set_height_map(&mut assets, &path.to_string_lossy());
    assert!(shape.geometry(&mut assets).is_some());
    shape.drain_events();

    let extents = Vec3::new(10.0, 20.0, 30.0);
    shape.set_extents(extents);
    assert!(shape.extents_set_explicitly());
    assert_eq!(
        shape.drain_events(),
        vec![ShapeEvent::NeedsRebuild, ShapeEvent::ExtentsChanged]
    );
    assert_eq!(shape.state(), GeometryState::ScaleDirty);

    assert!(shape.geometry(&mut assets).is_some());
    assert_eq!(shape.extents(), extents);
    assert_eq!(shape.offset(), Vec3::new(-5.0, 0.0, -15.0));

    // A new map no longer recomputes the extents.
    let square = write_height_map(dir.path(), "square.png", 16, 16)?;
    shape.set_height_map(&mut assets, &square.to_string_lossy());
    assert!(shape.geometry(&mut assets).is_some());
    assert_eq!(shape.extents(), extents);
    assert!(!shape.drain_events().contains(&ShapeEvent::ExtentsChanged));
    Ok(())
}

#[test]
fn setting_equal_extents_still_pins_them() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_height_map(dir.path(), "wide.png", 64, 32)?;
    let mut assets = assets();
    let mut shape = HeightFieldShape::new();
    shape.set_extents(Vec3::splat(100.0));
    assert!(shape.drain_events().is_empty());

    shape.set_height_map(&mut assets, &path.to_string_lossy());
    assert!(shape.geometry(&mut assets).is_some());
    assert_eq!(shape.extents(), Vec3::splat(100.0));
    Ok(())
}

#[test]
fn scene_scale_multiplies_extents() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_height_map(dir.path(), "square.png", 8, 8)?;
    let mut assets = assets();
    let mut shape = HeightFieldShape::new();
    shape.set_height_map(&mut assets, &path.to_string_lossy());
    let field = Arc::clone(&shape.geometry(&mut assets).expect("geometry").field);

    shape.set_scene_scale(Vec3::new(2.0, 1.0, 0.5));
    assert_eq!(shape.state(), GeometryState::ScaleDirty);
    let geometry = shape.geometry(&mut assets).expect("geometry");
    assert!(Arc::ptr_eq(&field, &geometry.field));
    assert_eq!(shape.offset(), Vec3::new(-100.0, 0.0, -25.0));
    assert_eq!(assets.backend().stats().height_field_cooks, 1);
    Ok(())
}

#[test]
fn single_row_map_builds_no_geometry() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_height_map(dir.path(), "strip.png", 8, 1)?;
    let mut assets = assets();
    let mut shape = HeightFieldShape::new();
    shape.set_height_map(&mut assets, &path.to_string_lossy());

    assert!(shape.geometry(&mut assets).is_none());
    assert_ne!(shape.state(), GeometryState::Clean);
    let handle = shape.height_field_handle().expect("checked out");
    assert_eq!(assets.height_field_dimensions(handle), (1, 8));
    Ok(())
}

#[test]
fn missing_map_reports_no_geometry() {
    let mut assets = assets();
    let mut shape = HeightFieldShape::new();
    shape.set_height_map(&mut assets, "/nowhere/hills.png");
    assert!(shape.geometry(&mut assets).is_none());
    assert!(shape.geometry(&mut assets).is_none());
    assert_eq!(shape.state(), GeometryState::SourceDirty);
    assert_eq!(shape.extents(), Vec3::splat(100.0));
}

// ============================================================================
// Shared Height Fields
// ============================================================================

#[test]
fn shapes_on_one_map_share_offset_and_dimensions() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_height_map(dir.path(), "wide.png", 64, 32)?;
    let source = path.to_string_lossy();
    let mut assets = assets();

    let mut a = HeightFieldShape::new();
    let mut b = HeightFieldShape::new();
    a.set_height_map(&mut assets, &source);
    b.set_height_map(&mut assets, &source);
    assert_eq!(a.height_field_handle(), b.height_field_handle());

    let field_a = Arc::clone(&a.geometry(&mut assets).expect("geometry a").field);
    let field_b = Arc::clone(&b.geometry(&mut assets).expect("geometry b").field);
    assert!(Arc::ptr_eq(&field_a, &field_b));
    assert_eq!(a.offset(), b.offset());
    assert_eq!(assets.backend().stats().height_field_cooks, 1);

    let handle = a.height_field_handle().expect("checked out");
    assert_eq!(assets.height_field_ref_count(handle), 2);
    let resource = assets.height_field_resource(handle).expect("live resource");
    assert!(resource.has_height_field());
    a.release(&mut assets);
    assert_eq!(assets.height_field_ref_count(handle), 1);
    assert_eq!(assets.height_field_dimensions(handle), (32, 64));

    b.set_scene_scale(Vec3::splat(2.0));
    let geometry = b.geometry(&mut assets).expect("geometry b after release of a");
    assert!(Arc::ptr_eq(&field_b, &geometry.field));

    b.release(&mut assets);
    assert_eq!(assets.height_field_count(), 0);
    Ok(())
}

// ============================================================================
// Disk Cache
// ============================================================================

#[test]
fn cached_height_field_recovers_dimensions_without_image() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let cache_dir = dir.path().join("physx");
    let path = write_height_map(dir.path(), "wide.png", 64, 32)?;
    let source = path.to_string_lossy().into_owned();
    let settings = CacheSettings {
        cache_dir: Some(cache_dir.clone()),
        asset_root: None,
    };

    let cooked = {
        let mut assets = CollisionAssets::new(SoftwareBackend::new(), settings.clone());
        let handle = assets.acquire_height_field(&source);
        assets.height_field(handle).expect("cooked height field")
    };
    assert!(cache_dir.join("wide.png.heightfield_physx").is_file());
    std::fs::remove_file(&path)?;

    let mut assets = CollisionAssets::new(SoftwareBackend::new(), settings);
    let mut shape = HeightFieldShape::new();
    shape.set_height_map(&mut assets, &source);
    let geometry = shape.geometry(&mut assets).expect("geometry from cache");
    assert_eq!(*geometry.field, *cooked);
    assert_eq!(shape.extents(), Vec3::new(100.0, 100.0, 50.0));

    let handle = shape.height_field_handle().expect("checked out");
    assert_eq!(assets.height_field_dimensions(handle), (32, 64));
    assert_eq!(assets.backend().stats().height_field_cooks, 0);
    Ok(())
}

#[test]
fn failed_cache_write_keeps_height_field_available() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"a file, not a directory")?;
    let path = write_height_map(dir.path(), "wide.png", 64, 32)?;
    let mut assets = CollisionAssets::new(
        SoftwareBackend::new(),
        CacheSettings {
            cache_dir: Some(blocker.join("sub")),
            asset_root: None,
        },
    );
    assert!(assets.cache().is_enabled());

    let handle = assets.acquire_height_field(&path.to_string_lossy());
    let first = assets.height_field(handle).expect("cooked despite write failure");
    let second = assets.height_field(handle).expect("memoized height field");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(assets.backend().stats().height_field_cooks, 1);
    assert!(!blocker.join("sub").exists());
    Ok(())
}
