//! Heightmap decoding into signed 16-bit elevation samples.

use std::path::Path;

use bytemuck::{Pod, Zeroable};

use crate::errors::{CollisionError, Result};

/// One heightfield sample as consumed by the cooking backend.
///
/// The two material indices are always zero; heightfields carry a single
/// material.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct HeightFieldSample {
    pub height: i16,
    pub material_index0: u8,
    pub material_index1: u8,
}

impl HeightFieldSample {
    #[must_use]
    pub fn new(height: i16) -> Self {
        Self {
            height,
            material_index0: 0,
            material_index1: 0,
        }
    }
}

/// Pixel accessor over a decoded heightmap image.
pub trait HeightMapImage {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Brightness of the pixel at `(column, row)` in `[0, 1]`.
    fn brightness(&self, column: u32, row: u32) -> f32;
}

/// Float view of a decoded image. 16-bit sources keep their full precision.
impl HeightMapImage for image::Rgba32FImage {
    fn width(&self) -> u32 {
        image::ImageBuffer::width(self)
    }

    fn height(&self) -> u32 {
        image::ImageBuffer::height(self)
    }

    /// HSV value of the pixel: the largest of its color channels.
    fn brightness(&self, column: u32, row: u32) -> f32 {
        let [r, g, b, _] = self.get_pixel(column, row).0;
        r.max(g).max(b).clamp(0.0, 1.0)
    }
}

/// Encodes a brightness in `[0, 1]` as a height centered on mid-gray.
#[inline]
#[must_use]
pub fn encode_height(brightness: f32) -> i16 {
    let scaled = (f32::from(u16::MAX) * (brightness - 0.5)).round();
    scaled.clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16
}

/// A row-major grid of elevation samples; columns vary fastest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightSampleGrid {
    rows: u32,
    columns: u32,
    samples: Vec<HeightFieldSample>,
}

impl HeightSampleGrid {
    /// Decodes the image at `path` into a sample grid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CollisionError::AssetNotFound(path.display().to_string()));
        }
        let image = image::open(path)?.into_rgba32f();
        let grid = Self::from_image(&image);
        log::debug!(
            "Decoded height map {}: {} columns x {} rows",
            path.display(),
            grid.columns,
            grid.rows
        );
        Ok(grid)
    }

    /// Samples every pixel of `image`; image rows become grid rows.
    #[must_use]
    pub fn from_image(image: &impl HeightMapImage) -> Self {
        let rows = image.height();
        let columns = image.width();
        let mut samples = Vec::with_capacity(rows as usize * columns as usize);
        for row in 0..rows {
            for column in 0..columns {
                samples.push(HeightFieldSample::new(encode_height(
                    image.brightness(column, row),
                )));
            }
        }
        Self {
            rows,
            columns,
            samples,
        }
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    #[must_use]
    pub fn samples(&self) -> &[HeightFieldSample] {
        &self.samples
    }

    #[must_use]
    pub fn sample(&self, row: u32, column: u32) -> Option<HeightFieldSample> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.samples
            .get(row as usize * self.columns as usize + column as usize)
            .copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.columns == 0
    }
}
