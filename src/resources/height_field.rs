use std::sync::Arc;

use super::Cooker;
use super::mesh::report_failure;
use crate::assets::HeightSampleGrid;
use crate::cooking::{HeightFieldDesc, PhysicsBackend};
use crate::errors::{CollisionError, CookedKind, Result};

/// A heightfield cooked from one heightmap image.
pub struct PhysicsHeightField<B: PhysicsBackend> {
    source: Option<String>,
    samples: Option<HeightSampleGrid>,
    field: Option<Arc<B::HeightField>>,
    rows: u32,
    columns: u32,
}

impl<B: PhysicsBackend> PhysicsHeightField<B> {
    #[must_use]
    pub fn new(source: Option<String>) -> Self {
        Self {
            source,
            samples: None,
            field: None,
            rows: 0,
            columns: 0,
        }
    }

    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Sample rows; zero until the heightfield or its image has been loaded.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Sample columns; zero until the heightfield or its image has been loaded.
    #[inline]
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    #[must_use]
    pub fn has_height_field(&self) -> bool {
        self.field.is_some()
    }

    /// The decoded sample grid, decoding the image on first use.
    pub fn samples(&mut self) -> Option<&HeightSampleGrid> {
        let source = self.source.clone()?;
        match self.load_samples(&source) {
            Ok(grid) => Some(grid),
            Err(e) => {
                report_failure(CookedKind::HeightField, &source, &e);
                None
            }
        }
    }

    /// Returns the heightfield, cooking it on first use.
    pub fn height_field(&mut self, cooker: Cooker<'_, B>) -> Option<Arc<B::HeightField>> {
        if let Some(field) = &self.field {
            return Some(Arc::clone(field));
        }
        let source = self.source.clone()?;
        let kind = CookedKind::HeightField;

        let field = match cooker
            .cache
            .load(&source, kind, |blob| cooker.backend.create_height_field(blob))
        {
            Some(field) => {
                // The cached path never decodes the image, so the dimensions
                // come from the heightfield itself.
                self.rows = cooker.backend.height_field_rows(&field);
                self.columns = cooker.backend.height_field_columns(&field);
                log::debug!(
                    "Read height field from cache, dimensions {} x {}",
                    self.columns,
                    self.rows
                );
                field
            }
            None => match self.cook(cooker, &source) {
                Ok(field) => field,
                Err(e) => {
                    report_failure(kind, &source, &e);
                    return None;
                }
            },
        };

        let field = Arc::new(field);
        self.field = Some(Arc::clone(&field));
        Some(field)
    }

    fn cook(&mut self, cooker: Cooker<'_, B>, source: &str) -> Result<B::HeightField> {
        let kind = CookedKind::HeightField;
        let grid = self.load_samples(source)?;
        let (rows, columns) = (grid.rows(), grid.columns());
        if grid.is_empty() {
            return Err(CollisionError::DegenerateHeightField { rows, columns });
        }

        let blob = cooker.backend.cook_height_field(&HeightFieldDesc {
            rows,
            columns,
            samples: grid.samples(),
        })?;
        cooker.cache.store(source, kind, &blob);

        let field = cooker
            .backend
            .create_height_field(&blob)
            .ok_or_else(|| CollisionError::cooking(kind, "cooked blob was not accepted"))?;
        log::debug!("Created height field {columns} x {rows} from {source}");
        Ok(field)
    }

    /// Decodes the image once. Failures are not memoized.
    fn load_samples(&mut self, source: &str) -> Result<&HeightSampleGrid> {
        let grid = match &mut self.samples {
            Some(grid) => grid,
            slot => slot.insert(HeightSampleGrid::load(source)?),
        };
        self.rows = grid.rows();
        self.columns = grid.columns();
        Ok(grid)
    }
}
