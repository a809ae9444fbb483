#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A regular 2D elevation raster, in meters, plus the affine placement
/// needed to sample it from the logical grid's coordinate system.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationField {
    width: u32,
    height: u32,
    values: Vec<f32>,
    /// Projected-CRS coordinate of the field's `(0,0)` cell corner.
    origin_px: f32,
    origin_py: f32,
    /// Real-world length, in meters, of one side of an elevation cell.
    cell_m: f32,
}

impl ElevationField {
    /// # Panics
    /// Panics if `values.len() != width * height`, or either dimension is
    /// zero, or `cell_m` is not strictly positive.
    #[must_use]
    pub fn new(width: u32, height: u32, values: Vec<f32>, origin_px: f32, origin_py: f32, cell_m: f32) -> Self {
        assert!(width >= 1 && height >= 1, "elevation field dimensions must be >= 1");
        assert_eq!(values.len(), (width as usize) * (height as usize));
        assert!(cell_m > 0.0, "cell_m must be positive");
        Self {
            width,
            height,
            values,
            origin_px,
            origin_py,
            cell_m,
        }
    }

    /// A uniform field at `elevation_m`, with cell size `cell_m`. Used as
    /// the fallback when no real elevation data is supplied.
    #[must_use]
    pub fn uniform(elevation_m: f32, cell_m: f32) -> Self {
        Self::new(1, 1, vec![elevation_m; 1], 0.0, 0.0, cell_m)
    }

    #[inline]
    #[must_use]
    fn value(&self, x: u32, y: u32) -> f32 {
        self.values[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// Bilinearly sample the field at a real-valued elevation-field cell
    /// coordinate `(fx, fy)`. Out-of-field queries clamp to the nearest
    /// edge.
    #[must_use]
    pub fn sample(&self, fx: f32, fy: f32) -> f32 {
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        let fx = fx.clamp(0.0, max_x);
        let fy = fy.clamp(0.0, max_y);

        let x0 = fx.floor() as u32;
        let y0 = fy.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let v00 = self.value(x0, y0);
        let v10 = self.value(x1, y0);
        let v01 = self.value(x0, y1);
        let v11 = self.value(x1, y1);

        let top = v00 + (v10 - v00) * tx;
        let bottom = v01 + (v11 - v01) * tx;
        top + (bottom - top) * ty
    }
}

/// Affine transform translating the logical grid's `(0,0)` cell to the
/// elevation field's coordinate system, plus the logical grid's own cell
/// size in meters.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationAlignment {
    pub origin_offset_x: f32,
    pub origin_offset_y: f32,
    pub log_cell_m: f32,
}

impl ElevationAlignment {
    #[inline]
    #[must_use]
    pub fn new(origin_offset_x: f32, origin_offset_y: f32, log_cell_m: f32) -> Self {
        Self {
            origin_offset_x,
            origin_offset_y,
            log_cell_m,
        }
    }

    /// Identity alignment appropriate for a uniform fallback field whose
    /// cell size matches the logical grid exactly.
    #[inline]
    #[must_use]
    pub fn identity(log_cell_m: f32) -> Self {
        Self::new(0.0, 0.0, log_cell_m)
    }
}

/// Wraps an [`ElevationField`] to expose elevation queries in the logical
/// grid's real-valued cell-unit coordinate system. Pure and read-only, so
/// safe to call concurrently from many threads.
#[derive(Debug, Clone)]
pub struct ElevationSampler {
    field: ElevationField,
    alignment: ElevationAlignment,
}

impl ElevationSampler {
    #[inline]
    #[must_use]
    pub fn new(field: ElevationField, alignment: ElevationAlignment) -> Self {
        Self { field, alignment }
    }

    /// A sampler over a uniform 100.0m field, substituted when the caller
    /// supplies no real elevation data. Makes the slope penalty exactly
    /// `exp(-3.5 * 0.05)`.
    #[must_use]
    pub fn flat(log_cell_m: f32) -> Self {
        Self::new(
            ElevationField::uniform(100.0, log_cell_m),
            ElevationAlignment::identity(log_cell_m),
        )
    }

    /// Elevation, in meters, at real-valued logical grid coordinates
    /// `(x, y)` (in cell units).
    #[must_use]
    pub fn elevation_at(&self, x: f32, y: f32) -> f32 {
        let world_x = x * self.alignment.log_cell_m + self.alignment.origin_offset_x;
        let world_y = y * self.alignment.log_cell_m + self.alignment.origin_offset_y;
        let fx = (world_x - self.field.origin_px) / self.field.cell_m;
        let fy = (world_y - self.field.origin_py) / self.field.cell_m;
        self.field.sample(fx, fy)
    }

    #[inline]
    #[must_use]
    pub fn log_cell_m(&self) -> f32 {
        self.alignment.log_cell_m
    }
}
