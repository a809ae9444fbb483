#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use bevy_math::{vec2, UVec2, Vec2};

use crate::error::CoreError;

/// Affine mapping from map-internal coordinate units to integer grid cells.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationRecord {
    min_x: f32,
    min_y: f32,
    res_x: f32,
    res_y: f32,
    width: u32,
    height: u32,
}

impl NormalizationRecord {
    /// Compute the normalization for a feature bounding rectangle
    /// `(u_min, v_min)..(u_max, v_max)` mapped onto a `width × height` grid.
    ///
    /// # Errors
    /// Returns [`CoreError::DegenerateBounds`] if the rectangle has zero
    /// extent on either axis.
    pub fn compute(
        u_min: f32,
        v_min: f32,
        u_max: f32,
        v_max: f32,
        width: u32,
        height: u32,
    ) -> Result<Self, CoreError> {
        if u_max <= u_min || v_max <= v_min {
            return Err(CoreError::DegenerateBounds);
        }
        Ok(Self {
            min_x: u_min,
            min_y: v_min,
            res_x: (u_max - u_min) / width as f32,
            res_y: (v_max - v_min) / height as f32,
            width,
            height,
        })
    }

    #[inline]
    #[must_use]
    pub fn res_x(&self) -> f32 {
        self.res_x
    }

    #[inline]
    #[must_use]
    pub fn res_y(&self) -> f32 {
        self.res_y
    }

    /// Map a map-internal coordinate to the grid cell containing it. The
    /// result is not clamped to grid bounds; callers check with
    /// [`crate::Grid::in_bounds`].
    #[inline]
    #[must_use]
    pub fn to_cell(&self, u: f32, v: f32) -> (i64, i64) {
        let x = ((u - self.min_x) / self.res_x).floor() as i64;
        let y = ((v - self.min_y) / self.res_y).floor() as i64;
        (x, y)
    }

    /// Map a map-internal coordinate to continuous (unfloored) grid-cell
    /// units, used by the scanline fill to compute sub-cell edge
    /// intersections.
    #[inline]
    #[must_use]
    pub fn to_grid(&self, u: f32, v: f32) -> Vec2 {
        vec2((u - self.min_x) / self.res_x, (v - self.min_y) / self.res_y)
    }

    /// Map a grid cell back to the map-internal coordinate of its
    /// bottom-left corner.
    #[inline]
    #[must_use]
    pub fn to_internal(&self, cell: UVec2) -> Vec2 {
        vec2(
            self.min_x + cell.x as f32 * self.res_x,
            self.min_y + cell.y as f32 * self.res_y,
        )
    }

    /// The real-world extent this normalization covers, `(min + W·res_x,
    /// min + H·res_y)`.
    #[inline]
    #[must_use]
    pub fn extent(&self) -> Vec2 {
        vec2(
            self.min_x + self.width as f32 * self.res_x,
            self.min_y + self.height as f32 * self.res_y,
        )
    }
}
