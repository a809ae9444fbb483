#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use bevy_math::UVec2;

/// Sentinel cost multiplier denoting a cell that cannot be traversed.
///
/// Distinct from any finite multiplier; comparisons against it use exact
/// float equality since it is only ever produced by [`Cell::impassable`]
/// and never by arithmetic.
pub const IMPASSABLE: f32 = f32::INFINITY;

/// One square element of the rasterized cost grid.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Base cost multiplier, or [`IMPASSABLE`].
    multiplier: f32,
    /// Symbol code of the feature that last wrote this cell, for debugging.
    symbol_code: String,
    /// Index into the caller-supplied layer order that set this cell.
    layer: u32,
}

impl Cell {
    /// The default cell: open terrain, no originating feature.
    #[inline]
    #[must_use]
    pub fn open() -> Self {
        Self {
            multiplier: 1.0,
            symbol_code: String::new(),
            layer: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn new(multiplier: f32, symbol_code: impl Into<String>, layer: u32) -> Self {
        Self {
            multiplier,
            symbol_code: symbol_code.into(),
            layer,
        }
    }

    #[inline]
    #[must_use]
    pub fn impassable(symbol_code: impl Into<String>, layer: u32) -> Self {
        Self::new(IMPASSABLE, symbol_code, layer)
    }

    #[inline]
    #[must_use]
    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    #[inline]
    #[must_use]
    pub fn symbol_code(&self) -> &str {
        &self.symbol_code
    }

    #[inline]
    #[must_use]
    pub fn layer(&self) -> u32 {
        self.layer
    }

    #[inline]
    #[must_use]
    pub fn is_impassable(&self) -> bool {
        self.multiplier.is_infinite()
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::open()
    }
}

/// An immutable, row-major cost grid produced by the Rasterizer.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a grid of open terrain, `width × height` cells.
    ///
    /// # Panics
    /// Panics if `width` or `height` is zero.
    #[must_use]
    pub fn new_open(width: u32, height: u32) -> Self {
        assert!(width >= 1 && height >= 1, "grid dimensions must be >= 1");
        Self {
            width,
            height,
            cells: vec![Cell::open(); (width as usize) * (height as usize)],
        }
    }

    /// Build a grid from a pre-populated row-major cell buffer.
    ///
    /// # Panics
    /// Panics if `cells.len() != width * height`, or either dimension is
    /// zero.
    #[must_use]
    pub fn from_cells(width: u32, height: u32, cells: Vec<Cell>) -> Self {
        assert!(width >= 1 && height >= 1, "grid dimensions must be >= 1");
        assert_eq!(
            cells.len(),
            (width as usize) * (height as usize),
            "cell buffer length does not match width * height"
        );
        Self {
            width,
            height,
            cells,
        }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major index of cell `(x, y)`. Does not bounds-check.
    #[inline]
    #[must_use]
    pub fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Inverse of [`Grid::idx`]: recover `(x, y)` from a row-major index.
    #[inline]
    #[must_use]
    pub fn xy(&self, index: usize) -> UVec2 {
        let w = self.width as usize;
        UVec2::new((index % w) as u32, (index / w) as u32)
    }

    #[inline]
    #[must_use]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    #[inline]
    #[must_use]
    pub fn in_bounds_u(&self, p: UVec2) -> bool {
        p.x < self.width && p.y < self.height
    }

    #[inline]
    #[must_use]
    pub fn cell(&self, x: u32, y: u32) -> &Cell {
        &self.cells[self.idx(x, y)]
    }

    #[inline]
    #[must_use]
    pub fn cell_at(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
