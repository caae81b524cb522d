//! Density grid storage with a planar affine transform
//!
//! The grid uses a top-left origin: row 0 is the northernmost row, matching
//! the raster interchange convention of a transform anchored at
//! (xmin, ymax). Dimensions come from ceiling division of the bounding box
//! extent so no boundary cell is ever dropped.

use crate::io::configuration::MAX_GRID_DIMENSION;
use crate::io::error::{Result, invalid_parameter};
use geo::{Coord, Rect, coord};
use ndarray::Array2;
use std::ops::Range;

/// Fill value for cells no polygon covers
///
/// Shared between the rasterizer (fill) and the zonal pass (exclusion). A
/// true observation of zero density is indistinguishable from unpainted
/// ground under this convention; the artifact sidecar records the sentinel so
/// consumers can apply their own policy.
pub const NODATA: f64 = 0.0;

/// Fixed-resolution float grid over the planar bounding box of a run
///
/// Values are row-major with row 0 at the top. The grid is created once by
/// the rasterizer and read-only afterwards.
#[derive(Debug, Clone)]
pub struct DensityGrid {
    /// Top-left corner of the grid in planar coordinates (xmin, ymax)
    origin: Coord<f64>,
    /// Square cell edge length in meters
    cell_size: f64,
    /// Cell values, dimension (height, width)
    values: Array2<f64>,
}

impl DensityGrid {
    /// Allocate a nodata-filled grid covering `bounds` at `cell_size` meters
    ///
    /// Width and height are the ceiling division of the extents, with a
    /// minimum of one cell per axis for degenerate bounds.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the cell size is not positive or the
    /// resulting dimensions exceed [`MAX_GRID_DIMENSION`].
    pub fn from_bounds(bounds: Rect<f64>, cell_size: f64) -> Result<Self> {
        if cell_size <= 0.0 || !cell_size.is_finite() {
            return Err(invalid_parameter(
                "cell_size",
                &cell_size,
                &"cell size must be a positive number of meters",
            ));
        }

        let width = ((bounds.max().x - bounds.min().x) / cell_size).ceil().max(1.0) as usize;
        let height = ((bounds.max().y - bounds.min().y) / cell_size).ceil().max(1.0) as usize;

        if width > MAX_GRID_DIMENSION || height > MAX_GRID_DIMENSION {
            return Err(invalid_parameter(
                "cell_size",
                &cell_size,
                &format!("grid {width}x{height} exceeds {MAX_GRID_DIMENSION} cells per axis"),
            ));
        }

        Ok(Self {
            origin: coord! { x: bounds.min().x, y: bounds.max().y },
            cell_size,
            values: Array2::from_elem((height, width), NODATA),
        })
    }

    /// Rebuild a grid from previously written parts
    ///
    /// Used when reading an artifact back; `origin` is the top-left corner.
    pub const fn from_parts(origin: Coord<f64>, cell_size: f64, values: Array2<f64>) -> Self {
        Self {
            origin,
            cell_size,
            values,
        }
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.values.dim().1
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.values.dim().0
    }

    /// Cell edge length in meters
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Top-left corner in planar coordinates
    pub const fn origin(&self) -> Coord<f64> {
        self.origin
    }

    /// Area of one cell in square kilometers
    pub const fn cell_area_km2(&self) -> f64 {
        (self.cell_size / 1000.0) * (self.cell_size / 1000.0)
    }

    /// Planar extent covered by the full grid
    pub fn bounds(&self) -> Rect<f64> {
        Rect::new(
            coord! {
                x: self.origin.x,
                y: self.origin.y - self.height() as f64 * self.cell_size,
            },
            coord! {
                x: self.origin.x + self.width() as f64 * self.cell_size,
                y: self.origin.y,
            },
        )
    }

    /// Backing value array, dimension (height, width)
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Value at (row, col), `None` outside the grid
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get([row, col]).copied()
    }

    /// Overwrite the value at (row, col); out-of-range writes are ignored
    pub(crate) fn set(&mut self, row: usize, col: usize, value: f64) {
        if let Some(cell) = self.values.get_mut([row, col]) {
            *cell = value;
        }
    }

    /// Cell indices covering a planar coordinate, `None` outside the grid
    pub fn world_to_cell(&self, point: Coord<f64>) -> Option<(usize, usize)> {
        let col = (point.x - self.origin.x) / self.cell_size;
        let row = (self.origin.y - point.y) / self.cell_size;
        if col < 0.0 || row < 0.0 {
            return None;
        }

        let (col, row) = (col.floor() as usize, row.floor() as usize);
        (row < self.height() && col < self.width()).then_some((row, col))
    }

    /// Planar center of the cell at (row, col)
    pub fn cell_center(&self, row: usize, col: usize) -> Coord<f64> {
        coord! {
            x: (col as f64 + 0.5).mul_add(self.cell_size, self.origin.x),
            y: (row as f64 + 0.5).mul_add(-self.cell_size, self.origin.y),
        }
    }

    /// Planar rectangle of the cell at (row, col)
    pub fn cell_rect(&self, row: usize, col: usize) -> Rect<f64> {
        let top = (row as f64).mul_add(-self.cell_size, self.origin.y);
        let left = (col as f64).mul_add(self.cell_size, self.origin.x);
        Rect::new(
            coord! { x: left, y: top - self.cell_size },
            coord! { x: left + self.cell_size, y: top },
        )
    }

    /// Row and column ranges whose cells may intersect `rect`, clamped
    ///
    /// The end bounds use ceiling division so cells merely touched by the
    /// rectangle edge are included.
    pub fn region_spans(&self, rect: &Rect<f64>) -> (Range<usize>, Range<usize>) {
        let col_start = ((rect.min().x - self.origin.x) / self.cell_size).floor().max(0.0) as usize;
        let col_end = (((rect.max().x - self.origin.x) / self.cell_size).ceil().max(0.0) as usize)
            .min(self.width());
        let row_start = ((self.origin.y - rect.max().y) / self.cell_size).floor().max(0.0) as usize;
        let row_end = (((self.origin.y - rect.min().y) / self.cell_size).ceil().max(0.0) as usize)
            .min(self.height());

        (
            row_start.min(row_end)..row_end,
            col_start.min(col_end)..col_end,
        )
    }
}
