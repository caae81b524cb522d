//! Grid artifact reading and writing
//!
//! The density grid persists as an ESRI ASCII grid (plain-text header with
//! the affine transform and nodata value, then rows north to south) plus a
//! JSON sidecar naming the reference system, and optionally a grayscale PNG
//! quicklook for visual inspection. The ASCII form keeps the artifact
//! readable by standard GIS tooling without a raster container dependency.

use crate::io::configuration::SIDECAR_EXTENSION;
use crate::io::error::{
    PipelineError, Result, output_error, serialization_error,
};
use crate::spatial::grid::{DensityGrid, NODATA};
use geo::coord;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Reference system of a written grid artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GridCrs {
    /// The fixed equal-area planar system used for computation
    PlanarAlbersConus,
    /// Geographic lon/lat used for interchange
    Geographic,
}

/// Sidecar metadata persisted next to the ASCII grid
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct GridSidecar {
    crs: GridCrs,
    origin_x: f64,
    origin_y: f64,
    cell_size: f64,
    width: usize,
    height: usize,
    nodata: f64,
}

/// Path of the JSON sidecar belonging to a grid artifact
pub fn sidecar_path(path: &Path) -> PathBuf {
    path.with_extension(SIDECAR_EXTENSION)
}

/// Write the grid as an ASCII artifact with its JSON sidecar
///
/// # Errors
///
/// Returns `OutputWrite` when either file cannot be persisted and
/// `Serialization` when the sidecar cannot be encoded.
pub fn write_grid_artifact(grid: &DensityGrid, crs: GridCrs, path: &Path) -> Result<()> {
    let mut content = String::new();
    let yllcorner = grid.origin().y - grid.height() as f64 * grid.cell_size();
    let _ = writeln!(content, "ncols {}", grid.width());
    let _ = writeln!(content, "nrows {}", grid.height());
    let _ = writeln!(content, "xllcorner {}", grid.origin().x);
    let _ = writeln!(content, "yllcorner {yllcorner}");
    let _ = writeln!(content, "cellsize {}", grid.cell_size());
    let _ = writeln!(content, "NODATA_value {NODATA}");

    for row in grid.values().rows() {
        let line = row
            .iter()
            .map(f64::to_string)
            .collect::<Vec<String>>()
            .join(" ");
        let _ = writeln!(content, "{line}");
    }

    std::fs::write(path, content).map_err(|e| output_error(path, e))?;

    let sidecar = GridSidecar {
        crs,
        origin_x: grid.origin().x,
        origin_y: grid.origin().y,
        cell_size: grid.cell_size(),
        width: grid.width(),
        height: grid.height(),
        nodata: NODATA,
    };
    let encoded = serde_json::to_string_pretty(&sidecar)
        .map_err(|e| serialization_error(path, &e))?;
    let sidecar_file = sidecar_path(path);
    std::fs::write(&sidecar_file, encoded).map_err(|e| output_error(sidecar_file.clone(), e))?;

    Ok(())
}

/// Read a grid artifact and its reference system back from disk
///
/// # Errors
///
/// Returns `Serialization` for a missing or malformed header, sidecar, or
/// value block.
pub fn read_grid_artifact(path: &Path) -> Result<(DensityGrid, GridCrs)> {
    let sidecar_file = sidecar_path(path);
    let sidecar_raw = std::fs::read_to_string(&sidecar_file)
        .map_err(|e| serialization_error(sidecar_file.clone(), &e))?;
    let sidecar: GridSidecar = serde_json::from_str(&sidecar_raw)
        .map_err(|e| serialization_error(sidecar_file, &e))?;

    let raw = std::fs::read_to_string(path).map_err(|e| serialization_error(path, &e))?;
    let mut tokens = raw.split_whitespace();

    let mut header: HashMap<String, f64> = HashMap::new();
    for _ in 0..6 {
        let key = tokens
            .next()
            .ok_or_else(|| serialization_error(path, &"truncated header"))?
            .to_ascii_lowercase();
        let value: f64 = tokens
            .next()
            .ok_or_else(|| serialization_error(path, &"header key without value"))?
            .parse()
            .map_err(|e| serialization_error(path, &e))?;
        header.insert(key, value);
    }

    let fetch = |key: &str| -> Result<f64> {
        header
            .get(key)
            .copied()
            .ok_or_else(|| serialization_error(path, &format!("missing header field '{key}'")))
    };

    let width = fetch("ncols")? as usize;
    let height = fetch("nrows")? as usize;
    let cell_size = fetch("cellsize")?;
    let xllcorner = fetch("xllcorner")?;
    let yllcorner = fetch("yllcorner")?;

    let values: Vec<f64> = tokens
        .map(str::parse)
        .collect::<std::result::Result<Vec<f64>, _>>()
        .map_err(|e| serialization_error(path, &e))?;
    let array = Array2::from_shape_vec((height, width), values)
        .map_err(|e| serialization_error(path, &e))?;

    let origin = coord! {
        x: xllcorner,
        y: (height as f64).mul_add(cell_size, yllcorner),
    };

    Ok((
        DensityGrid::from_parts(origin, cell_size, array),
        sidecar.crs,
    ))
}

/// Render a grayscale quicklook of the grid
///
/// Shades scale with the square root of the value relative to the maximum,
/// which keeps sparse low-density regions visible next to urban peaks.
///
/// # Errors
///
/// Returns `QuicklookExport` when the image cannot be saved.
pub fn write_quicklook(grid: &DensityGrid, path: &Path) -> Result<()> {
    let max = grid.values().iter().copied().fold(0.0_f64, f64::max);

    let mut img = image::GrayImage::new(grid.width() as u32, grid.height() as u32);
    for ((row, col), value) in grid.values().indexed_iter() {
        let shade = if max > 0.0 {
            ((value / max).sqrt() * 255.0) as u8
        } else {
            0
        };
        img.put_pixel(col as u32, row as u32, image::Luma([shade]));
    }

    img.save(path).map_err(|source| PipelineError::QuicklookExport {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Rect;

    #[test]
    fn test_grid_artifact_round_trip() {
        let bounds = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 3000.0, y: 2000.0 });
        let Ok(mut grid) = DensityGrid::from_bounds(bounds, 1000.0) else {
            unreachable!("valid bounds must allocate");
        };
        grid.set(0, 0, 12.5);
        grid.set(1, 2, 901.25);

        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(e) => unreachable!("tempdir: {e}"),
        };
        let path = dir.path().join("density.asc");

        let Ok(()) = write_grid_artifact(&grid, GridCrs::PlanarAlbersConus, &path) else {
            unreachable!("artifact must write");
        };
        let Ok((restored, crs)) = read_grid_artifact(&path) else {
            unreachable!("artifact must read back");
        };

        assert_eq!(crs, GridCrs::PlanarAlbersConus);
        assert_eq!(restored.width(), grid.width());
        assert_eq!(restored.height(), grid.height());
        assert_eq!(restored.values(), grid.values());
        assert!((restored.origin().x - grid.origin().x).abs() < f64::EPSILON);
        assert!((restored.origin().y - grid.origin().y).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_sidecar_is_a_serialization_error() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(e) => unreachable!("tempdir: {e}"),
        };
        let path = dir.path().join("orphan.asc");
        let Ok(()) = std::fs::write(&path, "ncols 1\nnrows 1\n") else {
            unreachable!("write must succeed");
        };

        assert!(matches!(
            read_grid_artifact(&path),
            Err(PipelineError::Serialization { .. })
        ));
    }
}
