//! Boundary-clipped Voronoi tessellation of the seed set
//!
//! Each Voronoi cell equals the intersection of the bisector half-planes
//! toward the seed's Delaunay neighbors, so the builder triangulates the
//! seeds once and carves every cell from an expanded bounding rectangle of
//! the boundary with one half-plane clip per neighbor. The convex result is
//! then intersected with the (possibly non-convex) boundary union. The
//! half-plane route handles one-seed, two-seed, and collinear inputs with
//! the same code path.

use crate::analysis::statistics::ZonalStatistics;
use crate::io::error::{Result, invalid_parameter};
use crate::math::clip::clip_to_bisector;
use geo::{Area, BooleanOps, BoundingRect, Coord, LineString, MultiPolygon, Polygon, coord};
use spade::{DelaunayTriangulation, Point2, Triangulation};

/// Fraction of the boundary diagonal added around the clip rectangle
const CLIP_MARGIN_FRACTION: f64 = 0.25;

/// Area below which a clipped cell counts as empty, in square meters
const EMPTY_CELL_AREA_M2: f64 = 1e-6;

/// One tessellation cell with statistics attached by the zonal pass
#[derive(Debug, Clone)]
pub struct TessellationCell {
    /// Cell geometry clipped to the boundary; may be multi-part when the
    /// boundary is disjoint
    pub geometry: MultiPolygon<f64>,
    /// Generating seed coordinate
    pub seed: Coord<f64>,
    /// Planar area in square kilometers, filled by the zonal pass
    pub area_km2: f64,
    /// Estimated population from covered grid cells, filled by the zonal pass
    pub population_estimate: f64,
    /// Density statistics; `None` marks a cell with no covered grid cell
    pub statistics: Option<ZonalStatistics>,
}

/// Tessellation result: surviving cells plus the seeds that produced none
#[derive(Debug, Clone)]
pub struct Tessellation {
    /// Cells partitioning the boundary, one per surviving seed
    pub cells: Vec<TessellationCell>,
    /// Seeds whose cell clipped to an empty region
    pub dropped_seeds: Vec<Coord<f64>>,
}

/// Build the Voronoi tessellation of `seeds` clipped to `boundary`
///
/// Coincident seed coordinates are merged ahead of construction so no
/// zero-area cell can arise; a single surviving seed receives the entire
/// boundary. Seeds whose clipped cell is empty are reported in
/// `dropped_seeds` and excluded from the cell list. The returned cells
/// partition the boundary with no gaps and no interior overlaps.
///
/// # Errors
///
/// Returns `InvalidInput` when the seed sequence is empty, when a seed
/// coordinate is not finite, or when the boundary has no extent.
pub fn build_tessellation(
    seeds: &[Coord<f64>],
    boundary: &MultiPolygon<f64>,
) -> Result<Tessellation> {
    if seeds.is_empty() {
        return Err(invalid_parameter(
            "seeds",
            &0,
            &"tessellation requires at least one seed",
        ));
    }

    let Some(bounds) = boundary.bounding_rect() else {
        return Err(invalid_parameter(
            "boundary",
            &"empty",
            &"boundary polygon has no extent",
        ));
    };

    let unique = merge_coincident(seeds);

    if let [seed] = unique.as_slice() {
        return Ok(Tessellation {
            cells: vec![TessellationCell::bare(boundary.clone(), *seed)],
            dropped_seeds: Vec::new(),
        });
    }

    let mut triangulation: DelaunayTriangulation<Point2<f64>> = DelaunayTriangulation::new();
    let mut handles = Vec::with_capacity(unique.len());
    for seed in &unique {
        let handle = triangulation
            .insert(Point2::new(seed.x, seed.y))
            .map_err(|e| invalid_parameter("seeds", &format!("({}, {})", seed.x, seed.y), &e))?;
        handles.push(handle);
    }

    let clip_ring = expanded_corners(bounds);
    let mut cells = Vec::with_capacity(unique.len());
    let mut dropped_seeds = Vec::new();

    for (seed, handle) in unique.iter().zip(&handles) {
        let mut ring = clip_ring.clone();
        for edge in triangulation.vertex(*handle).out_edges() {
            let neighbor = edge.to().position();
            ring = clip_to_bisector(&ring, *seed, coord! { x: neighbor.x, y: neighbor.y });
            if ring.len() < 3 {
                break;
            }
        }

        if ring.len() < 3 {
            dropped_seeds.push(*seed);
            continue;
        }

        let unclipped = MultiPolygon::from(Polygon::new(LineString::from(ring), Vec::new()));
        let clipped = unclipped.intersection(boundary);

        if clipped.unsigned_area() < EMPTY_CELL_AREA_M2 {
            dropped_seeds.push(*seed);
        } else {
            cells.push(TessellationCell::bare(clipped, *seed));
        }
    }

    Ok(Tessellation {
        cells,
        dropped_seeds,
    })
}

impl TessellationCell {
    /// Cell with geometry and seed only, before the zonal pass runs
    const fn bare(geometry: MultiPolygon<f64>, seed: Coord<f64>) -> Self {
        Self {
            geometry,
            seed,
            area_km2: 0.0,
            population_estimate: 0.0,
            statistics: None,
        }
    }
}

/// Drop later duplicates of bit-identical coordinates, keeping input order
fn merge_coincident(seeds: &[Coord<f64>]) -> Vec<Coord<f64>> {
    let mut seen = std::collections::HashSet::with_capacity(seeds.len());
    seeds
        .iter()
        .filter(|seed| seen.insert((seed.x.to_bits(), seed.y.to_bits())))
        .copied()
        .collect()
}

/// Corners of the boundary bounding box grown by the clip margin
fn expanded_corners(bounds: geo::Rect<f64>) -> Vec<Coord<f64>> {
    let margin = (bounds.width().hypot(bounds.height()) * CLIP_MARGIN_FRACTION).max(1.0);
    vec![
        coord! { x: bounds.min().x - margin, y: bounds.min().y - margin },
        coord! { x: bounds.max().x + margin, y: bounds.min().y - margin },
        coord! { x: bounds.max().x + margin, y: bounds.max().y + margin },
        coord! { x: bounds.min().x - margin, y: bounds.max().y + margin },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square_boundary(side: f64) -> MultiPolygon<f64> {
        MultiPolygon::from(polygon![
            (x: 0.0, y: 0.0),
            (x: side, y: 0.0),
            (x: side, y: side),
            (x: 0.0, y: side),
        ])
    }

    #[test]
    fn test_empty_seed_set_is_rejected() {
        let result = build_tessellation(&[], &square_boundary(1000.0));
        assert!(result.is_err());
    }

    #[test]
    fn test_single_seed_owns_the_boundary() {
        let boundary = square_boundary(1000.0);
        let Ok(tess) = build_tessellation(&[coord! { x: 10.0, y: 10.0 }], &boundary) else {
            unreachable!("single seed must tessellate");
        };

        assert_eq!(tess.cells.len(), 1);
        assert!(tess.dropped_seeds.is_empty());
        let Some(cell) = tess.cells.first() else {
            unreachable!("one cell expected");
        };
        let boundary_area = boundary.unsigned_area();
        assert!((cell.geometry.unsigned_area() - boundary_area).abs() < 1e-6);
    }

    #[test]
    fn test_coincident_seeds_merge_to_one_cell() {
        let boundary = square_boundary(1000.0);
        let seed = coord! { x: 400.0, y: 700.0 };
        let Ok(tess) = build_tessellation(&[seed, seed, seed], &boundary) else {
            unreachable!("coincident seeds must tessellate");
        };
        assert_eq!(tess.cells.len(), 1);
    }

    #[test]
    fn test_two_seeds_split_the_square() {
        let boundary = square_boundary(2000.0);
        let seeds = [coord! { x: 500.0, y: 500.0 }, coord! { x: 1500.0, y: 500.0 }];
        let Ok(tess) = build_tessellation(&seeds, &boundary) else {
            unreachable!("two seeds must tessellate");
        };

        assert_eq!(tess.cells.len(), 2);
        let total: f64 = tess.cells.iter().map(|c| c.geometry.unsigned_area()).sum();
        assert!((total - boundary.unsigned_area()).abs() < 1.0);

        // The bisector is the vertical line x = 1000.
        for cell in &tess.cells {
            assert!((cell.geometry.unsigned_area() - 2_000_000.0).abs() < 1.0);
        }
    }

    #[test]
    fn test_cells_partition_without_interior_overlap() {
        let boundary = square_boundary(1000.0);
        let seeds = [
            coord! { x: 120.0, y: 340.0 },
            coord! { x: 740.0, y: 180.0 },
            coord! { x: 510.0, y: 820.0 },
            coord! { x: 900.0, y: 900.0 },
            coord! { x: 300.0, y: 600.0 },
        ];
        let Ok(tess) = build_tessellation(&seeds, &boundary) else {
            unreachable!("seeds must tessellate");
        };

        assert_eq!(tess.cells.len() + tess.dropped_seeds.len(), seeds.len());

        let total: f64 = tess.cells.iter().map(|c| c.geometry.unsigned_area()).sum();
        assert!((total - boundary.unsigned_area()).abs() < 1.0);

        for (i, a) in tess.cells.iter().enumerate() {
            for b in tess.cells.iter().skip(i + 1) {
                let overlap = a.geometry.intersection(&b.geometry).unsigned_area();
                assert!(overlap < 1.0, "cells {i} overlap by {overlap} m^2");
            }
        }
    }

    #[test]
    fn test_outside_seed_far_from_boundary_is_dropped() {
        // Second seed sits so far away that its half-plane cell misses the
        // boundary entirely.
        let boundary = square_boundary(1000.0);
        let seeds = [
            coord! { x: 500.0, y: 500.0 },
            coord! { x: 500.0, y: 500_000.0 },
        ];
        let Ok(tess) = build_tessellation(&seeds, &boundary) else {
            unreachable!("seeds must tessellate");
        };

        assert_eq!(tess.cells.len(), 1);
        assert_eq!(tess.dropped_seeds.len(), 1);
    }
}
