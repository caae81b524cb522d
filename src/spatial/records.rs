//! Attributed polygon records and the immutable per-run store

use crate::io::error::{Result, invalid_parameter};
use geo::{BoundingRect, MultiPolygon, Rect, coord, unary_union};

/// One administrative polygon with population attributes
///
/// Geometry lives in the equal-area planar reference system; density is
/// derived at construction and never recomputed. Records are immutable once
/// loaded.
#[derive(Debug, Clone)]
pub struct PolygonRecord {
    /// Unique identifier from the source dataset
    pub id: String,
    /// Planar geometry
    pub geometry: MultiPolygon<f64>,
    /// Land area in square kilometers
    pub land_km2: f64,
    /// Total population
    pub population: u64,
    /// Population per square kilometer, 0 when the land area is 0
    pub density: f64,
}

impl PolygonRecord {
    /// Create a record, deriving density from population and land area
    pub fn new(
        id: String,
        geometry: MultiPolygon<f64>,
        land_km2: f64,
        population: u64,
    ) -> Self {
        let density = if land_km2 > 0.0 {
            population as f64 / land_km2
        } else {
            0.0
        };

        Self {
            id,
            geometry,
            land_km2,
            population,
            density,
        }
    }
}

/// Immutable collection of polygon records for one run
///
/// Caches the total population and the planar bounding box at construction;
/// the boundary union is computed on demand since only the tessellation stage
/// needs it.
#[derive(Debug, Clone)]
pub struct PolygonAttributeStore {
    records: Vec<PolygonRecord>,
    total_population: u64,
    bounds: Rect<f64>,
}

impl PolygonAttributeStore {
    /// Build the store from loaded records
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if no record carries usable geometry, since
    /// every downstream stage needs a non-empty bounding box.
    pub fn new(records: Vec<PolygonRecord>) -> Result<Self> {
        let mut bounds: Option<Rect<f64>> = None;

        for record in &records {
            let Some(record_bounds) = record.geometry.bounding_rect() else {
                continue;
            };
            bounds = Some(match bounds {
                None => record_bounds,
                Some(current) => merge_rects(current, record_bounds),
            });
        }

        let Some(bounds) = bounds else {
            return Err(invalid_parameter(
                "records",
                &records.len(),
                &"no record carries non-empty geometry",
            ));
        };

        let total_population = records.iter().map(|r| r.population).sum();

        Ok(Self {
            records,
            total_population,
            bounds,
        })
    }

    /// All records in input order
    pub fn records(&self) -> &[PolygonRecord] {
        &self.records
    }

    /// Number of records in the store
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of populations over all records
    pub const fn total_population(&self) -> u64 {
        self.total_population
    }

    /// Planar bounding box over all record geometries
    pub const fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    /// Union of all record geometries, the clip boundary for tessellation
    pub fn boundary(&self) -> MultiPolygon<f64> {
        unary_union(self.records.iter().map(|r| &r.geometry))
    }
}

fn merge_rects(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        coord! {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        coord! {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Polygon, polygon};

    fn square(x0: f64, y0: f64, side: f64) -> MultiPolygon<f64> {
        let ring: Polygon<f64> = polygon![
            (x: x0, y: y0),
            (x: x0 + side, y: y0),
            (x: x0 + side, y: y0 + side),
            (x: x0, y: y0 + side),
        ];
        MultiPolygon::from(ring)
    }

    #[test]
    fn test_density_derivation_handles_zero_land() {
        let with_land = PolygonRecord::new("a".into(), square(0.0, 0.0, 1000.0), 4.0, 100);
        assert!((with_land.density - 25.0).abs() < f64::EPSILON);

        let no_land = PolygonRecord::new("b".into(), square(0.0, 0.0, 1000.0), 0.0, 100);
        assert!(no_land.density.abs() < f64::EPSILON);
    }

    #[test]
    fn test_store_caches_population_and_bounds() {
        let store = PolygonAttributeStore::new(vec![
            PolygonRecord::new("a".into(), square(0.0, 0.0, 1000.0), 1.0, 100),
            PolygonRecord::new("b".into(), square(1000.0, 0.0, 1000.0), 1.0, 250),
        ]);
        let Ok(store) = store else {
            unreachable!("two valid records must build a store");
        };

        assert_eq!(store.total_population(), 350);
        assert_eq!(store.len(), 2);
        let bounds = store.bounds();
        assert!((bounds.min().x - 0.0).abs() < f64::EPSILON);
        assert!((bounds.max().x - 2000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_store_rejects_empty_geometry_set() {
        assert!(PolygonAttributeStore::new(Vec::new()).is_err());
    }
}
