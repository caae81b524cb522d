//! Performance measurement for density burn-in and tessellation at varying record counts

// Criterion macros generate undocumented functions
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use geo::{MultiPolygon, coord, polygon};
use popgrid::algorithm::rasterize::{CoverageMode, rasterize_density};
use popgrid::algorithm::tessellation::build_tessellation;
use popgrid::spatial::records::{PolygonAttributeStore, PolygonRecord};
use std::hint::black_box;

fn square(x0: f64, y0: f64, side: f64) -> MultiPolygon<f64> {
    MultiPolygon::from(polygon![
        (x: x0, y: y0),
        (x: x0 + side, y: y0),
        (x: x0 + side, y: y0 + side),
        (x: x0, y: y0 + side),
    ])
}

/// Checkerboard of `n` x `n` unit-kilometer records with varied populations
fn checkerboard_store(n: usize) -> Option<PolygonAttributeStore> {
    let mut records = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            records.push(PolygonRecord::new(
                format!("r{i}-{j}"),
                square(i as f64 * 1000.0, j as f64 * 1000.0, 1000.0),
                1.0,
                ((i * 31 + j * 17) % 997) as u64 + 1,
            ));
        }
    }
    PolygonAttributeStore::new(records).ok()
}

/// Measures burn-in cost as the record count grows
fn bench_rasterize_density(c: &mut Criterion) {
    let mut group = c.benchmark_group("rasterize_density");

    for n in &[8usize, 16, 32] {
        let Some(store) = checkerboard_store(*n) else {
            group.finish();
            return;
        };

        group.bench_with_input(BenchmarkId::from_parameter(n * n), n, |b, _| {
            b.iter(|| {
                let grid = rasterize_density(black_box(&store), 500.0, CoverageMode::Broad);
                black_box(grid)
            });
        });
    }

    group.finish();
}

/// Measures tessellation cost over a growing seed set
fn bench_build_tessellation(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_tessellation");

    for count in &[16usize, 64, 256] {
        let boundary = square(0.0, 0.0, 32_000.0);
        let seeds: Vec<_> = (0..*count)
            .map(|i| {
                coord! {
                    x: ((i * 7919) % 32_000) as f64,
                    y: ((i * 104_729) % 32_000) as f64,
                }
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| {
                let tessellation = build_tessellation(black_box(&seeds), &boundary);
                black_box(tessellation)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rasterize_density, bench_build_tessellation);
criterion_main!(benches);
