use criterion::*;
use geo::{Coordinate, Geometry, LineString, Polygon};

use geo_relate::{relate, RelateNG};

/// A regular n-gon centred at (cx, cy).
fn circular_polygon(cx: f64, cy: f64, radius: f64, n: usize) -> Geometry<f64> {
    let pts: Vec<Coordinate<f64>> = (0..=n)
        .map(|i| {
            let theta = 2. * std::f64::consts::PI * (i % n) as f64 / n as f64;
            Coordinate {
                x: cx + radius * theta.cos(),
                y: cy + radius * theta.sin(),
            }
        })
        .collect();
    Geometry::Polygon(Polygon::new(LineString(pts), vec![]))
}

fn zigzag_line(x0: f64, x1: f64, n: usize) -> Geometry<f64> {
    let step = (x1 - x0) / n as f64;
    let pts: Vec<Coordinate<f64>> = (0..=n)
        .map(|i| Coordinate {
            x: x0 + step * i as f64,
            y: if i % 2 == 0 { -1. } else { 1. },
        })
        .collect();
    Geometry::LineString(LineString(pts))
}

fn bench_relate(c: &mut Criterion) {
    const SIZE: usize = 512;

    let a = circular_polygon(0., 0., 10., SIZE);
    let b = circular_polygon(5., 0., 10., SIZE);
    c.bench_function("relate matrix - overlapping polygons", |bench| {
        bench.iter(|| black_box(relate(&a, &b).unwrap()))
    });

    let line = zigzag_line(-15., 15., SIZE);
    c.bench_function("intersects - zigzag line vs polygon", |bench| {
        bench.iter(|| black_box(geo_relate::intersects(&a, &line).unwrap()))
    });

    let far = circular_polygon(100., 100., 1., 16);
    c.bench_function("disjoint - envelope shortcut", |bench| {
        bench.iter(|| black_box(geo_relate::disjoint(&a, &far).unwrap()))
    });
}

fn bench_prepared(c: &mut Criterion) {
    const SIZE: usize = 512;
    const PROBES: usize = 64;

    let a = circular_polygon(0., 0., 10., SIZE);
    let probes: Vec<Geometry<f64>> = (0..PROBES)
        .map(|i| {
            let x = -12. + 24. * i as f64 / PROBES as f64;
            Geometry::Point(Coordinate { x, y: 0.5 }.into())
        })
        .collect();

    c.bench_function("prepared covers - many points", |bench| {
        bench.iter(|| {
            let rel = RelateNG::prepare(&a).unwrap();
            probes
                .iter()
                .filter(|p| rel.covers(p).unwrap())
                .count()
        })
    });
    c.bench_function("one-shot covers - many points", |bench| {
        bench.iter(|| {
            probes
                .iter()
                .filter(|p| geo_relate::covers(&a, p).unwrap())
                .count()
        })
    });
}

criterion_group!(benches, bench_relate, bench_prepared);
criterion_main!(benches);
