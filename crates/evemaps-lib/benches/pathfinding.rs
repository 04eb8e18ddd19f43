use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;

use evemaps_lib::test_helpers::{link, system};
use evemaps_lib::{find_path, plan_route, CancelToken, RouteRequest, SearchConstraints, Universe};

const SIDE: i64 = 20;

/// Square lattice of gates, corner system 1 to corner system 400.
static GRID: Lazy<Universe> = Lazy::new(|| {
    let mut systems = Vec::with_capacity((SIDE * SIDE) as usize);
    let mut jumps = Vec::new();
    for row in 0..SIDE {
        for col in 0..SIDE {
            let id = row * SIDE + col + 1;
            systems.push(system(
                id,
                &format!("G{row}-{col}"),
                col as f64 * 0.01,
                row as f64 * 0.01,
                0.0,
            ));
            if col + 1 < SIDE {
                jumps.extend(link(id, id + 1));
            }
            if row + 1 < SIDE {
                jumps.extend(link(id, id + SIDE));
            }
        }
    }
    Universe::from_parts(systems, jumps)
});

fn bench_find_path(c: &mut Criterion) {
    let constraints = SearchConstraints::new();
    let cancel = CancelToken::new();

    c.bench_function("find_path/grid_corner_to_corner", |b| {
        b.iter(|| {
            black_box(find_path(
                &GRID,
                black_box(1),
                black_box(SIDE * SIDE),
                &constraints,
                &cancel,
            ))
        })
    });
}

fn bench_plan_route(c: &mut Criterion) {
    let cancel = CancelToken::new();
    let request = RouteRequest {
        origin: "G0-0".to_string(),
        destination: "G19-19".to_string(),
        waypoints: vec!["G10-3".to_string(), "G4-15".to_string()],
        ..RouteRequest::default()
    };

    c.bench_function("plan_route/grid_two_waypoints", |b| {
        b.iter(|| black_box(plan_route(&GRID, black_box(&request), &[], &cancel)))
    });
}

criterion_group!(benches, bench_find_path, bench_plan_route);
criterion_main!(benches);
