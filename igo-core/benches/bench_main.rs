use chrono::NaiveDateTime;
use criterion::{Criterion, criterion_group, criterion_main};
use igo_core::prelude::*;

const SIDE: i64 = 60;
const STEP: f64 = 0.001;

fn grid() -> RoadGraph {
    let id = |row: i64, col: i64| row * SIDE + col;
    let mut builder = RoadGraph::builder();
    for row in 0..SIDE {
        for col in 0..SIDE {
            #[allow(clippy::cast_precision_loss)]
            let (lat, lon) = (41.0 + row as f64 * STEP, 2.0 + col as f64 * STEP);
            builder = builder.node(id(row, col), lat, lon);
        }
    }
    for row in 0..SIDE {
        for col in 0..SIDE {
            if col + 1 < SIDE {
                builder = builder.two_way(id(row, col), id(row, col + 1), 84.0, None);
            }
            if row + 1 < SIDE {
                builder = builder.two_way(
                    id(row, col),
                    id(row + 1, col),
                    111.0,
                    Some(SpeedLimit::Multiple(vec![50.0, 30.0])),
                );
            }
        }
    }
    builder.build().expect("grid must build")
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn feeds() -> (Vec<Segment>, Vec<CongestionReport>) {
    let timestamp = NaiveDateTime::parse_from_str("20211102153505", "%Y%m%d%H%M%S").unwrap();
    let segments = (0..SIDE)
        .map(|row| {
            let lat = 41.0 + row as f64 * STEP;
            Segment::from_lat_lon(
                row,
                format!("row {row}"),
                &[(lat, 2.0), (lat, 2.0 + 20.0 * STEP), (lat, 2.0 + 40.0 * STEP)],
            )
            .expect("segment must be valid")
        })
        .collect();
    let reports = (0..SIDE)
        .map(|row| CongestionReport {
            id: row,
            timestamp,
            state: CongestionState::try_from((row % 7) as u8).ok(),
        })
        .collect();
    (segments, reports)
}

fn refresh_benchmark(c: &mut Criterion) {
    let engine = RoutingEngine::new(grid(), EngineConfig::default(), Gazetteer::new())
        .expect("engine must build");
    let (segments, reports) = feeds();

    let mut group = c.benchmark_group("engine");
    group.sample_size(20);
    group.bench_function("refresh", |b| {
        b.iter(|| engine.refresh(&segments, &reports).expect("refresh must succeed"));
    });
    group.bench_function("route", |b| {
        b.iter(|| engine.route_between(0, SIDE * SIDE - 1).expect("route must exist"));
    });
    group.finish();
}

criterion_group!(benches, refresh_benchmark);
criterion_main!(benches);
