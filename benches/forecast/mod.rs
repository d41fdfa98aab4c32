use criterion::{Criterion, Throughput};
use serde_json::json;
use skycast::forecast::extract::{current_value, min_max};
use skycast::forecast::parser::parse;
use skycast::forecast::{ForecastQueue, ForecastSnapshot};
use std::hint::black_box;

fn series(base: f32) -> Vec<f32> {
    (0..24).map(|h| base + (h as f32 * 0.7).sin() * 5.0).collect()
}

fn document() -> String {
    json!({
        "current": {
            "temperature_2m": 18.2,
            "relative_humidity_2m": 61,
            "wind_speed_10m": 11.3
        },
        "hourly": {
            "temperature_2m": series(15.0),
            "relative_humidity_2m": series(60.0),
            "wind_speed_10m": series(10.0),
            "uv_index": series(3.0)
        }
    })
    .to_string()
}

pub fn bench_parse(c: &mut Criterion) {
    let document = document();
    let mut group = c.benchmark_group("forecast");
    group.throughput(Throughput::Bytes(document.len() as u64));
    group.bench_function("parse", |b| {
        b.iter(|| parse(black_box(&document), black_box(13)).unwrap())
    });
    group.finish();
}

pub fn bench_extract(c: &mut Criterion) {
    let value = json!(series(15.0));
    c.bench_function("forecast/min_max", |b| {
        b.iter(|| min_max(black_box(&value)).unwrap())
    });
    c.bench_function("forecast/current_value", |b| {
        b.iter(|| current_value(black_box(&value), black_box(17)).unwrap())
    });
}

pub fn bench_publish(c: &mut Criterion) {
    let queue = ForecastQueue::new();
    let snapshot = ForecastSnapshot::default();
    c.bench_function("forecast/publish_overwrite", |b| {
        b.iter(|| queue.publish(black_box(snapshot)))
    });
}
