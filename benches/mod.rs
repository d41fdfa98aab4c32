use criterion::{criterion_group, criterion_main};

mod forecast;

criterion_group!(
    benches,
    forecast::bench_parse,
    forecast::bench_extract,
    forecast::bench_publish
);
criterion_main!(benches);
