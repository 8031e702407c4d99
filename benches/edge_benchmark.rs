use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use edge_spread::indicators::edge::{edge, EdgeInput, EdgeParams};
use edge_spread::utilities::data_loader::read_candles_from_csv;
use std::time::Duration;

fn benchmark_edge(c: &mut Criterion) {
    let candles =
        read_candles_from_csv("src/data/ohlc_sample.csv").expect("Failed to load candles");

    let mut group = c.benchmark_group("EDGE");
    group.measurement_time(Duration::new(5, 0));
    group.warm_up_time(Duration::new(2, 0));

    for len in [100usize, 500, candles.len()] {
        let window = candles.window(0, len);
        group.bench_function(BenchmarkId::new("unsigned", len), |b| {
            let input = EdgeInput::from_candles(&window, EdgeParams::default());
            b.iter(|| edge(black_box(&input)).expect("Failed to calculate EDGE"))
        });
    }

    group.bench_function(BenchmarkId::new("signed_slices", candles.len()), |b| {
        let input = EdgeInput::from_slices(
            &candles.open,
            &candles.high,
            &candles.low,
            &candles.close,
            EdgeParams { sign: Some(true) },
        );
        b.iter(|| edge(black_box(&input)).expect("Failed to calculate EDGE"))
    });

    group.finish();
}

criterion_group!(benches, benchmark_edge);
criterion_main!(benches);
