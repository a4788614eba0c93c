use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use table_profiler::{
    Column, CombinationProfiler, ExhaustiveProfiler, MemoryRows, Profiler, Row, Value,
};

/// Synthetic order table: a unique id, two low-cardinality dimensions, a
/// column functionally dependent on one of them, and a noisy measure.
fn synthetic_table(rows: usize) -> (Vec<Column>, Vec<Row>) {
    let columns = vec![
        Column::new(0, "ID"),
        Column::new(1, "REGION"),
        Column::new(2, "CATEGORY"),
        Column::new(3, "CATEGORY_NAME"),
        Column::new(4, "AMOUNT"),
    ];
    let regions = ["NORTH", "SOUTH", "EAST", "WEST"];
    let mut rng = StdRng::seed_from_u64(42);
    let rows = (0..rows)
        .map(|i| {
            let category = rng.gen_range(0..8i64);
            vec![
                Value::Int64(i as i64),
                Value::str(regions[rng.gen_range(0..regions.len())]),
                Value::Int64(category),
                Value::str(format!("CAT-{}", category)),
                Value::Float64((rng.gen_range(0..10_000) as f64) / 100.0),
            ]
        })
        .collect();
    (columns, rows)
}

fn bench_combination_profiler(c: &mut Criterion) {
    let (columns, rows) = synthetic_table(2_000);
    c.bench_function("combination_profile_2k_rows", |b| {
        b.iter(|| {
            let profiler = CombinationProfiler::new();
            let mut source = MemoryRows::new(rows.clone());
            black_box(profiler.profile(&mut source, &columns).unwrap())
        })
    });
}

fn bench_exhaustive_profiler(c: &mut Criterion) {
    let (columns, rows) = synthetic_table(2_000);
    c.bench_function("exhaustive_profile_2k_rows", |b| {
        b.iter(|| {
            let profiler = ExhaustiveProfiler::new();
            let mut source = MemoryRows::new(rows.clone());
            black_box(profiler.profile(&mut source, &columns).unwrap())
        })
    });
}

criterion_group!(benches, bench_combination_profiler, bench_exhaustive_profiler);
criterion_main!(benches);
