use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pgchain::{FilterGroup, SelectOptions, Upsert, UpsertRow, compile_select};
use serde_json::{Map, Value};

/// Build a filter group with `n` scalar constraints.
fn build_group(n: usize) -> FilterGroup {
    let mut group = FilterGroup::new();
    for i in 0..n {
        group.insert(format!("someColumn{i}"), i as i64);
    }
    group
}

/// Build an upsert row with `n` columns.
fn build_row(n: usize, seed: i64) -> UpsertRow {
    let mut row = Map::new();
    for i in 0..n {
        row.insert(format!("someColumn{i}"), Value::from(seed + i as i64));
    }
    row
}

fn bench_compile_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/select");

    for n in [1, 5, 10, 50] {
        let filters = build_group(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &filters, |b, filters| {
            b.iter(|| {
                black_box(
                    compile_select(
                        "public.users",
                        filters.clone(),
                        &SelectOptions::default(),
                    )
                    .unwrap(),
                )
            });
        });
    }

    group.finish();
}

fn bench_compile_select_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/select_in_list");

    for n in [5, 20, 100, 500] {
        let ids: Vec<i64> = (0..n).collect();
        let filters = FilterGroup::new().with("id", ids);
        group.bench_with_input(BenchmarkId::from_parameter(n), &filters, |b, filters| {
            b.iter(|| {
                black_box(
                    compile_select(
                        "public.users",
                        filters.clone(),
                        &SelectOptions::default(),
                    )
                    .unwrap(),
                )
            });
        });
    }

    group.finish();
}

fn bench_compile_upsert(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/upsert");

    for rows in [1, 10, 100] {
        let upsert = Upsert::new("public.users")
            .rows((0..rows).map(|r| build_row(8, r)))
            .on_conflict(["someColumn0"])
            .update(["someColumn1", "someColumn2"]);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &upsert, |b, upsert| {
            b.iter(|| black_box(upsert.compile().unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compile_select,
    bench_compile_select_in_list,
    bench_compile_upsert
);
criterion_main!(benches);
