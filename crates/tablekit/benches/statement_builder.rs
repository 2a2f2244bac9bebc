use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tablekit::{
    Condition, Conditions, Dialect, FieldDefinition, OutputColumns, Statement, ValueTuple,
};

/// SELECT col0, col1, ... FROM t WHERE col0 = $1 AND col1 = $2 ...
fn build_select(n: usize) -> Statement {
    let columns = OutputColumns::new((0..n).map(|i| format!("col{i}")));
    let conditions: Conditions = (0..n)
        .map(|i| Condition::eq(&format!("col{i}"), i as i64).unwrap())
        .collect();

    let mut s = Statement::new("SELECT ");
    s.push_fragment(&columns).push(" FROM t WHERE ").push_fragment(&conditions);
    s
}

fn bench_to_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement/to_sql");

    for n in [1, 5, 10, 50, 100] {
        let s = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &s, |b, s| {
            b.iter(|| black_box(s.to_sql(Dialect::Postgres)));
        });
    }

    group.finish();
}

fn bench_to_inline_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement/to_inline_sql");

    for n in [1, 10, 100] {
        let s = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &s, |b, s| {
            b.iter(|| black_box(s.to_inline_sql(Dialect::MySql)));
        });
    }

    group.finish();
}

fn bench_create_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement/create_table");

    for n in [2, 20, 200] {
        let fields: Vec<FieldDefinition> = (0..n)
            .map(|i| FieldDefinition::new(format!("f{i}"), "VARCHAR(30)").attr("NOT NULL"))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &fields, |b, fields| {
            b.iter(|| {
                let mut s = Statement::new("CREATE TABLE IF NOT EXISTS t(");
                s.push_joined(fields, ", ").push(")");
                black_box(s.to_sql(Dialect::Postgres));
            });
        });
    }

    group.finish();
}

fn bench_value_tuple(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement/value_tuple");

    for n in [5, 20, 100] {
        let row = ValueTuple::new((0..n).map(|i| format!("value {i}")));
        group.bench_with_input(BenchmarkId::from_parameter(n), &row, |b, row| {
            b.iter(|| {
                let mut s = Statement::new("INSERT INTO t VALUES ");
                s.push_fragment(row);
                black_box(s.to_sql(Dialect::Postgres));
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_to_sql,
    bench_to_inline_sql,
    bench_create_table,
    bench_value_tuple
);
criterion_main!(benches);
