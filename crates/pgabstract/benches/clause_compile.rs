use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pgabstract::prelude::*;
use serde_json::json;

/// `{col0: 0, col1: 1, ...}`
fn columns(n: usize) -> ValueNode {
    ValueNode::map((0..n).map(|i| (format!("col{i}"), ValueNode::from(i as i64))))
}

fn bench_upsert(c: &mut Criterion) {
    let pg = PgAbstract::new();
    let mut group = c.benchmark_group("clause_compile/upsert");

    for n in [1, 5, 10, 50, 100] {
        let values = columns(n);
        let options = InsertOptions::new()
            .on_conflict(ConflictSpec::do_update(["col0"], [("col1", 1)]))
            .returning(ValueNode::seq(["col0"]));
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| black_box(pg.insert("t", values, &options).unwrap()));
        });
    }

    group.finish();
}

fn bench_select_with_joins(c: &mut Criterion) {
    let pg = PgAbstract::new();
    let mut group = c.benchmark_group("clause_compile/select_joins");

    for n in [1, 5, 10, 50] {
        let source = (0..n).fold(Source::table("base"), |source, i| {
            source.join(JoinSpec::left(format!("t{i}")).on("base_id", "id"))
        });
        let tail = SelectTail::from(
            SelectOptions::new()
                .group_by(ValueNode::seq(["base.id"]))
                .having(ValueNode::map([("base.kind", "x")]))
                .limit(10)
                .offset(20),
        );
        group.bench_with_input(BenchmarkId::from_parameter(n), &source, |b, source| {
            b.iter(|| {
                black_box(
                    pg.select(source, &ValueNode::Absent, &columns(5), Some(&tail))
                        .unwrap(),
                )
            });
        });
    }

    group.finish();
}

fn bench_classify_and_compile(c: &mut Criterion) {
    let pg = PgAbstract::new();
    let input = json!({
        "source": ["orders", ["-left", "customers", "customer_id", "id"]],
        "fields": ["orders.id", ["customers.name", "customer"]],
        "where": {"orders.status": {"-in": ["open", "paid"]}, "customers.active": true},
        "tail": {"order_by": {"-desc": "orders.id"}, "limit": 10, "for": "update"}
    });

    c.bench_function("clause_compile/classify_and_compile", |b| {
        b.iter(|| {
            let source = Source::try_from(&ValueNode::classify(input["source"].clone()).unwrap())
                .unwrap();
            let fields = ValueNode::classify(input["fields"].clone()).unwrap();
            let where_clause = ValueNode::classify(input["where"].clone()).unwrap();
            let tail =
                SelectTail::try_from(&ValueNode::classify(input["tail"].clone()).unwrap()).unwrap();
            black_box(
                pg.select(&source, &fields, &where_clause, Some(&tail))
                    .unwrap(),
            )
        });
    });
}

criterion_group!(
    benches,
    bench_upsert,
    bench_select_with_joins,
    bench_classify_and_compile
);
criterion_main!(benches);
