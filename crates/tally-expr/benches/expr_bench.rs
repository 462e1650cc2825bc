//! Expression engine performance benchmarks.
//!
//! Run with: cargo bench -p tally-expr

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tally_core::{CommodityPool, Value};
use tally_expr::{Expr, SymbolScope};

const EXPRESSIONS: &[(&str, &str)] = &[
    ("arithmetic", "1 + 2 * 3 - 4 / 2"),
    ("predicate", "account =~ /Expenses:/ and total > 100"),
    ("ternary", "total > 100 ? 'large' : total > 10 ? 'medium' : 'small'"),
    ("amounts", "{10.00 USD} + {5.50 USD} * 3"),
];

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, source) in EXPRESSIONS {
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, source| {
            let pool = CommodityPool::new();
            b.iter(|| Expr::parse(black_box(source), &pool).unwrap());
        });
    }
    group.finish();
}

fn bench_calc(c: &mut Criterion) {
    let pool = CommodityPool::new();
    let mut scope = SymbolScope::new();
    scope.define_value("account", Value::string("Expenses:Food:Coffee"));
    scope.define_value("total", Value::integer(250));

    let mut group = c.benchmark_group("calc");
    for (name, source) in EXPRESSIONS {
        let expr = Expr::parse(source, &pool).unwrap();
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| expr.calc(black_box(&scope)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_calc);
criterion_main!(benches);
