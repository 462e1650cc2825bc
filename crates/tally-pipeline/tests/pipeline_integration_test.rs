//! End-to-end pipeline tests: full chains of stages driven by postings.

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use tally_core::{Amount, CommodityPool, Posting, Value};
use tally_expr::Expr;
use tally_pipeline::{
    CalcPostings, CollectPostings, FilterPostings, PipelineError, PostingHandler, SortPostings,
    UnreachedSink,
};

fn posting(day: u32, account: &str, quantity: rust_decimal::Decimal) -> Posting {
    Posting::new(
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
        account,
        Amount::new(quantity),
    )
}

#[test]
fn full_chain_filters_totals_and_sorts() {
    let pool = CommodityPool::new();
    let predicate = Expr::parse("account =~ /Expenses:/", &pool).unwrap();
    let key = Expr::parse("date", &pool).unwrap();

    let mut head = FilterPostings::new(
        predicate,
        CalcPostings::new(SortPostings::new(key, CollectPostings::new())),
    );

    head.handle(posting(9, "Expenses:Food", dec!(10))).unwrap();
    head.handle(posting(3, "Assets:Bank", dec!(-10))).unwrap();
    head.handle(posting(2, "Expenses:Rent", dec!(900))).unwrap();
    head.handle(posting(5, "Expenses:Food", dec!(4))).unwrap();
    head.flush().unwrap();

    let collected = head.into_next().into_next().into_next().into_postings();
    let accounts: Vec<&str> = collected.iter().map(|p| p.account.as_str()).collect();
    assert_eq!(
        accounts,
        vec!["Expenses:Rent", "Expenses:Food", "Expenses:Food"]
    );

    // Running totals were attached in arrival order, before the sort
    let indices: Vec<&Value> = collected.iter().map(|p| &p.meta["index"]).collect();
    assert_eq!(
        indices,
        vec![&Value::integer(2), &Value::integer(3), &Value::integer(1)]
    );
}

#[test]
fn sort_is_stable_for_equal_keys() {
    let pool = CommodityPool::new();
    let key = Expr::parse("date", &pool).unwrap();
    let mut sort = SortPostings::new(key, CollectPostings::new());

    // Keys [8, 5, 5, 3] tagged [1, 2, 3, 4] must come out [4, 2, 3, 1]
    for (day, tag) in [(8, 1i64), (5, 2), (5, 3), (3, 4)] {
        let p = posting(day, "Expenses:Food", dec!(1)).with_meta("tag", Value::integer(tag));
        sort.handle(p).unwrap();
    }
    sort.flush().unwrap();

    let tags: Vec<Value> = sort
        .into_next()
        .into_postings()
        .iter()
        .map(|p| p.meta["tag"].clone())
        .collect();
    assert_eq!(
        tags,
        vec![
            Value::integer(4),
            Value::integer(2),
            Value::integer(3),
            Value::integer(1),
        ]
    );
}

#[test]
fn unreached_sink_stays_untouched_behind_a_buffering_stage() {
    let pool = CommodityPool::new();
    let key = Expr::parse("date", &pool).unwrap();
    let mut sort = SortPostings::new(key, UnreachedSink::new());

    // The buffering stage absorbs deliveries without forwarding
    sort.handle(posting(1, "Expenses:Food", dec!(1))).unwrap();
    sort.handle(posting(2, "Expenses:Food", dec!(2))).unwrap();

    // Direct delivery to the sink is a wiring error
    let mut sink = UnreachedSink::new();
    assert!(matches!(
        sink.handle(posting(1, "Expenses:Food", dec!(1))),
        Err(PipelineError::ContractViolation {
            stage: "UnreachedSink"
        })
    ));
}

#[test]
fn chains_compose_dynamically_through_boxed_stages() {
    let pool = CommodityPool::new();
    let predicate = Expr::parse("amount > 5", &pool).unwrap();

    let mut head: Box<dyn PostingHandler> = Box::new(FilterPostings::new(
        predicate,
        CalcPostings::new(CollectPostings::new()),
    ));

    head.handle(posting(1, "Expenses:Food", dec!(10))).unwrap();
    head.handle(posting(2, "Expenses:Food", dec!(2))).unwrap();
    head.flush().unwrap();
}

#[test]
fn filter_sees_fields_computed_upstream() {
    let pool = CommodityPool::new();
    // The calc stage attaches `index`; a downstream filter can use it
    let predicate = Expr::parse("index > 1", &pool).unwrap();

    let mut head = CalcPostings::new(FilterPostings::new(predicate, CollectPostings::new()));
    head.handle(posting(1, "Expenses:Food", dec!(1))).unwrap();
    head.handle(posting(2, "Expenses:Food", dec!(2))).unwrap();
    head.handle(posting(3, "Expenses:Food", dec!(3))).unwrap();
    head.flush().unwrap();

    let collected = head.into_next().into_next().into_postings();
    assert_eq!(collected.len(), 2);
}

#[test]
fn mixed_commodity_totals_survive_the_chain() {
    let pool = CommodityPool::new();
    let key = Expr::parse("date", &pool).unwrap();
    let mut head = CalcPostings::new(SortPostings::new(key, CollectPostings::new()));

    let mut p = posting(2, "Expenses:Travel", dec!(0));
    p.amount = Amount::with_commodity(dec!(100), pool.find_or_create("USD"));
    head.handle(p).unwrap();

    let mut p = posting(1, "Expenses:Travel", dec!(0));
    p.amount = Amount::with_commodity(dec!(80), pool.find_or_create("EUR"));
    head.handle(p).unwrap();

    head.flush().unwrap();

    let collected = head.into_next().into_next().into_postings();
    let Value::Balance(total) = &collected[0].meta["total"] else {
        panic!("expected balance total");
    };
    // First sorted posting arrived second; its running total holds both
    assert_eq!(total.amount_for("USD").unwrap().quantity(), dec!(100));
    assert_eq!(total.amount_for("EUR").unwrap().quantity(), dec!(80));
}
