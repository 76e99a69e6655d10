//! Property-based and deterministic invariant tests.
//!
//! Replays generated request streams into the engine and asserts, per call
//! and globally: quantity conservation, response shape (k fills then one
//! terminal report), strictly increasing execution ids, and healthy books
//! (priority-ordered, only open orders with remaining quantity).

use std::collections::HashMap;

use kestrel_matching_engine::market_data_gen::{Generator, GeneratorConfig, Request};
use kestrel_matching_engine::{
    ExecutionReport, MatchEngine, OrdStatus, OrdType, Response, Side, StepClock,
};
use proptest::prelude::*;

fn engine() -> MatchEngine {
    MatchEngine::with_clock(Box::new(StepClock::new(1, 1)))
}

fn exec_seq(report: &ExecutionReport) -> u32 {
    report.exec_id[1..].parse().expect("exec id is E<n>")
}

/// Per-call response shape for a new order: k single-fill reports for the
/// resting counterparties, then one terminal report whose fill quantities
/// sum to its cum_qty.
fn assert_order_response_shape(responses: &[Response]) {
    assert!(!responses.is_empty());
    let reports: Vec<&ExecutionReport> = responses
        .iter()
        .map(|r| r.as_execution_report().expect("order flow emits only reports"))
        .collect();
    let (terminal, resting) = reports.split_last().unwrap();
    for r in resting {
        assert_eq!(r.fills.len(), 1, "resting reports carry exactly one fill");
        assert!(r.fills[0].fill_qty <= r.cum_qty, "fill is part of cum");
        assert!(
            matches!(r.ord_status, OrdStatus::Filled | OrdStatus::PartiallyFilled),
            "resting orders are filled or partially filled"
        );
    }
    let swept: u32 = resting.iter().map(|r| r.fills[0].fill_qty).sum();
    let terminal_filled: u32 = terminal.fills.iter().map(|f| f.fill_qty).sum();
    assert_eq!(swept, terminal_filled, "both sides of each fill agree");
    assert_eq!(
        terminal.cum_qty, terminal_filled,
        "terminal cum equals its fills (orders enter with cum 0)"
    );
}

/// Each side holds only open limit orders with remaining quantity, in
/// strict price/time priority.
fn assert_books_healthy(engine: &MatchEngine) {
    for book in engine.books().values() {
        for side in [Side::Buy, Side::Sell] {
            let orders: Vec<_> = book.side(side).orders().collect();
            for o in &orders {
                assert!(o.is_open());
                assert!(o.leaves_qty() > 0);
                assert_eq!(o.ord_type(), OrdType::Limit);
                assert!(o.price().is_some());
                assert_eq!(o.side(), side);
            }
            for pair in orders.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                let (pa, pb) = (a.price().unwrap(), b.price().unwrap());
                match side {
                    Side::Buy => assert!(pa >= pb, "bids ordered best first"),
                    Side::Sell => assert!(pa <= pb, "asks ordered best first"),
                }
                if pa == pb {
                    assert!(a.entry_time() <= b.entry_time(), "ties by entry time");
                }
            }
        }
    }
}

/// Replay, asserting per-call shape; returns all responses in order.
fn replay_checked(engine: &mut MatchEngine, requests: Vec<Request>) -> Vec<Response> {
    let mut all = Vec::new();
    for request in requests {
        match request {
            Request::Order { source, order } => {
                let responses = engine.on_order(&source, &order).unwrap();
                assert_order_response_shape(&responses);
                all.extend(responses);
            }
            Request::Cancel { source, cancel } => {
                let responses = engine.on_cancel_request(&source, &cancel);
                assert_eq!(responses.len(), 1, "cancels always answer once");
                all.extend(responses);
            }
        }
    }
    all
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// For any (seed, num_requests) in range: after replay, books are
    /// healthy, execution ids strictly increase, and per-order quantity is
    /// conserved across every report emitted for it.
    #[test]
    fn replay_preserves_engine_invariants(
        seed in 0u64..100_000u64,
        num_requests in 10usize..150usize,
    ) {
        let requests = Generator::new(GeneratorConfig {
            seed,
            num_requests,
            ..Default::default()
        })
        .all_requests();
        let mut engine = engine();
        let responses = replay_checked(&mut engine, requests);

        let mut last_exec = 0u32;
        let mut order_qty_by_id: HashMap<String, u32> = HashMap::new();
        let mut cum_by_id: HashMap<String, u32> = HashMap::new();
        for response in &responses {
            let Some(report) = response.as_execution_report() else {
                continue;
            };
            let seq = exec_seq(report);
            prop_assert!(seq > last_exec, "execution ids strictly increase");
            last_exec = seq;

            let total = report.cum_qty + report.leaves_qty;
            let known = order_qty_by_id
                .entry(report.order_id.clone())
                .or_insert(total);
            prop_assert_eq!(*known, total, "cum + leaves is constant per order");

            let cum = cum_by_id.entry(report.order_id.clone()).or_insert(0);
            prop_assert!(report.cum_qty >= *cum, "cum never decreases");
            prop_assert!(report.cum_qty <= total, "no over-fill");
            *cum = report.cum_qty;
        }

        assert_books_healthy(&engine);
    }
}

/// Same config ⇒ byte-identical response stream.
#[test]
fn deterministic_replay_same_seed_same_responses() {
    let config = GeneratorConfig {
        seed: 999,
        num_requests: 80,
        cancel_ratio: 0.2,
        ..Default::default()
    };

    let mut engine1 = engine();
    let requests1 = Generator::new(config.clone()).all_requests();
    let responses1 = replay_checked(&mut engine1, requests1);

    let mut engine2 = engine();
    let requests2 = Generator::new(config).all_requests();
    let responses2 = replay_checked(&mut engine2, requests2);

    assert_eq!(responses1.len(), responses2.len());
    assert_eq!(
        serde_json::to_string(&responses1).unwrap(),
        serde_json::to_string(&responses2).unwrap()
    );
}

/// Cancels of already-canceled or never-entered orders always reject.
#[test]
fn repeated_and_unknown_cancels_always_reject() {
    let mut engine = engine();
    let requests = Generator::new(GeneratorConfig {
        seed: 4242,
        num_requests: 120,
        cancel_ratio: 0.4,
        ..Default::default()
    })
    .all_requests();

    let mut canceled: Vec<(String, String)> = Vec::new();
    for request in requests {
        match request {
            Request::Order { source, order } => {
                engine.on_order(&source, &order).unwrap();
            }
            Request::Cancel { source, cancel } => {
                let responses = engine.on_cancel_request(&source, &cancel);
                let key = (source.clone(), cancel.cl_ord_id.clone());
                if canceled.contains(&key) {
                    // A later duplicate may still hit another live order with
                    // the same id only if the client reused it; the generator
                    // never reuses ids, so this must reject.
                    assert!(
                        responses[0].as_cancel_reject().is_some(),
                        "second cancel of {:?} must reject",
                        key
                    );
                } else if responses[0].as_execution_report().is_some() {
                    canceled.push(key);
                }
            }
        }
    }
}
