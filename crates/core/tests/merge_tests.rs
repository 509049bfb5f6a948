// ═══════════════════════════════════════════════════════════════════
// Merge Tests — snapshot reconciliation rule in isolation
// ═══════════════════════════════════════════════════════════════════

use portfolio_dashboard_core::models::portfolio::{PortfolioItem, PortfolioSnapshot};
use portfolio_dashboard_core::sync::merge;

fn item(symbol: &str, quantity: f64) -> PortfolioItem {
    PortfolioItem {
        id: 0,
        symbol: symbol.to_string(),
        name: symbol.to_string(),
        total_quantity: quantity,
        average_purchase_price: 100.0,
        current_price: 100.0,
        percentage_change: "0.00%".into(),
        total_value: quantity * 100.0,
        profit: 0.0,
        profit_percentage: "0.00%".into(),
    }
}

fn snapshot(total_profit: f64, items: Vec<PortfolioItem>) -> PortfolioSnapshot {
    PortfolioSnapshot {
        id: 1,
        portfolio_name: "XTB_USD".into(),
        total_invested: 1000.0,
        total_current_value: 1000.0 + total_profit,
        total_profit,
        total_profit_percentage: total_profit / 10.0,
        items,
    }
}

fn symbols(snapshot: &PortfolioSnapshot) -> Vec<&str> {
    snapshot.items.iter().map(|i| i.symbol.as_str()).collect()
}

fn quantity_of(snapshot: &PortfolioSnapshot, symbol: &str) -> f64 {
    snapshot
        .items
        .iter()
        .find(|i| i.symbol == symbol)
        .expect("symbol present")
        .total_quantity
}

#[test]
fn first_snapshot_is_taken_verbatim() {
    let incoming = snapshot(50.0, vec![item("XTB", 1.0)]);
    let merged = merge(None, incoming.clone());
    assert_eq!(merged, incoming);
}

#[test]
fn disjoint_item_sets_accumulate() {
    // Snapshot A mentions only XTB, snapshot B only ABC: both must be
    // present afterwards.
    let a = snapshot(10.0, vec![item("XTB", 1.0)]);
    let b = snapshot(20.0, vec![item("ABC", 2.0)]);

    let merged = merge(Some(&merge(None, a)), b);

    assert_eq!(symbols(&merged), vec!["XTB", "ABC"]);
    assert_eq!(quantity_of(&merged, "XTB"), 1.0);
    assert_eq!(quantity_of(&merged, "ABC"), 2.0);
}

#[test]
fn same_symbol_is_last_writer_wins() {
    let a = snapshot(10.0, vec![item("XTB", 1.0)]);
    let b = snapshot(20.0, vec![item("XTB", 5.0)]);

    let merged = merge(Some(&merge(None, a)), b);

    assert_eq!(merged.items.len(), 1);
    assert_eq!(quantity_of(&merged, "XTB"), 5.0);
}

#[test]
fn aggregates_always_come_from_the_latest_snapshot() {
    let a = snapshot(10.0, vec![item("XTB", 1.0)]);
    let b = snapshot(99.0, vec![]);

    let merged = merge(Some(&merge(None, a)), b);

    // Items merged-not-replaced, aggregates overwritten wholesale.
    assert_eq!(symbols(&merged), vec!["XTB"]);
    assert_eq!(merged.total_profit, 99.0);
    assert_eq!(merged.total_current_value, 1099.0);
    assert_eq!(merged.total_profit_percentage, 9.9);
}

#[test]
fn empty_incoming_item_list_drops_nothing() {
    let a = snapshot(10.0, vec![item("XTB", 1.0), item("ABC", 2.0)]);
    let b = snapshot(20.0, vec![]);

    let merged = merge(Some(&merge(None, a)), b);

    assert_eq!(symbols(&merged), vec!["XTB", "ABC"]);
}

#[test]
fn item_order_is_prior_first_then_new_arrivals() {
    let a = snapshot(10.0, vec![item("XTB", 1.0), item("ABC", 2.0)]);
    let b = snapshot(20.0, vec![item("ZZZ", 3.0), item("ABC", 9.0)]);

    let merged = merge(Some(&merge(None, a)), b);

    // ABC updated in place, ZZZ appended.
    assert_eq!(symbols(&merged), vec!["XTB", "ABC", "ZZZ"]);
    assert_eq!(quantity_of(&merged, "ABC"), 9.0);
}

#[test]
fn each_symbol_reflects_the_most_recent_mention() {
    // Apply a longer sequence and check the per-symbol property: for every
    // symbol, the surviving item comes from the last snapshot mentioning it,
    // and symbols never mentioned again are retained.
    let sequence = vec![
        snapshot(1.0, vec![item("AAA", 1.0), item("BBB", 1.0)]),
        snapshot(2.0, vec![item("BBB", 2.0), item("CCC", 2.0)]),
        snapshot(3.0, vec![item("AAA", 3.0)]),
        snapshot(4.0, vec![item("DDD", 4.0)]),
    ];

    let mut state: Option<PortfolioSnapshot> = None;
    for incoming in sequence {
        state = Some(merge(state.as_ref(), incoming));
    }
    let merged = state.unwrap();

    assert_eq!(quantity_of(&merged, "AAA"), 3.0); // last mentioned in S3
    assert_eq!(quantity_of(&merged, "BBB"), 2.0); // last mentioned in S2
    assert_eq!(quantity_of(&merged, "CCC"), 2.0); // never dropped
    assert_eq!(quantity_of(&merged, "DDD"), 4.0);
    assert_eq!(merged.total_profit, 4.0); // aggregates from S4 alone
}

#[test]
fn merge_does_not_mutate_the_prior_snapshot() {
    let prior = merge(None, snapshot(10.0, vec![item("XTB", 1.0)]));
    let before = prior.clone();
    let _ = merge(Some(&prior), snapshot(20.0, vec![item("XTB", 2.0)]));
    assert_eq!(prior, before);
}
