use std::collections::HashMap;

use crate::models::portfolio::PortfolioSnapshot;

/// Reconcile an inbound snapshot against the previously held one.
///
/// The rule is deliberately asymmetric:
/// - every top-level aggregate (`total_invested`, `total_profit`, …) is
///   overwritten wholesale by `incoming` — aggregates always reflect the
///   latest message;
/// - `items` are merged per symbol, last-writer-wins: entries in
///   `incoming.items` overwrite or append, while symbols present only in
///   the prior state are retained. A server that omits unchanged holdings
///   must not make them disappear.
///
/// Item order is stable: prior items keep their positions, new symbols are
/// appended in arrival order.
///
/// Pure function — no I/O, no locking — so the channel plumbing around it
/// can be tested separately.
#[must_use]
pub fn merge(prior: Option<&PortfolioSnapshot>, incoming: PortfolioSnapshot) -> PortfolioSnapshot {
    let Some(prior) = prior else {
        // First message becomes the local state verbatim.
        return incoming;
    };

    let mut incoming = incoming;
    let incoming_items = std::mem::take(&mut incoming.items);

    let mut items = prior.items.clone();
    let mut index: HashMap<String, usize> = items
        .iter()
        .enumerate()
        .map(|(i, item)| (item.symbol.clone(), i))
        .collect();

    for item in incoming_items {
        match index.get(&item.symbol) {
            Some(&i) => items[i] = item,
            None => {
                index.insert(item.symbol.clone(), items.len());
                items.push(item);
            }
        }
    }

    PortfolioSnapshot { items, ..incoming }
}
