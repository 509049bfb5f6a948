use serde::{Deserialize, Serialize};

/// A single buy transaction, scoped to a `(portfolio, symbol)` pair.
///
/// Created via `ApiClient::add_transaction` (the server assigns `id` in the
/// response) and removed via `ApiClient::delete_transaction`; never mutated
/// in place. `current_price` and `profit_percentage` arrive as strings —
/// a backend quirk preserved verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Server-assigned identifier; `0` on a not-yet-created transaction
    pub id: i64,

    /// Ticker symbol this transaction belongs to
    pub symbol: String,

    pub profit_percentage: String,

    /// Transaction date as the backend formats it (e.g., "2025-01-15")
    pub date: String,

    pub purchase_price: f64,
    pub current_price: String,
    pub quantity: f64,
}
