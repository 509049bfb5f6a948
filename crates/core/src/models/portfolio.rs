use serde::{Deserialize, Serialize};

/// A complete-at-a-point-in-time view of one portfolio, as pushed by the
/// backend over the live channel.
///
/// **Important**: a single message is not guaranteed to carry the full item
/// list — the server may omit unchanged holdings. The synchronizer merges
/// `items` across messages (see `sync::merge`), while the top-level
/// aggregate fields always reflect the latest message verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    /// Backend portfolio identifier
    pub id: i64,

    /// Display name of the portfolio (e.g., "XTB_USD")
    pub portfolio_name: String,

    /// Sum of all purchases, computed server-side
    pub total_invested: f64,

    /// Current market value of all holdings, computed server-side
    pub total_current_value: f64,

    /// Absolute profit/loss, computed server-side
    pub total_profit: f64,

    /// Relative profit/loss, computed server-side
    pub total_profit_percentage: f64,

    /// Holdings keyed by symbol. Defaults to empty when the message omits it.
    #[serde(default)]
    pub items: Vec<PortfolioItem>,
}

/// A single holding within a portfolio, unique by `symbol` at any instant.
///
/// All numeric fields are computed server-side; the client never recomputes
/// them. The mixed string/number fields mirror the backend wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: i64,

    /// Ticker symbol (e.g., "XTB", "AAPL") — the merge key
    pub symbol: String,

    /// Human-readable instrument name
    pub name: String,

    pub total_quantity: f64,
    pub average_purchase_price: f64,
    pub current_price: f64,

    /// Day change, formatted server-side (e.g., "+1.25%")
    pub percentage_change: String,

    pub total_value: f64,
    pub profit: f64,

    /// Profit relative to invested, formatted server-side
    pub profit_percentage: String,
}
