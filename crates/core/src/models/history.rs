use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One point of the portfolio value time series, fetched on demand via
/// `/portfolio/{id}/history` — independent of the push channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub total_invested: f64,
    pub total_current_value: f64,
}
