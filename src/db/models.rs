use serde::Serialize;
use sqlx::FromRow;

/// One scored image submission, insert-only.
#[derive(Debug)]
pub struct NewSubmission {
    pub address: String,
    /// Epoch milliseconds at scoring time.
    pub timestamp: i64,
    pub score: i64,
    /// Raw prediction payload, stored verbatim.
    pub result: serde_json::Value,
}

/// Per-address rollup computed by the history aggregation.
#[derive(Debug, FromRow, Serialize)]
pub struct AddressAggregate {
    pub address: String,
    #[serde(rename = "totalScore")]
    pub total_score: i64,
    pub count: i64,
}
