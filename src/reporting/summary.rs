use serde::Serialize;

use crate::types::Monetary;

/// Activity of a single calendar day.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct DateBucket {
    /// `YYYY-MM-DD`, UTC.
    pub date: String,
    /// Only settled records contribute here.
    pub amount: Monetary,
    /// Every record of the day, whatever its status.
    pub count: u64
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct StatusBucket {
    pub status: String,
    pub count: u64,
    pub total: Monetary
}

/// Dashboard view of deposit and withdrawal activity.
///
/// Built fresh by [`aggregate`](super::aggregate) on every request and never
/// mutated afterwards.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_deposits: Monetary,
    pub total_withdrawals: Monetary,
    pub net_profit: Monetary,
    pub pending_deposits: u64,
    pub pending_withdrawals: u64,
    pub approved_deposits: u64,
    pub completed_withdrawals: u64,
    pub deposits_by_date: Vec<DateBucket>,
    pub withdrawals_by_date: Vec<DateBucket>,
    pub deposits_by_status: Vec<StatusBucket>,
    pub withdrawals_by_status: Vec<StatusBucket>
}
