use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use crate::models::{Deposit, DepositStatus, Withdrawal, WithdrawalStatus};
use crate::reporting::summary::{DateBucket, ReportSummary, StatusBucket};
use crate::types::{DateRange, Monetary};

/// The view of a record the aggregator needs, shared by deposits and withdrawals.
trait Reportable {
    fn created_at(&self) -> &DateTime<Utc>;
    fn status_label(&self) -> &'static str;
    fn reported_amount(&self) -> Monetary;
    fn is_pending(&self) -> bool;
    /// Approved deposits and completed withdrawals.
    fn is_settled(&self) -> bool;
}

impl Reportable for Deposit {
    fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    fn status_label(&self) -> &'static str {
        self.status.as_str()
    }

    fn reported_amount(&self) -> Monetary {
        self.amount_or_zero()
    }

    fn is_pending(&self) -> bool {
        self.status == DepositStatus::Pending
    }

    fn is_settled(&self) -> bool {
        self.status == DepositStatus::Approved
    }
}

impl Reportable for Withdrawal {
    fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    fn status_label(&self) -> &'static str {
        self.status.as_str()
    }

    fn reported_amount(&self) -> Monetary {
        self.effective_amount()
    }

    fn is_pending(&self) -> bool {
        self.status == WithdrawalStatus::Pending
    }

    fn is_settled(&self) -> bool {
        self.status == WithdrawalStatus::Completed
    }
}

#[derive(Default)]
struct Tally {
    settled_total: Monetary,
    pending: u64,
    settled: u64,
    by_date: BTreeMap<String, DateBucket>,
    by_status: Vec<StatusBucket>
}

impl Tally {
    fn fold<R: Reportable>(records: &[R], range: Option<&DateRange>) -> Self {
        let mut tally = Tally::default();

        let in_range = records.iter()
            .filter(|record| range.is_none_or(|range| range.contains(record.created_at())));

        for record in in_range {
            tally.record(record);
        }

        tally
    }

    fn record<R: Reportable>(&mut self, record: &R) {
        let amount = record.reported_amount();
        let settled = record.is_settled();

        if record.is_pending() {
            self.pending += 1;
        }

        if settled {
            self.settled += 1;
            self.settled_total += amount;
        }

        let date = record.created_at().date_naive().format("%Y-%m-%d").to_string();
        let day = self.by_date.entry(date.clone()).or_insert_with(|| DateBucket {
            date,
            amount: Monetary::new(),
            count: 0
        });

        day.count += 1;

        if settled {
            day.amount += amount;
        }

        let label = record.status_label();

        match self.by_status.iter_mut().find(|bucket| bucket.status == label) {
            Some(bucket) => {
                bucket.count += 1;
                bucket.total += amount;
            }
            None => self.by_status.push(StatusBucket {
                status: label.to_string(),
                count: 1,
                total: amount
            })
        }
    }
}

/// Folds already-loaded deposits and withdrawals into a report.
///
/// With a `range`, only records created inside it (inclusive on both ends)
/// are looked at. Totals only count approved deposits and completed
/// withdrawals; withdrawals are valued at their net amount when one is
/// recorded and at their gross amount otherwise.
pub fn aggregate(deposits: &[Deposit], withdrawals: &[Withdrawal], range: Option<&DateRange>) -> ReportSummary {
    let deposit_tally = Tally::fold(deposits, range);
    let withdrawal_tally = Tally::fold(withdrawals, range);

    let net_profit = deposit_tally.settled_total.checked_sub(withdrawal_tally.settled_total)
        .unwrap_or_else(|| {
            error!("Net profit overflowed, reporting zero");
            Monetary::new()
        });

    debug!(
        "Aggregated {} deposits and {} withdrawals into {} and {} days",
        deposits.len(),
        withdrawals.len(),
        deposit_tally.by_date.len(),
        withdrawal_tally.by_date.len()
    );

    ReportSummary {
        total_deposits: deposit_tally.settled_total,
        total_withdrawals: withdrawal_tally.settled_total,
        net_profit,
        pending_deposits: deposit_tally.pending,
        pending_withdrawals: withdrawal_tally.pending,
        approved_deposits: deposit_tally.settled,
        completed_withdrawals: withdrawal_tally.settled,
        deposits_by_date: deposit_tally.by_date.into_values().collect(),
        withdrawals_by_date: withdrawal_tally.by_date.into_values().collect(),
        deposits_by_status: deposit_tally.by_status,
        withdrawals_by_status: withdrawal_tally.by_status
    }
}
