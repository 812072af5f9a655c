use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::errors::TransitionError;
use crate::models::DepositStatus;
use crate::types::{deserialize_timestamp, Monetary, RecordId, UserId};

/// A cash-in request as supplied by the record source.
///
/// The record is trusted as-is. An amount that was missing or malformed
/// upstream is kept as `None` and counts as zero wherever it is summed.
#[derive(Debug, Clone, Deserialize)]
pub struct Deposit {
    pub id: RecordId,
    pub user_id: UserId,
    #[serde(default, deserialize_with = "Monetary::deserialize_lenient")]
    pub amount: Option<Monetary>,
    pub status: DepositStatus,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>
}

impl Deposit {
    /// The amount with the absent-as-zero coercion applied.
    pub fn amount_or_zero(&self) -> Monetary {
        self.amount.unwrap_or_default()
    }

    pub fn approve(&mut self) -> Result<(), TransitionError> {
        self.transition(DepositStatus::Approved)
    }

    pub fn reject(&mut self) -> Result<(), TransitionError> {
        self.transition(DepositStatus::Rejected)
    }

    fn transition(&mut self, to: DepositStatus) -> Result<(), TransitionError> {
        if self.status != DepositStatus::Pending {
            return Err(TransitionError::deposit(self, to));
        }

        self.status = to;

        Ok(())
    }
}
