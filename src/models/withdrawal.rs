use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::errors::TransitionError;
use crate::models::WithdrawalStatus;
use crate::types::{deserialize_timestamp, Monetary, RecordId, UserId};

/// A cash-out request. `net_amount` is what the user receives after fees and
/// is only known once the withdrawal has been settled.
#[derive(Debug, Clone, Deserialize)]
pub struct Withdrawal {
    pub id: RecordId,
    pub user_id: UserId,
    #[serde(default, deserialize_with = "Monetary::deserialize_lenient")]
    pub amount: Option<Monetary>,
    #[serde(default, deserialize_with = "Monetary::deserialize_lenient")]
    pub net_amount: Option<Monetary>,
    pub status: WithdrawalStatus,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>
}

impl Withdrawal {
    /// The net amount, falling back to the gross amount when no net amount is
    /// recorded. This is the only value reports ever sum for withdrawals.
    pub fn effective_amount(&self) -> Monetary {
        self.net_amount.or(self.amount).unwrap_or_default()
    }

    /// Settles the withdrawal. The fee is decided by whoever calls this; a
    /// `None` net amount keeps whatever net amount was already recorded.
    pub fn complete(&mut self, net_amount: Option<Monetary>) -> Result<(), TransitionError> {
        if self.status != WithdrawalStatus::Pending {
            return Err(TransitionError::withdrawal(self, WithdrawalStatus::Completed));
        }

        if let Some(net_amount) = net_amount {
            if net_amount.is_negative() {
                return Err(TransitionError::negative_net_amount(self, net_amount));
            }

            if net_amount > self.amount.unwrap_or_default() {
                return Err(TransitionError::net_exceeds_gross(self, net_amount));
            }

            self.net_amount = Some(net_amount);
        }

        self.status = WithdrawalStatus::Completed;

        Ok(())
    }

    pub fn reject(&mut self) -> Result<(), TransitionError> {
        self.transition(WithdrawalStatus::Rejected)
    }

    fn transition(&mut self, to: WithdrawalStatus) -> Result<(), TransitionError> {
        if self.status != WithdrawalStatus::Pending {
            return Err(TransitionError::withdrawal(self, to));
        }

        self.status = to;

        Ok(())
    }
}
