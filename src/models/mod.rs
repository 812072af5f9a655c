mod deposit;
mod errors;
mod position;
#[cfg(test)]
mod tests;
mod withdrawal;

use std::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub use deposit::Deposit;
pub use errors::TransitionError;
pub use position::{Metal, Position};
pub use withdrawal::Withdrawal;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    Pending,
    Approved,
    Rejected
}

impl DepositStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepositStatus::Pending => "pending",
            DepositStatus::Approved => "approved",
            DepositStatus::Rejected => "rejected"
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Completed,
    Rejected
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Completed => "completed",
            WithdrawalStatus::Rejected => "rejected"
        }
    }
}

impl Display for DepositStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl Display for WithdrawalStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
