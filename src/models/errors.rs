use crate::models::{Deposit, DepositStatus, Position, Withdrawal, WithdrawalStatus};
use crate::types::{Monetary, RecordId, UserId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Deposit [{record_id}] for user [{user_id}] cannot move from [{from}] to [{to}]")]
    Deposit {
        record_id: RecordId,
        user_id: UserId,
        from: DepositStatus,
        to: DepositStatus
    },
    #[error("Withdrawal [{record_id}] for user [{user_id}] cannot move from [{from}] to [{to}]")]
    Withdrawal {
        record_id: RecordId,
        user_id: UserId,
        from: WithdrawalStatus,
        to: WithdrawalStatus
    },
    #[error("Net amount [{net_amount}] exceeds gross amount [{amount}] for withdrawal [{record_id}] of user [{user_id}]")]
    NetExceedsGross {
        record_id: RecordId,
        user_id: UserId,
        amount: Monetary,
        net_amount: Monetary
    },
    #[error("Net amount [{net_amount}] must not be negative for withdrawal [{record_id}] of user [{user_id}]")]
    NegativeNetAmount {
        record_id: RecordId,
        user_id: UserId,
        net_amount: Monetary
    },
    #[error("Position [{record_id}] of user [{user_id}] is already closed")]
    PositionClosed {
        record_id: RecordId,
        user_id: UserId
    },
    #[error("Sell price [{sell_price}] must be positive for position [{record_id}] of user [{user_id}]")]
    NonPositiveSellPrice {
        record_id: RecordId,
        user_id: UserId,
        sell_price: Monetary
    }
}

impl TransitionError {
    pub fn deposit(deposit: &Deposit, to: DepositStatus) -> Self {
        Self::Deposit {
            record_id: deposit.id,
            user_id: deposit.user_id,
            from: deposit.status,
            to
        }
    }

    pub fn withdrawal(withdrawal: &Withdrawal, to: WithdrawalStatus) -> Self {
        Self::Withdrawal {
            record_id: withdrawal.id,
            user_id: withdrawal.user_id,
            from: withdrawal.status,
            to
        }
    }

    pub fn net_exceeds_gross(withdrawal: &Withdrawal, net_amount: Monetary) -> Self {
        Self::NetExceedsGross {
            record_id: withdrawal.id,
            user_id: withdrawal.user_id,
            amount: withdrawal.amount.unwrap_or_default(),
            net_amount
        }
    }

    pub fn negative_net_amount(withdrawal: &Withdrawal, net_amount: Monetary) -> Self {
        Self::NegativeNetAmount {
            record_id: withdrawal.id,
            user_id: withdrawal.user_id,
            net_amount
        }
    }

    pub fn position_closed(position: &Position) -> Self {
        Self::PositionClosed {
            record_id: position.id,
            user_id: position.user_id
        }
    }

    pub fn non_positive_sell_price(position: &Position, sell_price: Monetary) -> Self {
        Self::NonPositiveSellPrice {
            record_id: position.id,
            user_id: position.user_id,
            sell_price
        }
    }
}
