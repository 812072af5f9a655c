use serde::Deserialize;

use crate::procedures::{APPROVE_DEPOSIT, COMPLETE_WITHDRAWAL, REJECT_DEPOSIT, REJECT_WITHDRAWAL, SELL_ASSET};
use crate::types::{Monetary, RecordId, UserId};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    ApproveDeposit,
    RejectDeposit,
    CompleteWithdrawal,
    RejectWithdrawal,
    SellAsset
}

impl ActionKind {
    pub fn procedure(&self) -> &'static str {
        match self {
            ActionKind::ApproveDeposit => APPROVE_DEPOSIT,
            ActionKind::RejectDeposit => REJECT_DEPOSIT,
            ActionKind::CompleteWithdrawal => COMPLETE_WITHDRAWAL,
            ActionKind::RejectWithdrawal => REJECT_WITHDRAWAL,
            ActionKind::SellAsset => SELL_ASSET
        }
    }
}

/// One admin decision, as a row of an actions CSV
/// (`action,id,net_amount,user_id,sell_price`).
///
/// `id` names the deposit, withdrawal or position the action targets.
/// `net_amount` is only read for `complete_withdrawal`; `user_id` and
/// `sell_price` only for `sell_asset`, which needs both. Trailing columns
/// may be left out of the file entirely.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
pub struct AdminAction {
    #[serde(rename = "action")]
    pub kind: ActionKind,
    pub id: RecordId,
    #[serde(default)]
    pub net_amount: Option<Monetary>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub sell_price: Option<Monetary>
}

/// Outcome counts of replaying an actions file.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct ReplayStats {
    pub applied: usize,
    pub failed: usize
}
