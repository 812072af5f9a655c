mod errors;
mod in_memory;

use std::future::Future;

use serde::Serialize;

use crate::models::{Deposit, Metal, Position, Withdrawal};
use crate::types::{Grams, Monetary, RecordId, UserId};

pub use errors::ProcedureError;
pub use in_memory::InMemoryProcedures;

pub const APPROVE_DEPOSIT: &str = "approve_deposit";
pub const REJECT_DEPOSIT: &str = "reject_deposit";
pub const COMPLETE_WITHDRAWAL: &str = "complete_withdrawal";
pub const REJECT_WITHDRAWAL: &str = "reject_withdrawal";
pub const SELL_ASSET: &str = "sell_asset";
pub const PORTFOLIO: &str = "portfolio";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DepositDecision {
    pub deposit_id: RecordId
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct WithdrawalDecision {
    pub withdrawal_id: RecordId
}

/// Settles a withdrawal. `net_amount` is the payout after fees as decided by
/// the fee policy; `None` means the gross amount is paid out.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct WithdrawalSettlement {
    pub withdrawal_id: RecordId,
    pub net_amount: Option<Monetary>
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SellAssetRequest {
    pub user_id: UserId,
    pub position_id: RecordId,
    /// Price per gram offered for the position.
    pub sell_price: Monetary
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PortfolioRequest {
    pub user_id: UserId
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Holding {
    pub metal: Metal,
    #[serde(with = "rust_decimal::serde::str")]
    pub grams: Grams,
    pub positions: usize
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub user_id: UserId,
    pub holdings: Vec<Holding>
}

/// Multi-step financial operations owned by the backend.
///
/// Callers only rely on the request and response shapes. Fee schedules and
/// sale proceeds live behind this boundary and are never computed client side:
/// the net amount of a withdrawal and the sell price of a position are inputs.
pub trait FinancialProcedures: Send + Sync + 'static {
    fn approve_deposit(&self, request: DepositDecision) -> impl Future<Output = Result<Deposit, ProcedureError>> + Send;
    fn reject_deposit(&self, request: DepositDecision) -> impl Future<Output = Result<Deposit, ProcedureError>> + Send;
    fn complete_withdrawal(&self, request: WithdrawalSettlement) -> impl Future<Output = Result<Withdrawal, ProcedureError>> + Send;
    fn reject_withdrawal(&self, request: WithdrawalDecision) -> impl Future<Output = Result<Withdrawal, ProcedureError>> + Send;
    fn sell_asset(&self, request: SellAssetRequest) -> impl Future<Output = Result<Position, ProcedureError>> + Send;
    fn portfolio(&self, request: PortfolioRequest) -> impl Future<Output = Result<Portfolio, ProcedureError>> + Send;
}
