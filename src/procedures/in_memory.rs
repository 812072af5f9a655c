use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::models::{Deposit, Position, TransitionError, Withdrawal};
use crate::procedures::{
    DepositDecision, FinancialProcedures, Holding, Portfolio, PortfolioRequest, ProcedureError, SellAssetRequest,
    WithdrawalDecision, WithdrawalSettlement, PORTFOLIO
};
use crate::storage::{RecordSource, RecordStorage};
use crate::types::{Grams, RecordId};

/// Procedures backed by the in-memory record store.
///
/// Status transitions are applied here. Selling only closes the position at
/// the requested price; the payout belongs to the pricing backend.
pub struct InMemoryProcedures {
    storage: Arc<RecordStorage>
}

impl InMemoryProcedures {
    pub fn new(storage: Arc<RecordStorage>) -> Self {
        Self { storage }
    }

    fn update_deposit(&self, id: RecordId, update: impl FnOnce(&mut Deposit) -> Result<(), TransitionError>) -> Result<Deposit, ProcedureError> {
        self.storage.update_deposit(id, |deposit| update(deposit).map(|_| deposit.clone()))
            .ok_or_else(|| ProcedureError::deposit_not_found(id))?
            .map_err(ProcedureError::from)
    }

    fn update_withdrawal(&self, id: RecordId, update: impl FnOnce(&mut Withdrawal) -> Result<(), TransitionError>) -> Result<Withdrawal, ProcedureError> {
        self.storage.update_withdrawal(id, |withdrawal| update(withdrawal).map(|_| withdrawal.clone()))
            .ok_or_else(|| ProcedureError::withdrawal_not_found(id))?
            .map_err(ProcedureError::from)
    }
}

impl FinancialProcedures for InMemoryProcedures {
    async fn approve_deposit(&self, request: DepositDecision) -> Result<Deposit, ProcedureError> {
        let deposit = self.update_deposit(request.deposit_id, Deposit::approve)?;
        info!("Deposit [{}] for user [{}] approved", deposit.id, deposit.user_id);
        Ok(deposit)
    }

    async fn reject_deposit(&self, request: DepositDecision) -> Result<Deposit, ProcedureError> {
        let deposit = self.update_deposit(request.deposit_id, Deposit::reject)?;
        info!("Deposit [{}] for user [{}] rejected", deposit.id, deposit.user_id);
        Ok(deposit)
    }

    async fn complete_withdrawal(&self, request: WithdrawalSettlement) -> Result<Withdrawal, ProcedureError> {
        let withdrawal = self.update_withdrawal(request.withdrawal_id, |withdrawal| {
            withdrawal.complete(request.net_amount)
        })?;
        info!(
            "Withdrawal [{}] for user [{}] completed, paying out [{}]",
            withdrawal.id,
            withdrawal.user_id,
            withdrawal.effective_amount()
        );
        Ok(withdrawal)
    }

    async fn reject_withdrawal(&self, request: WithdrawalDecision) -> Result<Withdrawal, ProcedureError> {
        let withdrawal = self.update_withdrawal(request.withdrawal_id, Withdrawal::reject)?;
        info!("Withdrawal [{}] for user [{}] rejected", withdrawal.id, withdrawal.user_id);
        Ok(withdrawal)
    }

    async fn sell_asset(&self, request: SellAssetRequest) -> Result<Position, ProcedureError> {
        let position = self.storage.update_position(request.position_id, |position| -> Result<Position, ProcedureError> {
            if position.user_id != request.user_id {
                return Err(ProcedureError::NotOwner {
                    position_id: position.id,
                    user_id: request.user_id
                });
            }

            position.close(request.sell_price)?;

            Ok(position.clone())
        }).ok_or_else(|| ProcedureError::position_not_found(request.position_id))??;

        info!(
            "Position [{}] of user [{}] sold: [{}] grams of {} bought at [{}], sold at [{}]",
            position.id, position.user_id, position.grams, position.metal.as_str(), position.buy_price, request.sell_price
        );

        Ok(position)
    }

    async fn portfolio(&self, request: PortfolioRequest) -> Result<Portfolio, ProcedureError> {
        let mut holdings = BTreeMap::new();

        for position in self.storage.positions(request.user_id).into_iter().filter(|position| !position.closed) {
            let holding = holdings.entry(position.metal).or_insert_with(|| Holding {
                metal: position.metal,
                grams: Grams::ZERO,
                positions: 0
            });

            holding.grams += position.grams;
            holding.positions += 1;
        }

        debug!("Built [{PORTFOLIO}] for user [{}] with {} metals", request.user_id, holdings.len());

        Ok(Portfolio {
            user_id: request.user_id,
            holdings: holdings.into_values().collect()
        })
    }
}
