use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::spawn_blocking;
use tracing::{debug, info, warn};

use crate::auth::{authorize, Caller, Query, RowScope};
use crate::cache::{ReportCache, ReportKey};
use crate::engine::{ActionKind, AdminAction, EngineError, ReplayStats};
use crate::procedures::{
    DepositDecision, FinancialProcedures, Portfolio, PortfolioRequest, SellAssetRequest, WithdrawalDecision,
    WithdrawalSettlement, PORTFOLIO
};
use crate::reporting::{aggregate, ReportSummary};
use crate::storage::{read_records, LoadError, RecordSource};
use crate::types::{DateRange, UserId};

/// Serves reports and admin decisions over a record source.
///
/// Every request is authorized before any record is read. Reports are cached
/// per scope and range, and every successful decision drops all cached
/// reports since any of them may include the changed record.
pub struct ReportEngine<S: RecordSource, P: FinancialProcedures> {
    source: Arc<S>,
    procedures: P,
    cache: ReportCache
}

impl<S: RecordSource, P: FinancialProcedures> ReportEngine<S, P> {
    pub fn new(source: Arc<S>, procedures: P) -> Self {
        Self {
            source,
            procedures,
            cache: ReportCache::default()
        }
    }

    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache = ReportCache::new(capacity, self.cache.time_to_live());
        self
    }

    pub fn with_cache_timeout(mut self, timeout: Duration) -> Self {
        self.cache = ReportCache::new(self.cache.capacity(), timeout);
        self
    }

    pub fn cache(&self) -> &ReportCache {
        &self.cache
    }

    /// Platform-wide report. Admin only.
    pub async fn admin_report(&self, caller: &Caller, range: Option<DateRange>) -> Result<Arc<ReportSummary>, EngineError> {
        self.report(caller, Query::AdminReport, range).await
    }

    /// Report over the caller's own records.
    pub async fn own_report(&self, caller: &Caller, range: Option<DateRange>) -> Result<Arc<ReportSummary>, EngineError> {
        self.report(caller, Query::OwnReport, range).await
    }

    /// Applies one admin decision through the procedures port.
    pub async fn apply(&self, caller: &Caller, action: AdminAction) -> Result<(), EngineError> {
        authorize(caller, Query::Procedure(action.kind.procedure()))?;

        match action.kind {
            ActionKind::ApproveDeposit => {
                self.procedures.approve_deposit(DepositDecision { deposit_id: action.id }).await?;
            }
            ActionKind::RejectDeposit => {
                self.procedures.reject_deposit(DepositDecision { deposit_id: action.id }).await?;
            }
            ActionKind::CompleteWithdrawal => {
                self.procedures.complete_withdrawal(WithdrawalSettlement {
                    withdrawal_id: action.id,
                    net_amount: action.net_amount
                }).await?;
            }
            ActionKind::RejectWithdrawal => {
                self.procedures.reject_withdrawal(WithdrawalDecision { withdrawal_id: action.id }).await?;
            }
            ActionKind::SellAsset => {
                let procedure = action.kind.procedure();
                let user_id = action.user_id
                    .ok_or_else(|| EngineError::incomplete_action(procedure, action.id, "user_id"))?;
                let sell_price = action.sell_price
                    .ok_or_else(|| EngineError::incomplete_action(procedure, action.id, "sell_price"))?;

                self.procedures.sell_asset(SellAssetRequest {
                    user_id,
                    position_id: action.id,
                    sell_price
                }).await?;
            }
        }

        self.cache.invalidate_all();

        Ok(())
    }

    /// Open positions of `user_id`, grouped by metal.
    pub async fn portfolio(&self, caller: &Caller, user_id: UserId) -> Result<Portfolio, EngineError> {
        authorize(caller, Query::Procedure(PORTFOLIO))?;

        let portfolio = self.procedures.portfolio(PortfolioRequest { user_id }).await?;

        info!("Portfolio for user [{user_id}] holds {} metals", portfolio.holdings.len());

        Ok(portfolio)
    }

    /// Applies every decision of an actions CSV in file order.
    ///
    /// A decision that fails is logged and skipped; the remaining ones are
    /// still applied. Only an unreadable file or a caller who may not run
    /// procedures at all aborts the replay.
    pub async fn replay_actions(&self, caller: &Caller, path: PathBuf) -> Result<ReplayStats, EngineError> {
        let actions = spawn_blocking(move || read_records::<AdminAction>(&path))
            .await
            .map_err(LoadError::from)??;

        let mut stats = ReplayStats::default();

        for action in actions {
            match self.apply(caller, action).await {
                Ok(()) => {
                    debug!("Action [{:?}] on record [{}] applied", action.kind, action.id);
                    stats.applied += 1;
                }
                Err(EngineError::Access(error)) => return Err(error.into()),
                Err(error) => {
                    warn!("{error}");
                    stats.failed += 1;
                }
            }
        }

        info!("Replayed actions: {} applied, {} failed", stats.applied, stats.failed);

        Ok(stats)
    }

    async fn report(&self, caller: &Caller, query: Query, range: Option<DateRange>) -> Result<Arc<ReportSummary>, EngineError> {
        let scope = authorize(caller, query)?;
        let key = ReportKey { scope, range };

        let report = self.cache.get_or_compute(key, || self.compute(scope, range.as_ref())).await;

        info!(
            "Report for user [{}] ready: deposits [{}], withdrawals [{}], net [{}]",
            caller.user_id, report.total_deposits, report.total_withdrawals, report.net_profit
        );

        Ok(report)
    }

    fn compute(&self, scope: RowScope, range: Option<&DateRange>) -> ReportSummary {
        let deposits: Vec<_> = self.source.deposits().into_iter()
            .filter(|deposit| scope.admits_deposit(deposit))
            .collect();

        let withdrawals: Vec<_> = self.source.withdrawals().into_iter()
            .filter(|withdrawal| scope.admits_withdrawal(withdrawal))
            .collect();

        aggregate(&deposits, &withdrawals, range)
    }
}
