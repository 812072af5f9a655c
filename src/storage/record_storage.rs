use crate::models::{Deposit, Position, Withdrawal};
use crate::storage::RecordSource;
use crate::types::{RecordId, UserId};
use dashmap::DashMap;

/// Concurrent in-memory record store.
pub struct RecordStorage {
    deposits: DashMap<RecordId, Deposit>,
    withdrawals: DashMap<RecordId, Withdrawal>,
    positions: DashMap<RecordId, Position>
}

impl RecordStorage {
    pub fn new() -> Self {
        Self {
            deposits: DashMap::new(),
            withdrawals: DashMap::new(),
            positions: DashMap::new()
        }
    }

    /// Inserts or replaces a deposit, returning the previous version.
    pub fn save_deposit(&self, deposit: Deposit) -> Option<Deposit> {
        self.deposits.insert(deposit.id, deposit)
    }

    pub fn save_withdrawal(&self, withdrawal: Withdrawal) -> Option<Withdrawal> {
        self.withdrawals.insert(withdrawal.id, withdrawal)
    }

    pub fn save_position(&self, position: Position) -> Option<Position> {
        self.positions.insert(position.id, position)
    }

    /// Runs `update` against the stored deposit while holding its shard lock,
    /// so concurrent updates to the same record are serialized.
    pub fn update_deposit<T>(&self, id: RecordId, update: impl FnOnce(&mut Deposit) -> T) -> Option<T> {
        self.deposits.get_mut(&id).map(|mut entry| update(entry.value_mut()))
    }

    pub fn update_withdrawal<T>(&self, id: RecordId, update: impl FnOnce(&mut Withdrawal) -> T) -> Option<T> {
        self.withdrawals.get_mut(&id).map(|mut entry| update(entry.value_mut()))
    }

    pub fn update_position<T>(&self, id: RecordId, update: impl FnOnce(&mut Position) -> T) -> Option<T> {
        self.positions.get_mut(&id).map(|mut entry| update(entry.value_mut()))
    }
}

impl Default for RecordStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordSource for RecordStorage {
    fn deposits(&self) -> Vec<Deposit> {
        let mut deposits: Vec<_> = self.deposits.iter().map(|entry| entry.value().clone()).collect();
        deposits.sort_by_key(|deposit| (deposit.created_at, deposit.id));
        deposits
    }

    fn withdrawals(&self) -> Vec<Withdrawal> {
        let mut withdrawals: Vec<_> = self.withdrawals.iter().map(|entry| entry.value().clone()).collect();
        withdrawals.sort_by_key(|withdrawal| (withdrawal.created_at, withdrawal.id));
        withdrawals
    }

    fn positions(&self, user_id: UserId) -> Vec<Position> {
        let mut positions: Vec<_> = self.positions.iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        positions.sort_by_key(|position| (position.opened_at, position.id));
        positions
    }
}
