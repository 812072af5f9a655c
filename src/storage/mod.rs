mod csv_loader;
mod errors;
mod record_storage;
#[cfg(test)]
mod tests;

use crate::models::{Deposit, Position, Withdrawal};
use crate::types::UserId;

pub use csv_loader::{read_records, CsvLoader};
pub use errors::LoadError;
pub use record_storage::RecordStorage;

/// Supplies already-validated records to reports.
///
/// Snapshots are ordered by creation time, then id, so repeated reads of
/// unchanged data always produce the same sequence.
pub trait RecordSource: Send + Sync + 'static {
    fn deposits(&self) -> Vec<Deposit>;
    fn withdrawals(&self) -> Vec<Withdrawal>;
    fn positions(&self, user_id: UserId) -> Vec<Position>;
}
