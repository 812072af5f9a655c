use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use tokio::task::spawn_blocking;
use tracing::{error, info, warn};

use crate::models::{Deposit, Position, Withdrawal};
use crate::storage::{LoadError, RecordStorage};

/// Number of distinct records stored from each input.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct LoadStats {
    pub deposits: usize,
    pub withdrawals: usize,
    pub positions: usize
}

/// Reads every well-formed row of a CSV file.
///
/// Rows that fail to deserialize are logged and skipped. Only failing to open
/// the file or to read its header row is an error.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source
    })?;

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(BufReader::new(file));

    reader.headers().map_err(|source| LoadError::Headers {
        path: path.to_path_buf(),
        source
    })?;

    let mut records = Vec::new();

    for result in reader.deserialize::<T>() {
        match result {
            Ok(record) => records.push(record),
            Err(error) => {
                error!("CSV deserialization error in [{}]: {error}", path.display());
            }
        }
    }

    Ok(records)
}

/// Populates a [`RecordStorage`] from CSV exports of the record tables.
pub struct CsvLoader {
    storage: Arc<RecordStorage>
}

impl CsvLoader {
    pub fn new(storage: Arc<RecordStorage>) -> Self {
        Self { storage }
    }

    /// Loads deposits, withdrawals and optionally positions. The files are
    /// parsed concurrently on the blocking pool.
    pub async fn load(&self, deposits: PathBuf, withdrawals: PathBuf, positions: Option<PathBuf>) -> Result<LoadStats, LoadError> {
        let deposits_handle = spawn_blocking(move || read_records::<Deposit>(&deposits));
        let withdrawals_handle = spawn_blocking(move || read_records::<Withdrawal>(&withdrawals));
        let positions_handle = spawn_blocking(move || match positions {
            Some(path) => read_records::<Position>(&path),
            None => Ok(Vec::new())
        });

        let deposits = deposits_handle.await??;
        let withdrawals = withdrawals_handle.await??;
        let positions = positions_handle.await??;

        let mut stats = LoadStats::default();

        for deposit in deposits {
            let id = deposit.id;
            match self.storage.save_deposit(deposit) {
                Some(_) => warn!("Deposit [{id}] appears more than once, keeping the last row"),
                None => stats.deposits += 1
            }
        }

        for withdrawal in withdrawals {
            let id = withdrawal.id;
            match self.storage.save_withdrawal(withdrawal) {
                Some(_) => warn!("Withdrawal [{id}] appears more than once, keeping the last row"),
                None => stats.withdrawals += 1
            }
        }

        for position in positions {
            let id = position.id;
            match self.storage.save_position(position) {
                Some(_) => warn!("Position [{id}] appears more than once, keeping the last row"),
                None => stats.positions += 1
            }
        }

        info!(
            "Loaded {} deposits, {} withdrawals and {} positions",
            stats.deposits, stats.withdrawals, stats.positions
        );

        Ok(stats)
    }
}
