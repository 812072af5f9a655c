use super::{read_records, CsvLoader, LoadError, RecordSource, RecordStorage};
use crate::models::{Deposit, DepositStatus, Withdrawal};
use crate::types::{parse_timestamp, Monetary, RecordId};
use anyhow::{anyhow, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn create_deposit(id: u64, created_at: &str) -> Result<Deposit> {
    Ok(Deposit {
        id,
        user_id: 1,
        amount: Some(Monetary::from_str("100.0")?),
        status: DepositStatus::Pending,
        created_at: parse_timestamp(created_at)?
    })
}

fn find_deposit(storage: &RecordStorage, id: RecordId) -> Option<Deposit> {
    storage.deposits().into_iter().find(|deposit| deposit.id == id)
}

fn create_temporary_csv(contents: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    write!(file, "{contents}")?;
    Ok(file)
}

#[test]
fn test_storage_basic_save_and_lookup() -> Result<()> {
    let storage = RecordStorage::new();

    assert!(storage.deposits().is_empty());
    assert!(storage.save_deposit(create_deposit(1, "2024-01-01")?).is_none());

    let retrieved = find_deposit(&storage, 1).ok_or_else(|| anyhow!("Deposit not found in storage"))?;

    assert_eq!(retrieved.id, 1);
    assert_eq!(retrieved.amount_or_zero().to_string(), "100.0000");
    assert!(find_deposit(&storage, 1).is_some(), "snapshots must not remove records");

    let replaced = storage.save_deposit(create_deposit(1, "2024-01-05")?);
    assert_eq!(replaced.map(|deposit| deposit.created_at), Some(parse_timestamp("2024-01-01")?));
    assert_eq!(storage.deposits().len(), 1);

    Ok(())
}

#[test]
fn test_storage_snapshots_are_ordered_by_creation_then_id() -> Result<()> {
    let storage = RecordStorage::new();
    storage.save_deposit(create_deposit(3, "2024-01-02")?);
    storage.save_deposit(create_deposit(2, "2024-01-01")?);
    storage.save_deposit(create_deposit(1, "2024-01-02")?);

    let ids: Vec<u64> = storage.deposits().iter().map(|deposit| deposit.id).collect();

    assert_eq!(ids, vec![2, 1, 3]);

    Ok(())
}

#[test]
fn test_storage_update_mutates_in_place() -> Result<()> {
    let storage = RecordStorage::new();
    storage.save_deposit(create_deposit(1, "2024-01-01")?);

    let outcome = storage.update_deposit(1, |deposit| deposit.approve())
        .ok_or_else(|| anyhow!("Deposit missing"))?;

    assert!(outcome.is_ok());
    assert_eq!(find_deposit(&storage, 1).map(|deposit| deposit.status), Some(DepositStatus::Approved));
    assert!(storage.update_deposit(42, |deposit| deposit.approve()).is_none());

    Ok(())
}

#[test]
fn test_read_records_skips_malformed_rows() -> Result<()> {
    let file = create_temporary_csv(
        "id,user_id,amount,status,created_at\n\
         1,1,10.0,approved,2024-01-01\n\
         two,1,10.0,approved,2024-01-01\n\
         3,1,10.0,unknown,2024-01-01\n\
         4,1,10.0,pending,not-a-date\n\
         5,1,5.0,pending,2024-01-02\n"
    )?;

    let deposits = read_records::<Deposit>(file.path())?;
    let ids: Vec<u64> = deposits.iter().map(|deposit| deposit.id).collect();

    assert_eq!(ids, vec![1, 5]);

    Ok(())
}

#[test]
fn test_read_records_reports_missing_file() {
    let result = read_records::<Deposit>(Path::new("does-not-exist.csv"));

    assert!(matches!(result, Err(LoadError::Open { .. })));
}

#[tokio::test]
async fn test_loader_populates_storage_from_all_files() -> Result<()> {
    let deposits = create_temporary_csv(
        "id,user_id,amount,status,created_at\n\
         1,1,1000,approved,2024-01-01\n\
         2,2,2000,pending,2024-01-02\n"
    )?;
    let withdrawals = create_temporary_csv(
        "id,user_id,amount,net_amount,status,created_at\n\
         1,1,300,270,completed,2024-02-05\n"
    )?;
    let positions = create_temporary_csv(
        "id,user_id,metal,grams,buy_price,opened_at\n\
         1,1,gold,2.5,60.00,2024-01-03\n\
         2,1,silver,100,0.80,2024-01-04\n"
    )?;

    let storage = Arc::new(RecordStorage::new());
    let loader = CsvLoader::new(storage.clone());

    let stats = loader.load(
        deposits.path().to_path_buf(),
        withdrawals.path().to_path_buf(),
        Some(positions.path().to_path_buf())
    ).await?;

    assert_eq!((stats.deposits, stats.withdrawals, stats.positions), (2, 1, 2));
    assert_eq!(storage.deposits().len(), 2);

    let withdrawal: Withdrawal = storage.withdrawals().into_iter().next().ok_or_else(|| anyhow!("Withdrawal missing"))?;
    assert_eq!(withdrawal.effective_amount().to_string(), "270.0000");
    assert_eq!(storage.positions(1).len(), 2);
    assert!(storage.positions(2).is_empty());

    Ok(())
}

#[tokio::test]
async fn test_loader_fails_when_an_input_is_missing() -> Result<()> {
    let deposits = create_temporary_csv("id,user_id,amount,status,created_at\n")?;
    let storage = Arc::new(RecordStorage::new());
    let loader = CsvLoader::new(storage.clone());

    let result = loader.load(deposits.path().to_path_buf(), PathBuf::from("missing.csv"), None).await;

    assert!(matches!(result, Err(LoadError::Open { .. })));

    Ok(())
}

#[tokio::test]
async fn test_loader_counts_a_repeated_id_once() -> Result<()> {
    // Scenario: The deposits file lists id 1 twice.
    // Confirms: The later row wins and the stats count stored records, not rows.

    let deposits = create_temporary_csv(
        "id,user_id,amount,status,created_at\n\
         1,1,1000,pending,2024-01-01\n\
         2,1,500,approved,2024-01-01\n\
         1,1,1000,approved,2024-01-01\n"
    )?;
    let withdrawals = create_temporary_csv("id,user_id,amount,net_amount,status,created_at\n")?;

    let storage = Arc::new(RecordStorage::new());
    let stats = CsvLoader::new(storage.clone())
        .load(deposits.path().to_path_buf(), withdrawals.path().to_path_buf(), None)
        .await?;

    assert_eq!(stats.deposits, 2);
    assert_eq!(storage.deposits().len(), 2);
    assert_eq!(find_deposit(&storage, 1).map(|deposit| deposit.status), Some(DepositStatus::Approved));

    Ok(())
}
