use super::{Deposit, DepositStatus, Metal, Position, Withdrawal, WithdrawalStatus};

use std::str::FromStr;

use anyhow::Result;
use csv::{ReaderBuilder, Trim};

use crate::models::errors::TransitionError;
use crate::types::{parse_timestamp, Monetary};

fn create_deposit(status: DepositStatus, amount: &str) -> Result<Deposit> {
    Ok(Deposit {
        id: 1,
        user_id: 7,
        amount: Monetary::lenient(amount),
        status,
        created_at: parse_timestamp("2024-01-01")?
    })
}

fn create_withdrawal(status: WithdrawalStatus, amount: &str, net_amount: Option<&str>) -> Result<Withdrawal> {
    Ok(Withdrawal {
        id: 2,
        user_id: 7,
        amount: Monetary::lenient(amount),
        net_amount: net_amount.and_then(Monetary::lenient),
        status,
        created_at: parse_timestamp("2024-01-01")?
    })
}

#[test]
fn test_pending_deposit_can_be_approved_once() -> Result<()> {
    let mut deposit = create_deposit(DepositStatus::Pending, "1000")?;

    deposit.approve()?;

    assert_eq!(deposit.status, DepositStatus::Approved);
    assert!(matches!(deposit.reject(), Err(TransitionError::Deposit { .. })));
    assert_eq!(deposit.status, DepositStatus::Approved);

    Ok(())
}

#[test]
fn test_rejected_deposit_is_never_reopened() -> Result<()> {
    let mut deposit = create_deposit(DepositStatus::Pending, "1000")?;

    deposit.reject()?;

    assert!(deposit.approve().is_err());
    assert_eq!(deposit.status, DepositStatus::Rejected);

    Ok(())
}

#[test]
fn test_missing_deposit_amount_counts_as_zero() -> Result<()> {
    let deposit = create_deposit(DepositStatus::Approved, "")?;

    assert!(deposit.amount.is_none());
    assert!(deposit.amount_or_zero().is_zero());

    Ok(())
}

#[test]
fn test_withdrawal_effective_amount_falls_back_to_gross() -> Result<()> {
    let without_net = create_withdrawal(WithdrawalStatus::Completed, "500", None)?;
    let with_net = create_withdrawal(WithdrawalStatus::Completed, "300", Some("270"))?;
    let nothing = create_withdrawal(WithdrawalStatus::Completed, "", None)?;

    assert_eq!(without_net.effective_amount(), Monetary::from_str("500")?);
    assert_eq!(with_net.effective_amount(), Monetary::from_str("270")?);
    assert!(nothing.effective_amount().is_zero());

    Ok(())
}

#[test]
fn test_completing_withdrawal_records_net_amount() -> Result<()> {
    let mut withdrawal = create_withdrawal(WithdrawalStatus::Pending, "300", None)?;

    withdrawal.complete(Some(Monetary::from_str("270")?))?;

    assert_eq!(withdrawal.status, WithdrawalStatus::Completed);
    assert_eq!(withdrawal.net_amount, Some(Monetary::from_str("270")?));

    Ok(())
}

#[test]
fn test_completing_without_net_amount_keeps_recorded_one() -> Result<()> {
    let mut withdrawal = create_withdrawal(WithdrawalStatus::Pending, "300", Some("285"))?;

    withdrawal.complete(None)?;

    assert_eq!(withdrawal.net_amount, Some(Monetary::from_str("285")?));

    Ok(())
}

#[test]
fn test_net_amount_above_gross_is_rejected() -> Result<()> {
    let mut withdrawal = create_withdrawal(WithdrawalStatus::Pending, "300", None)?;

    let result = withdrawal.complete(Some(Monetary::from_str("300.0001")?));

    assert!(matches!(result, Err(TransitionError::NetExceedsGross { .. })));
    assert_eq!(withdrawal.status, WithdrawalStatus::Pending);
    assert!(withdrawal.net_amount.is_none());

    Ok(())
}

#[test]
fn test_negative_net_amount_is_rejected() -> Result<()> {
    let mut withdrawal = create_withdrawal(WithdrawalStatus::Pending, "300", None)?;

    let result = withdrawal.complete(Some(Monetary::from_str("-1")?));

    assert!(matches!(result, Err(TransitionError::NegativeNetAmount { .. })));

    Ok(())
}

#[test]
fn test_settled_withdrawal_cannot_be_rejected() -> Result<()> {
    let mut withdrawal = create_withdrawal(WithdrawalStatus::Pending, "300", None)?;
    withdrawal.complete(None)?;

    assert!(matches!(withdrawal.reject(), Err(TransitionError::Withdrawal { .. })));
    assert!(withdrawal.complete(None).is_err());

    Ok(())
}

#[test]
fn test_records_deserialize_from_csv_rows() -> Result<()> {
    let data = "id,user_id,amount,net_amount,status,created_at\n\
                1,7,300,270,completed,2024-02-05T09:00:00Z\n\
                2,7,500,,pending,2024-02-06\n\
                3,8,oops,,rejected,2024-02-07 10:00:00\n";

    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(data.as_bytes());
    let withdrawals = reader.deserialize::<Withdrawal>().collect::<Result<Vec<_>, _>>()?;

    assert_eq!(withdrawals.len(), 3);
    assert_eq!(withdrawals[0].net_amount, Some(Monetary::from_str("270")?));
    assert_eq!(withdrawals[1].net_amount, None);
    assert_eq!(withdrawals[1].status, WithdrawalStatus::Pending);
    assert_eq!(withdrawals[2].amount, None);

    Ok(())
}

#[test]
fn test_positions_deserialize_with_fractional_grams() -> Result<()> {
    let data = "id,user_id,metal,grams,buy_price,opened_at,closed\n\
                10,7,gold,12.345,65.10,2024-03-01,false\n";

    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(data.as_bytes());
    let positions = reader.deserialize::<Position>().collect::<Result<Vec<_>, _>>()?;

    assert_eq!(positions[0].metal, Metal::Gold);
    assert_eq!(positions[0].grams.to_string(), "12.345");
    assert_eq!(positions[0].buy_price.to_string(), "65.1000");
    assert!(!positions[0].closed);
    assert_eq!(positions[0].sell_price, None);

    Ok(())
}

#[test]
fn test_position_closes_once_at_a_positive_price() -> Result<()> {
    let data = "id,user_id,metal,grams,buy_price,opened_at\n\
                10,7,silver,100,0.80,2024-03-01\n";

    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(data.as_bytes());
    let mut position = reader.deserialize::<Position>().next().ok_or_else(|| anyhow::anyhow!("No position"))??;

    let zero = position.close(Monetary::default());
    assert!(matches!(zero, Err(TransitionError::NonPositiveSellPrice { .. })));
    assert!(!position.closed);

    position.close(Monetary::from_str("0.95")?)?;
    assert!(position.closed);
    assert_eq!(position.sell_price, Some(Monetary::from_str("0.95")?));

    let again = position.close(Monetary::from_str("1.00")?);
    assert!(matches!(again, Err(TransitionError::PositionClosed { record_id: 10, user_id: 7 })));

    Ok(())
}
