use super::errors::DateError;
use super::{parse_timestamp, DateRange, Monetary};
use anyhow::Result;
use std::str::FromStr;

#[test]
fn test_monetary_successfully_parses_valid_strings() -> Result<()> {
    let test_cases = vec![
        ("1.0", "1.0000"),
        ("1.1234", "1.1234"),
        ("0.0001", "0.0001"),
        ("-1.5", "-1.5000"),
        ("  1.0  ", "1.0000"),
        ("-0.01", "-0.0100"),
        ("+1.0", "1.0000"),
        ("100", "100.0000"),
        ("1.", "1.0000"),
        (".5", "0.5000"),
        ("-.25", "-0.2500"),
    ];

    for (input_string, expected_output) in test_cases {
        assert_eq!(Monetary::from_str(input_string)?.to_string(), expected_output);
    }

    Ok(())
}

#[test]
fn test_monetary_fails_to_parse_invalid_strings() {
    assert!(Monetary::from_str("1.12345").is_err());
    assert!(Monetary::from_str("abc").is_err());
    assert!(Monetary::from_str("1.2.3").is_err());
    assert!(Monetary::from_str("1.-5").is_err());
    assert!(Monetary::from_str("").is_err());
    assert!(Monetary::from_str(".").is_err());
    assert!(Monetary::from_str("-.").is_err());
}

#[test]
fn test_monetary_lenient_parsing_treats_garbage_as_absent() -> Result<()> {
    assert_eq!(Monetary::lenient("250.5"), Some(Monetary::from_str("250.5")?));
    assert_eq!(Monetary::lenient(".5"), Some(Monetary::from_str("0.5")?));
    assert_eq!(Monetary::lenient(""), None);
    assert_eq!(Monetary::lenient("   "), None);
    assert_eq!(Monetary::lenient("n/a"), None);

    Ok(())
}

#[test]
fn test_monetary_overflow_leaves_value_unchanged() -> Result<()> {
    let mut monetary_value = Monetary::from_str("922337203685477.0000")?;
    let previous_value = monetary_value.to_string();

    monetary_value += Monetary::from_str("1.0")?;

    assert_eq!(monetary_value.to_string(), previous_value);

    Ok(())
}

#[test]
fn test_monetary_serializes_as_display_string() -> Result<()> {
    let value = Monetary::from_str("-270")?;

    assert_eq!(serde_json::to_string(&value)?, "\"-270.0000\"");

    Ok(())
}

#[test]
fn test_timestamp_accepts_rfc3339_sql_and_bare_dates() -> Result<()> {
    let rfc = parse_timestamp("2024-01-02T10:30:00Z")?;
    let offset = parse_timestamp("2024-01-02T12:30:00+02:00")?;
    let sql = parse_timestamp("2024-01-02 10:30:00")?;
    let bare = parse_timestamp("2024-01-02")?;

    assert_eq!(rfc, offset);
    assert_eq!(rfc, sql);
    assert_eq!(bare.to_rfc3339(), "2024-01-02T00:00:00+00:00");
    assert!(matches!(parse_timestamp("02/01/2024"), Err(DateError::InvalidFormat(_))));

    Ok(())
}

#[test]
fn test_date_only_range_covers_whole_days_inclusively() -> Result<()> {
    let range = DateRange::parse("2024-01-02", "2024-01-02")?;

    assert!(range.contains(&parse_timestamp("2024-01-02")?));
    assert!(range.contains(&parse_timestamp("2024-01-02T23:59:59Z")?));
    assert!(!range.contains(&parse_timestamp("2024-01-01T23:59:59Z")?));
    assert!(!range.contains(&parse_timestamp("2024-01-03")?));

    Ok(())
}

#[test]
fn test_reversed_range_contains_nothing() -> Result<()> {
    let range = DateRange::parse("2024-02-01", "2024-01-01")?;

    assert!(!range.contains(&parse_timestamp("2024-01-15")?));
    assert!(!range.contains(&parse_timestamp("2024-02-01")?));

    Ok(())
}

#[test]
fn test_range_requires_both_bounds() -> Result<()> {
    assert!(DateRange::from_bounds(None, None)?.is_none());
    assert!(DateRange::from_bounds(Some("2024-01-01"), Some("2024-01-31"))?.is_some());
    assert!(matches!(
        DateRange::from_bounds(Some("2024-01-01"), None),
        Err(DateError::IncompleteRange { .. })
    ));

    Ok(())
}
