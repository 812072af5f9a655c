use std::num::ParseIntError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonetaryError {
    #[error("Monetary error: {0}")]
    InvalidFormat(String),
    #[error("Monetary error: {0}")]
    ParseInt(#[from] ParseIntError),
    #[error("Monetary error: Overflow")]
    Overflow
}

#[derive(Debug, Error)]
pub enum DateError {
    #[error("Date error: '{0}' is neither an RFC 3339 timestamp nor a YYYY-MM-DD date")]
    InvalidFormat(String),
    #[error("Date error: both ends of a range are required, got start [{start:?}] and end [{end:?}]")]
    IncompleteRange {
        start: Option<String>,
        end: Option<String>
    }
}
