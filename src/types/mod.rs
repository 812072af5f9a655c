mod date_range;
mod errors;
mod monetary;
#[cfg(test)]
mod tests;

pub use date_range::{deserialize_timestamp, DateRange};
#[cfg(test)]
pub use date_range::parse_timestamp;
pub use monetary::Monetary;

pub type UserId = u32;
pub type RecordId = u64;

/// Metal quantities are weighed in grams and carry arbitrary precision.
pub type Grams = rust_decimal::Decimal;
