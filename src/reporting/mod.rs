mod aggregator;
mod summary;

pub use aggregator::aggregate;
pub use summary::{DateBucket, ReportSummary, StatusBucket};
