mod report_cache;

pub use report_cache::{CacheEvent, ReportCache, ReportKey};
