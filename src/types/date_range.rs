use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::types::errors::DateError;

/// Inclusive window over record creation timestamps.
///
/// No ordering check is made between `start` and `end`: a reversed window is
/// a valid value that simply contains nothing.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Builds a range from user supplied bounds.
    ///
    /// A date-only `start` is the first instant of that day and a date-only
    /// `end` is the last instant of that day, so `2024-01-02..2024-01-02`
    /// covers the whole of the 2nd.
    pub fn parse(start: &str, end: &str) -> Result<Self, DateError> {
        let start = parse_bound(start, DayEdge::Start)?;
        let end = parse_bound(end, DayEdge::End)?;

        Ok(Self { start, end })
    }

    /// Builds a range only when both bounds are present.
    pub fn from_bounds(start: Option<&str>, end: Option<&str>) -> Result<Option<Self>, DateError> {
        match (start, end) {
            (Some(start), Some(end)) => Self::parse(start, end).map(Some),
            (None, None) => Ok(None),
            (start, end) => Err(DateError::IncompleteRange {
                start: start.map(str::to_string),
                end: end.map(str::to_string)
            })
        }
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        self.start <= *timestamp && *timestamp <= self.end
    }
}

/// Parses a record timestamp: RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]` (UTC) or a
/// bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DateError> {
    parse_bound(value, DayEdge::Start)
}

/// Serde adapter for record timestamps in any of the formats [`parse_timestamp`] accepts.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_timestamp(&value).map_err(de::Error::custom)
}

#[derive(Clone, Copy)]
enum DayEdge {
    Start,
    End
}

fn parse_bound(value: &str, edge: DayEdge) -> Result<DateTime<Utc>, DateError> {
    let value = value.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&timestamp));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let timestamp = match edge {
            DayEdge::Start => date.and_hms_opt(0, 0, 0),
            DayEdge::End => date.and_hms_nano_opt(23, 59, 59, 999_999_999)
        };

        if let Some(timestamp) = timestamp {
            return Ok(Utc.from_utc_datetime(&timestamp));
        }
    }

    Err(DateError::InvalidFormat(value.to_string()))
}

