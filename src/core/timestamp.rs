use chrono::{DateTime, Utc};

use crate::core::{AppError, Result};

/// Parse an RFC 3339 timestamp as returned by the document store
/// (nanosecond precision, `Z` suffix) into UTC
pub fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid timestamp '{}': {}", value, e)))
}
