//! Time formatting for reports and window plans

use chrono::{TimeZone, Utc};

/// Seconds in a day (24 × 60 × 60 = 86400)
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Format a unix timestamp as `YYYY-MM-DD HH:MM:SS` (UTC)
///
/// Returns the epoch for timestamps chrono cannot represent.
///
/// # Examples
/// ```
/// use coinshuffle_scan::utils::time::format_timestamp;
/// assert_eq!(format_timestamp(1396317600), "2014-04-01 02:00:00");
/// ```
pub fn format_timestamp(timestamp: i64) -> String {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "1970-01-01 00:00:00".to_string())
}

/// Format a unix timestamp with the raw value appended: `YYYY-MM-DD HH:MM:SS (TS: n)`
pub fn format_timestamp_with_ts(timestamp: i64) -> String {
    format!("{} (TS: {})", format_timestamp(timestamp), timestamp)
}

/// Current unix time in seconds
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}
