//! Module containing some utility functions that didn't fit anywhere else.

use time::{format_description, OffsetDateTime};

/// Produces a timestamp `String` of the current time in YYYY-MM-DD_HH-mm-SS format.
pub fn get_timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    match format_description::parse("[year]-[month]-[day]_[hour]-[minute]-[second]")
        .ok()
        .and_then(|format| now.format(&format).ok())
    {
        Some(ts) => ts,
        None => {
            log::warn!("Cannot format the current time, falling back to the unix timestamp");
            now.unix_timestamp().to_string()
        }
    }
}
