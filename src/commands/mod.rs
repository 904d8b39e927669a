pub mod config;
pub mod delete;
pub mod events;
pub mod invite;
pub mod new;
pub mod respond;
pub mod update;

use anyhow::{Result, bail};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

const LOCAL_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parse a date/time argument.
/// RFC 3339 input keeps its offset; anything else is read as local time.
pub fn parse_datetime(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return match Local.from_local_datetime(&naive).earliest() {
                Some(local) => Ok(local.with_timezone(&Utc)),
                None => bail!("'{}' does not exist in the local timezone", input),
            };
        }
    }

    bail!(
        "Invalid date/time '{}'. Expected e.g. 2025-03-20T15:00 or 2025-03-20T15:00:00Z",
        input
    )
}
