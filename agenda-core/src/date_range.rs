//! Date range for filtering events.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::error::{AgendaError, AgendaResult};

/// Days shown after today when no end date is given.
pub const DEFAULT_VIEW_DAYS: i64 = 7;

const LAST_SECOND: NaiveTime = NaiveTime::from_hms_opt(23, 59, 59).unwrap();

/// Closed UTC interval `[start, end]` used for store reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    /// A zero-length range is allowed: it selects events covering that instant.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> AgendaResult<Self> {
        if start > end {
            return Err(AgendaError::InvalidRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    /// Parse CLI-style bounds.
    /// - `from`: YYYY-MM-DD, defaults to the start of today
    /// - `to`: YYYY-MM-DD, defaults to DEFAULT_VIEW_DAYS after `from`
    pub fn from_args(from: Option<&str>, to: Option<&str>) -> AgendaResult<Self> {
        let start = match from {
            Some(s) => parse_date_start(s)?,
            None => start_of_day(Utc::now().date_naive()),
        };

        let end = match to {
            Some(s) => parse_date_end(s)?,
            None => start
                .checked_add_signed(Duration::days(DEFAULT_VIEW_DAYS))
                .ok_or_else(|| AgendaError::InvalidInput("Start date is out of range".into()))?,
        };

        DateRange::new(start, end)
    }

    /// Closed-interval intersection with `[start, end]`.
    pub fn intersects(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start <= self.end && end >= self.start
    }

    pub fn start_rfc3339(&self) -> String {
        self.start.to_rfc3339()
    }

    pub fn end_rfc3339(&self) -> String {
        self.end.to_rfc3339()
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Parse YYYY-MM-DD as start of day in UTC
fn parse_date_start(s: &str) -> AgendaResult<DateTime<Utc>> {
    Ok(start_of_day(parse_date(s)?))
}

/// Parse YYYY-MM-DD as the last second of that day in UTC
fn parse_date_end(s: &str) -> AgendaResult<DateTime<Utc>> {
    Ok(parse_date(s)?.and_time(LAST_SECOND).and_utc())
}

fn parse_date(s: &str) -> AgendaResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        AgendaError::InvalidInput(format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
    })
}
