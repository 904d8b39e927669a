//! Local checks run before any write reaches the store.
//!
//! Pure and synchronous. Intervals are closed: two events that touch at a
//! single instant (one ends at 10:00, the next starts at 10:00) conflict.

use chrono::{DateTime, Utc};

use crate::error::{AgendaError, AgendaResult};
use crate::event::Event;

/// Reject empty or whitespace-only titles.
pub fn validate_title(title: &str) -> AgendaResult<()> {
    if title.trim().is_empty() {
        return Err(AgendaError::EmptyTitle);
    }
    Ok(())
}

/// Reject ranges where `start >= end`.
pub fn validate_times(start: DateTime<Utc>, end: DateTime<Utc>) -> AgendaResult<()> {
    if start >= end {
        return Err(AgendaError::InvalidRange { start, end });
    }
    Ok(())
}

/// First event in `existing` that intersects `[start, end]`, skipping `exclude_id`.
///
/// The candidate intersects an event when its start or end falls inside the
/// event, or the event's start falls inside the candidate.
pub fn find_overlap<'a>(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    existing: &'a [Event],
    exclude_id: Option<&str>,
) -> Option<&'a Event> {
    existing
        .iter()
        .filter(|event| Some(event.id.as_str()) != exclude_id)
        .find(|event| {
            within(start, event.start_time, event.end_time)
                || within(end, event.start_time, event.end_time)
                || within(event.start_time, start, end)
        })
}

pub fn has_overlap(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    existing: &[Event],
    exclude_id: Option<&str>,
) -> bool {
    find_overlap(start, end, existing, exclude_id).is_some()
}

/// Validate the range, then fail with `Conflict` naming the first overlapping event.
pub fn check_schedule(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    existing: &[Event],
    exclude_id: Option<&str>,
) -> AgendaResult<()> {
    validate_times(start, end)?;
    match find_overlap(start, end, existing, exclude_id) {
        Some(event) => Err(AgendaError::Conflict {
            event_id: event.id.clone(),
        }),
        None => Ok(()),
    }
}

fn within(instant: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    start <= instant && instant <= end
}
