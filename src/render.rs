//! Terminal output for events and errors.

use agenda_core::{AgendaError, Event};
use chrono::{Local, NaiveDate};
use owo_colors::OwoColorize;

/// Print events grouped by local day, in start order.
/// Events owned by someone else are tagged with their owner.
pub fn print_events(events: &[Event], user_id: &str) {
    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return;
    }

    let today = Local::now().date_naive();
    let mut current_date: Option<NaiveDate> = None;

    for event in agenda_core::aggregate::sort_by_start(events) {
        let date = event.start_time.with_timezone(&Local).date_naive();

        if current_date != Some(date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", format_date_label(date, today).bold());
            current_date = Some(date);
        }

        let owner_tag = if event.user_id == user_id {
            String::new()
        } else {
            format!(" [from {}]", event.user_id)
        };

        println!(
            "  {} {}{} {}",
            format_span(&event),
            event.title,
            owner_tag.cyan(),
            event.id.dimmed()
        );
    }
}

/// "Today", "Tomorrow", "Yesterday", or e.g. "Wed Feb 25".
pub fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        -1 => "Yesterday".to_string(),
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

/// Local "HH:MM-HH:MM". Events ending on a later day show the end date too.
pub fn format_span(event: &Event) -> String {
    let start = event.start_time.with_timezone(&Local);
    let end = event.end_time.with_timezone(&Local);

    if start.date_naive() == end.date_naive() {
        format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"))
    } else {
        format!("{}-{}", start.format("%H:%M"), end.format("%b %-d %H:%M"))
    }
}

/// One user-facing line per error kind.
pub fn error_message(err: &AgendaError) -> String {
    match err {
        AgendaError::EmptyTitle => "Give the event a title".to_string(),
        AgendaError::InvalidRange { .. } => {
            "The start time must be before the end time".to_string()
        }
        AgendaError::Conflict { event_id } => {
            format!("This overlaps another of your events ({event_id})")
        }
        AgendaError::InvalidInput(msg) => msg.clone(),
        AgendaError::NotFound(what) => format!("Not found: {what}"),
        AgendaError::Store(msg) => {
            format!("Could not reach the calendar store, even after retrying: {msg}")
        }
        AgendaError::Config(msg) => format!("Configuration problem: {msg}"),
        AgendaError::Serialization(msg) => {
            format!("Unexpected response from the calendar store: {msg}")
        }
    }
}
