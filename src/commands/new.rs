use agenda_core::manager::EventManager;
use agenda_core::remote::EventStore;
use agenda_core::EventDraft;
use anyhow::{Context, Result};
use chrono::Duration;
use owo_colors::OwoColorize;

use super::parse_datetime;
use crate::render;
use crate::utils::tui::create_spinner;

pub struct NewArgs {
    pub title: String,
    pub start: String,
    pub end: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
}

pub async fn run<S: EventStore>(
    manager: &EventManager<S>,
    user_id: &str,
    args: NewArgs,
) -> Result<()> {
    let draft = build_draft(args)?;

    let spinner = create_spinner("Saving event...");
    let result = manager.create(user_id, &draft).await;
    spinner.finish_and_clear();
    let event = result?;

    println!("{}", format!("  Created: {}", event.title).green());
    println!("  {} {}", render::format_span(&event), event.id.dimmed());

    Ok(())
}

/// End comes from `--end`, else start + `--duration`, else start + 1 hour.
fn build_draft(args: NewArgs) -> Result<EventDraft> {
    let start = parse_datetime(&args.start)?;

    let end = match (args.end, args.duration) {
        (Some(end), _) => parse_datetime(&end)?,
        (None, Some(duration)) => start
            .checked_add_signed(parse_duration(&duration)?)
            .context("Duration is too long")?,
        (None, None) => start + Duration::hours(1),
    };

    let mut draft = EventDraft::new(args.title, start, end);
    if let Some(description) = args.description.filter(|d| !d.is_empty()) {
        draft = draft.with_description(description);
    }
    Ok(draft)
}

fn parse_duration(input: &str) -> Result<Duration> {
    let std_duration = humantime::parse_duration(input.trim())
        .with_context(|| format!("Invalid duration '{}'. Try e.g. 30m or 1h 30m", input))?;
    Duration::from_std(std_duration).context("Duration is too long")
}
