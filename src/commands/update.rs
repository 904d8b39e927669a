use agenda_core::manager::EventManager;
use agenda_core::remote::EventStore;
use agenda_core::EventPatch;
use anyhow::{Result, bail};
use owo_colors::OwoColorize;

use super::parse_datetime;
use crate::render;
use crate::utils::tui::create_spinner;

pub struct UpdateArgs {
    pub title: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub description: Option<String>,
}

pub async fn run<S: EventStore>(
    manager: &EventManager<S>,
    user_id: &str,
    event_id: &str,
    args: UpdateArgs,
) -> Result<()> {
    let patch = build_patch(args)?;

    let spinner = create_spinner("Updating event...");
    let result = manager.update(user_id, event_id, &patch).await;
    spinner.finish_and_clear();
    let event = result?;

    println!("{}", format!("  Updated: {}", event.title).green());
    println!("  {} {}", render::format_span(&event), event.id.dimmed());

    Ok(())
}

fn build_patch(args: UpdateArgs) -> Result<EventPatch> {
    let patch = EventPatch {
        title: args.title,
        description: args.description,
        start_time: args.start.as_deref().map(parse_datetime).transpose()?,
        end_time: args.end.as_deref().map(parse_datetime).transpose()?,
    };

    if patch.is_empty() {
        bail!("Nothing to update. Pass --title, --start, --end or --description");
    }
    Ok(patch)
}
