use agenda_core::manager::EventManager;
use agenda_core::remote::EventStore;
use anyhow::Result;
use owo_colors::OwoColorize;

use crate::utils::tui::create_spinner;

pub async fn run<S: EventStore>(manager: &EventManager<S>, event_id: &str) -> Result<()> {
    let spinner = create_spinner("Deleting event...");
    let result = manager.delete(event_id).await;
    spinner.finish_and_clear();
    result?;

    println!("{}", format!("  Deleted: {}", event_id).green());
    Ok(())
}
