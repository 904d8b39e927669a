use agenda_core::date_range::DateRange;
use agenda_core::manager::EventManager;
use agenda_core::remote::EventStore;
use anyhow::Result;

use crate::render;
use crate::utils::tui::create_spinner;

pub async fn run<S: EventStore>(
    manager: &EventManager<S>,
    user_id: &str,
    range: &DateRange,
) -> Result<()> {
    let spinner = create_spinner("Loading events...");
    let result = manager.fetch(user_id, range).await;
    spinner.finish_and_clear();

    render::print_events(&result?, user_id);
    Ok(())
}
