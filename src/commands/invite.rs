use agenda_core::manager::EventManager;
use agenda_core::remote::EventStore;
use anyhow::Result;
use owo_colors::OwoColorize;

use crate::utils::tui::create_spinner;

pub async fn run<S: EventStore>(
    manager: &EventManager<S>,
    event_id: &str,
    invitee_id: &str,
) -> Result<()> {
    let spinner = create_spinner("Sending invitation...");
    let result = manager.invite(event_id, invitee_id).await;
    spinner.finish_and_clear();
    let invitation = result?;

    println!("{}", format!("  Invited {}", invitation.invitee_id).green());
    println!("  {}", invitation.id.dimmed());
    Ok(())
}
