use agenda_core::manager::EventManager;
use agenda_core::remote::EventStore;
use agenda_core::InvitationStatus;
use anyhow::{Result, anyhow};
use owo_colors::OwoColorize;

use crate::utils::tui::create_spinner;

pub async fn run<S: EventStore>(
    manager: &EventManager<S>,
    invitation_id: &str,
    status: &str,
) -> Result<()> {
    let status: InvitationStatus = status.parse().map_err(|e: String| anyhow!(e))?;

    let spinner = create_spinner("Saving response...");
    let result = manager.respond(invitation_id, status).await;
    spinner.finish_and_clear();
    let invitation = result?;

    println!("{}", format!("  Invitation {}", invitation.status).green());
    Ok(())
}
