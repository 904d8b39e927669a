use agenda_core::config::AgendaConfig;
use anyhow::Result;
use owo_colors::OwoColorize;

pub fn run() -> Result<()> {
    let path = AgendaConfig::config_path()?;

    println!("{}", path.display());
    if !path.exists() {
        println!("{}", "  (not created yet, any other command will create it)".dimmed());
    }
    Ok(())
}
