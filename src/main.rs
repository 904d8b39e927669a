mod commands;
mod logging;
mod render;
mod utils;

use agenda_core::AgendaError;
use agenda_core::config::AgendaConfig;
use agenda_core::date_range::DateRange;
use agenda_core::manager::EventManager;
use agenda_core::remote::{RestStore, StoreClient};
use anyhow::Result;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;

#[derive(Parser)]
#[command(name = "agenda")]
#[command(about = "Manage your calendar events and the events you're invited to")]
struct Cli {
    /// Print debug logs to stderr (or set AGENDA_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List your events and the events you're invited to
    Events {
        /// Show events from this date (YYYY-MM-DD, default today)
        #[arg(long)]
        from: Option<String>,

        /// Show events until this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Create an event
    New {
        title: String,

        /// Start date/time (e.g., "2025-03-20T15:00")
        #[arg(short, long)]
        start: String,

        /// End date/time
        #[arg(short, long, conflicts_with = "duration")]
        end: Option<String>,

        /// Length instead of an end time (e.g., "30m", "1h 30m"; default 1h)
        #[arg(short, long)]
        duration: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },
    /// Change an event you own
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        start: Option<String>,

        #[arg(short, long)]
        end: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an event you own
    Delete { id: String },
    /// Invite another user to an event
    Invite { event_id: String, invitee_id: String },
    /// Accept or decline an invitation
    Respond {
        invitation_id: String,

        /// accepted, declined or pending
        status: String,
    },
    /// Print the config file location
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(err) = run(cli.command).await {
        let message = match err.downcast_ref::<AgendaError>() {
            Some(agenda_err) => render::error_message(agenda_err),
            None => format!("{:#}", err),
        };
        eprintln!("{}", message.red());
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Config => commands::config::run(),
        Commands::Events { from, to } => {
            let range = DateRange::from_args(from.as_deref(), to.as_deref())?;
            let session = Session::load()?;
            commands::events::run(&session.manager, &session.user_id, &range).await
        }
        Commands::New {
            title,
            start,
            end,
            duration,
            description,
        } => {
            let args = commands::new::NewArgs {
                title,
                start,
                end,
                duration,
                description,
            };
            let session = Session::load()?;
            commands::new::run(&session.manager, &session.user_id, args).await
        }
        Commands::Update {
            id,
            title,
            start,
            end,
            description,
        } => {
            let args = commands::update::UpdateArgs {
                title,
                start,
                end,
                description,
            };
            let session = Session::load()?;
            commands::update::run(&session.manager, &session.user_id, &id, args).await
        }
        Commands::Delete { id } => {
            let session = Session::load()?;
            commands::delete::run(&session.manager, &id).await
        }
        Commands::Invite {
            event_id,
            invitee_id,
        } => {
            let session = Session::load()?;
            commands::invite::run(&session.manager, &event_id, &invitee_id).await
        }
        Commands::Respond {
            invitation_id,
            status,
        } => {
            let session = Session::load()?;
            commands::respond::run(&session.manager, &invitation_id, &status).await
        }
    }
}

/// The configured user and a manager talking to the hosted store.
struct Session {
    user_id: String,
    manager: EventManager<RestStore>,
}

impl Session {
    fn load() -> Result<Self> {
        let config = AgendaConfig::load()?;
        let user_id = config.require_user_id()?.to_string();
        let store = config.rest_store()?;
        tracing::debug!(
            user_id = %user_id,
            max_attempts = config.retry.attempts(),
            base_delay_ms = config.retry.base_delay_ms,
            "session ready"
        );

        Ok(Session {
            user_id,
            manager: EventManager::new(StoreClient::with_policy(store, config.retry)),
        })
    }
}
