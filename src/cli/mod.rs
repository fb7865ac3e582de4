use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};

pub mod auth;
pub mod chat;
pub mod sessions;

use crate::core::{ApiError, AppConfig};
use crate::core::logging::init_tracing;
use crate::storage::{KvStore, SessionStore, SqliteStore};

#[derive(Subcommand)]
enum SessionsCommand {
    /// List saved sessions, most recently updated first
    List {},
    /// Print the transcript of a session
    Show { id: String },
    /// Delete a session
    Delete { id: String },
}

#[derive(Subcommand)]
enum Command {
    /// Start a chat session (the default)
    Chat {
        /// Resume a saved session instead of starting a new one
        #[arg(long)]
        session: Option<String>,
    },
    /// Manage saved chat sessions
    Sessions {
        #[command(subcommand)]
        command: SessionsCommand,
    },
    /// Sign in and store the credential locally
    Login {
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored credential and profile
    Logout {},
    /// Show the signed in user
    Whoami {},
    /// Update the signed in user's profile
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

const CONFIG_HINT: &str = "Check the MENTOR_* environment variables, or set MENTOR_DEV=1 \
    without MENTOR_API_KEY to chat with canned replies";

/// Configuration problems get a hint about the environment, anything
/// else passes through unchanged.
fn startup_error(err: ApiError) -> anyhow::Error {
    if err.code.is_config() {
        tracing::error!(code = %err.code, "Invalid configuration: {}", err.message);
        anyhow!("{}\n{}", err, CONFIG_HINT)
    } else {
        tracing::error!(code = %err.code, "Startup failed: {}", err.message);
        err.into()
    }
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    init_tracing();

    let config = AppConfig::from_env().map_err(startup_error)?;
    let kv: Arc<dyn KvStore> = Arc::new(SqliteStore::open(&config.db_path)?);
    let sessions = SessionStore::new(Arc::clone(&kv));

    match args.command {
        Some(Command::Chat { session }) => {
            chat::run(&config, &sessions, session).await?;
        }
        None => {
            chat::run(&config, &sessions, None).await?;
        }
        Some(Command::Sessions { command }) => match command {
            SessionsCommand::List {} => sessions::list(&sessions)?,
            SessionsCommand::Show { id } => sessions::show(&sessions, &id)?,
            SessionsCommand::Delete { id } => sessions::delete(&sessions, &id)?,
        },
        Some(Command::Login { email, password }) => {
            auth::login(&config, kv, &email, password).await?;
        }
        Some(Command::Register {
            name,
            email,
            password,
        }) => {
            auth::register(&config, kv, &name, &email, password).await?;
        }
        Some(Command::Logout {}) => {
            auth::logout(&config, kv)?;
        }
        Some(Command::Whoami {}) => {
            auth::whoami(&config, kv)?;
        }
        Some(Command::Profile {
            name,
            email,
            avatar,
        }) => {
            auth::profile(&config, kv, name, email, avatar).await?;
        }
    }

    Ok(())
}
