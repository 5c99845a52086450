use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ctp_application::{SessionStore, TracingErrorReporter};
use ctp_core::storage::KeyValueStorage;
use ctp_infrastructure::{ConfigStorage, DashboardPaths, JsonFileStorage, MemoryStorage};
use ctp_interaction::MerchantCenterClient;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "ctp")]
#[command(about = "Merchant Center dashboard session from the terminal", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep the session in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CTP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the current session
    Status,
    /// List active and inactive projects
    Projects,
    /// Select the project shown on the dashboard
    Select { project_id: String },
    /// Show today's order and cart statistics for the selected project
    Stats,
    /// Clear the persisted session
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let mut store = open_store(&cli).await?;
    if cli.command.refreshes_session() {
        store.complete_startup().await;
    }

    match cli.command {
        Commands::Login { email, password } => {
            commands::session::login(&mut store, &email, &password).await?
        }
        Commands::Status => commands::session::status(&store),
        Commands::Projects => commands::projects::list(&store),
        Commands::Select { project_id } => {
            commands::projects::select(&mut store, &project_id).await
        }
        Commands::Stats => commands::stats::show(&store).await?,
        Commands::Logout => commands::session::logout(&mut store).await,
    }

    Ok(())
}

impl Commands {
    /// Whether the command starts up the session, which refreshes it from
    /// the API when a token was restored. Logout only needs the local state.
    fn refreshes_session(&self) -> bool {
        !matches!(self, Commands::Logout)
    }
}

/// Wires config, storage and API client into a hydrated session store.
async fn open_store(cli: &Cli) -> Result<SessionStore> {
    let config_storage = match &cli.config {
        Some(path) => ConfigStorage::with_path(path),
        None => ConfigStorage::new()?,
    };
    let config = config_storage
        .load()
        .with_context(|| format!("Failed to load {}", config_storage.path().display()))?;

    let storage: Arc<dyn KeyValueStorage> = if cli.ephemeral {
        Arc::new(MemoryStorage::new())
    } else {
        let path = match &config.storage_file {
            Some(path) => path.clone(),
            None => DashboardPaths::session_file()?,
        };
        tracing::debug!("[ctp] Session store at {}", path.display());
        Arc::new(JsonFileStorage::new(path))
    };

    let api = Arc::new(MerchantCenterClient::from_config(&config)?);
    let mut store = SessionStore::from_config(
        &config,
        storage,
        api,
        Arc::new(TracingErrorReporter),
    );
    store.hydrate().await;
    Ok(store)
}
