//! `tracker` command-line entry point.
//!
//! # Responsibility
//! - Start the HTTP server from file/env/flag configuration.
//! - Provision users and their API tokens, which the HTTP surface cannot do
//!   for anonymous callers.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracker_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use tracker_server::ServerConfig;

#[derive(Debug, Parser)]
#[command(name = "tracker", version, about = "Routine tracker backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API.
    Serve {
        #[command(flatten)]
        store: StoreArgs,
        /// Listen address, overriding config and environment.
        #[arg(long, value_name = "HOST:PORT")]
        bind: Option<String>,
    },
    /// Create a user if needed and print its API token.
    AddUser {
        username: String,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Print core linkage information.
    Ping,
}

#[derive(Debug, clap::Args)]
struct StoreArgs {
    /// TOML configuration file.
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,
    /// SQLite database path, overriding config and environment.
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,
}

impl StoreArgs {
    fn load(&self) -> anyhow::Result<ServerConfig> {
        let mut config = ServerConfig::load(self.config.as_deref())?;
        if let Some(db) = &self.db {
            config.db_path = db.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Serve { store, bind } => {
            let mut config = store.load()?;
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            tracker_server::serve(config).await
        }
        Command::AddUser { username, store } => {
            let config = store.load()?;
            let token = provision_user(&config, &username)?;
            println!("{token}");
            Ok(())
        }
        Command::Ping => {
            println!("tracker_core ping={}", tracker_core::ping());
            println!("tracker_core version={}", tracker_core::core_version());
            Ok(())
        }
    }
}

fn provision_user(config: &ServerConfig, username: &str) -> anyhow::Result<String> {
    let conn = tracker_core::open_db(&config.db_path)
        .with_context(|| format!("failed to open database `{}`", config.db_path.display()))?;
    let repo = SqliteUserRepository::try_new(&conn)?;
    let user = match repo.find_by_username(username)? {
        Some(user) => user,
        None => repo
            .create_user(username)
            .with_context(|| format!("failed to create user `{username}`"))?,
    };
    Ok(repo.issue_token(user.id)?)
}
