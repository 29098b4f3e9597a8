use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use crate::config;
use crate::domain::history::HistoryEntry;
use crate::http::server::HttpServer;
use crate::radio::Radio;
use crate::storage::error::StorageError;
use crate::storage::history::{DEFAULT_RECENT_LIMIT, HistoryStore};

#[derive(Parser)]
#[command(name = "radiodeck")]
#[command(version = "0.1")]
#[command(about = "Music radio backend: search, stream, lyrics and play history")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run http server
    Serve,
    /// List recently played songs
    Recent {
        /// Maximum number of songs to show
        #[arg(short, long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },
    /// Show the song played before the current one
    Previous,
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = config::Config::load(&cli.config)?;

    match &cli.command {
        Commands::Serve => {
            let radio = Radio::from_config(&cfg)?;
            let http_server = HttpServer::new(radio, cfg.http);

            info!(
                "Starting HTTP server at http://{}:{}",
                http_server.config.bind_addr, http_server.config.port
            );
            http_server.run()?;
        }

        Commands::Recent { limit } => {
            let history = HistoryStore::new(&cfg.database)?;
            let entries = history.recent(*limit)?;
            if entries.is_empty() {
                println!("Nothing played yet");
            }
            for entry in &entries {
                print_entry(entry);
            }
        }

        Commands::Previous => {
            let history = HistoryStore::new(&cfg.database)?;
            match history.previous() {
                Ok(entry) => print_entry(&entry),
                Err(StorageError::NoPreviousSong) => println!("No previous song found"),
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

fn print_entry(entry: &HistoryEntry) {
    println!(
        "{}  {} - {}  [{}]",
        entry
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S"),
        entry.artist,
        entry.title,
        entry.video_id
    );
}
