use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use bandmeter::config::BandmeterConfig;

#[derive(Parser)]
#[command(
    name = "bandmeter",
    about = "Self-hosted bandwidth test server with persisted results",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (test-traffic endpoints + results store)
    Serve {
        /// Bind address (overrides config file)
        #[arg(long)]
        bind: Option<String>,

        /// SQLite database path (overrides config file)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Path to a TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML and exit
    ShowConfig {
        /// Path to a TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<BandmeterConfig> {
    match path {
        Some(p) => BandmeterConfig::load(p),
        None => Ok(BandmeterConfig::load_or_default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind, db, config } => {
            let mut cfg = load_config(config.as_ref())?;
            if let Some(bind) = bind {
                cfg.server.bind = bind;
            }
            if let Some(db) = db {
                cfg.storage.database_path = db;
            }

            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                        tracing_subscriber::EnvFilter::new(cfg.logging.level.clone())
                    }),
                )
                .init();

            tracing::info!(bind = %cfg.server.bind, "starting bandmeter server");
            bandmeter::serve(cfg).await?;
        }
        Commands::ShowConfig { config } => {
            let cfg = load_config(config.as_ref())?;
            print!("{}", toml::to_string_pretty(&cfg)?);
        }
    }

    Ok(())
}
