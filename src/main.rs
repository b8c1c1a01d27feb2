mod config;
mod database;
mod entities;
mod error;
mod http_server;
mod logging;
mod ports;
mod services;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};

use crate::{
    config::Config, database::Database, http_server::app::HttpServerConfig,
    logging::init_tracing,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "MUSIC_CATALOG_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `music_catalog=debug,tower_http=info`
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: String,

    /// OTLP collector endpoint; spans are only exported when set
    #[arg(long, global = true, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,

    /// Overrides `database_url` from the config file
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Overrides `queue.amqp_url` from the config file
    #[arg(long, global = true, env = "AMQP_URL")]
    amqp_url: Option<String>,

    /// Overrides `cache.redis_url` from the config file
    #[arg(long, global = true, env = "REDIS_URL")]
    redis_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// The port to run the server on
        #[arg(short, long, default_value = "5000", env = "MUSIC_CATALOG_HTTP_PORT")]
        port: u16,
    },
    /// Apply pending database migrations and exit
    Migrate,
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let _tracing_guard = init_tracing(
        "music-catalog",
        args.otlp_endpoint.as_deref(),
        &args.log_level,
    )?;

    match args.command {
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                tracing::debug!("Creating default config");
                Config::create_default()?;
                tracing::info!("Default config created successfully");
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
        Commands::Migrate => {
            let config = load_config(
                args.config,
                args.database_url,
                args.amqp_url,
                args.redis_url,
            )?;
            let database = Database::connect(&config.database_url()).await?;
            database.migrate().await?;
            tracing::info!("Migrations applied");
        }
        Commands::Serve { port } => {
            let config = load_config(
                args.config,
                args.database_url,
                args.amqp_url,
                args.redis_url,
            )?;
            let database = Arc::new(Database::open(&config.database_url()).await?);
            tracing::info!(port, "Starting HTTP server");
            http_server::app::start(HttpServerConfig {
                port,
                database,
                config,
            })
            .await?;
        }
    }

    Ok(())
}

fn load_config(
    path: Option<PathBuf>,
    database_url: Option<String>,
    amqp_url: Option<String>,
    redis_url: Option<String>,
) -> Result<Config> {
    tracing::debug!("Loading configuration");
    let config = match path {
        Some(path) => Config::from_file(&path),
        None => Config::load(),
    }
    .wrap_err("Failed to load music-catalog config")?;

    Ok(config.with_overrides(database_url, amqp_url, redis_url))
}
