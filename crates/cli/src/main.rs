//! Veloce CLI: the main entry point.
//!
//! Commands:
//! - `onboard`: Write the default config and create the vehicle database
//! - `chat`: Interactive chat or single-message mode
//! - `vehicles`: List known vehicles
//! - `status`: Show vehicle telemetry and service history
//! - `doctor`: Diagnose configuration and services
//! - `config`: Validate, show or locate the config file

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "veloce",
    about = "Veloce — conversational vehicle assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and the vehicle database
    Onboard,

    /// Chat with the assistant about a vehicle
    Chat {
        /// Vehicle to talk about (defaults to the configured or first vehicle)
        #[arg(long)]
        vehicle: Option<i64>,

        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Attach an image before the first message
        #[arg(short, long)]
        image: Option<std::path::PathBuf>,
    },

    /// List vehicles
    Vehicles,

    /// Show vehicle telemetry and maintenance history
    Status {
        #[arg(long)]
        vehicle: Option<i64>,
    },

    /// Diagnose system health
    Doctor,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Load and validate the config file
    Validate,
    /// Print the effective configuration (secrets redacted)
    Show,
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat {
            vehicle,
            message,
            image,
        } => commands::chat::run(vehicle, message, image).await?,
        Commands::Vehicles => commands::vehicles::run().await?,
        Commands::Status { vehicle } => commands::status::run(vehicle).await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Config { action } => match action {
            ConfigAction::Validate => commands::config_cmd::validate().await?,
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
        },
    }

    Ok(())
}
