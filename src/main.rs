use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use provider_config_merge::{
    cli::{self, MergeArgs},
    config::AppConfig,
    logging,
    server::{self, LogState},
};

#[derive(Parser)]
#[command(name = "pcm")]
#[command(about = "Provider Config Merge - build model/agent config from provider settings", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (default: ~/.provider-config-merge/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge provider settings into a base config JSON
    Merge(MergeArgs),
    /// List provider presets and API modes
    Providers,
    /// Serve the form in the browser
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => AppConfig::default_path()?,
    };
    let mut config = AppConfig::from_file(&config_path)?;

    let log_buffer =
        logging::init(&config.server.log_level).context("Failed to install log subscriber")?;
    tracing::debug!("Loaded configuration from {}", config_path.display());

    match cli.command {
        Commands::Merge(args) => {
            cli::run_merge(&args, &config.registry())?;
        }
        Commands::Providers => {
            print!("{}", cli::format_providers(&config.registry()));
        }
        Commands::Serve { port } => {
            // Override port if specified
            if let Some(port) = port {
                config.server.port = port;
            }

            println!("Provider Config Merge v{}", env!("CARGO_PKG_VERSION"));
            println!("Form available at http://{}:{}", config.server.host, config.server.port);
            println!("Press Ctrl+C to stop");

            server::start_server(config, LogState { log_buffer }).await?;
        }
    }

    Ok(())
}
