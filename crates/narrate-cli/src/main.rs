//! Narrate - text-to-speech into audio files with streamed playback

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod context;

use cli::{Cli, Commands};
use narrate_core::NarrateConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Credentials may live in a local .env file
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose {
        "narrate=debug,narrate_core=debug"
    } else {
        "narrate=info,narrate_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &dotenv {
        Ok(path) => debug!("Loaded environment from {:?}", path),
        Err(e) => debug!("No .env loaded: {}", e),
    }

    // Load configuration
    let config = NarrateConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Say(args) => commands::say(config, args).await,
        Commands::Batch(args) => commands::batch(config, args).await,
        Commands::Voices => {
            commands::voices(&config);
            Ok(())
        }
        Commands::Check => {
            commands::check(&config, dotenv.is_ok());
            Ok(())
        }
        Commands::Config => commands::show_config(&config),
    }
}
