//! Health checker binary

use anyhow::Context;
use clap::Parser;
use common::logging::{self, LogFormat};
use healthchecker::{Config, HealthcheckService, shutdown_signal};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "healthchecker", about = "Periodically probe HTTP endpoints")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short = 'c', long = "config-path")]
    config_path: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging settings)
    let config = Config::load_from_file(&cli.config_path).with_context(|| {
        format!(
            "failed to load configuration from {}",
            cli.config_path.display()
        )
    })?;

    logging::init_with_format(
        LogFormat::from_name(config.logging.format.as_deref()),
        config.logging.level.as_deref().unwrap_or("info"),
    );
    tracing::info!(path = %cli.config_path.display(), "Configuration loaded successfully");

    let service = HealthcheckService::new(config.to_service_config());
    service.run(std::io::stdout(), shutdown_signal()).await?;

    Ok(())
}
