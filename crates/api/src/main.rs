//! Alertify - Main Entry Point

use alertify::config::env_help;
use alertify::{init_logging, run_server, AlertifyConfig, AppState};
use clap::{CommandFactory, FromArgMatches, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Bridge between Prometheus Alertmanager and Gotify
#[derive(Parser)]
#[command(name = "alertify")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config YAML
    #[arg(short, long, default_value = "alertify.yaml")]
    config: PathBuf,

    /// Exit with 0 when Gotify is healthy, 1 otherwise
    #[arg(short = 'H', long)]
    healthcheck: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let matches = Cli::command().after_help(env_help()).get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let config = AlertifyConfig::load(&cli.config)?;
    init_logging(config.log_level());

    if !cli.config.is_file() {
        warn!("No config file found ({})", cli.config.display());
    }

    let state = Arc::new(AppState::from_config(&config)?);

    if cli.healthcheck {
        let result = state.gotify.healthcheck().await;
        // Unix convention: 0 is healthy
        return Ok(if result.status == 200 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    info!("=== Alertify v{} ===", env!("CARGO_PKG_VERSION"));
    debug!(
        "Parsed config: gotify_url_prefix={} listen_port={} delete_onresolve={} disable_resolved={} client_key_set={}",
        config.gotify_url_prefix,
        config.listen_port,
        config.delete_onresolve,
        config.disable_resolved,
        !config.gotify_key_client.is_empty()
    );

    run_server(state, config.listen_port).await?;

    Ok(ExitCode::SUCCESS)
}
