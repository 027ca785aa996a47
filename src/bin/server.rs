//! HTTP server binary for orflax.

use anyhow::Context as _;
use clap::Parser;
use orflax::{AppState, CompanionConfig, CompanionServer};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Orflax: answer, speech and lip-sync backend for a talking avatar.
#[derive(Parser)]
#[command(name = "orflax-server", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides the config file).
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides the config file).
    #[arg(short, long)]
    port: Option<u16>,

    /// Also write logs to a daily rolling file in this directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Write the default configuration to the config path and exit.
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_dir.as_deref());

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(CompanionConfig::default_config_path);

    if cli.init_config {
        CompanionConfig::default()
            .save_to_file(&config_path)
            .with_context(|| format!("writing {}", config_path.display()))?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }

    let mut config = load_config(cli.config.is_some(), &config_path)?;
    config.apply_env_overrides();
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate()?;

    if !config.tts.has_api_key() {
        warn!("no speech API key configured; chat replies will be the reminder script");
    }

    let state = AppState::from_config(&config).await;
    let server = CompanionServer::start(state, &config.server).await?;
    println!(
        "Orflax v{} listening on http://{}",
        env!("CARGO_PKG_VERSION"),
        server.addr()
    );

    tokio::signal::ctrl_c().await?;
    info!("received Ctrl+C, shutting down...");
    server.shutdown();
    Ok(())
}

/// An explicit `--config` must exist; the default path is optional.
fn load_config(explicit: bool, path: &Path) -> anyhow::Result<CompanionConfig> {
    if explicit || path.exists() {
        let config = CompanionConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    } else {
        Ok(CompanionConfig::default())
    }
}

fn init_tracing(log_dir: Option<&Path>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("orflax=info,orflax_server=info,hyper=warn,reqwest=warn")
    });

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "orflax-server.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}
