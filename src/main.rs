use clap::Parser;
use log_monitor::config::{Config, FileConfig};
use log_monitor::monitor::{Monitor, Ports};
use log_monitor::observability;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "log-monitor")]
#[command(about = "Measures how long app and HTTP log lines take to become searchable")]
#[command(version)]
struct Cli {
    /// Optional TOML config file; environment variables override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log measurements instead of writing them to the metric store
    #[arg(long)]
    dry_run: bool,

    /// Port for the sample responder
    #[arg(short, long)]
    port: Option<u16>,
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let file = match cli.config.as_deref() {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let mut file = file.merge_env(|key| std::env::var(key).ok())?;
    if cli.dry_run {
        file.dry_run = Some(true);
    }
    if let Some(port) = cli.port {
        file.port = Some(port);
    }
    Ok(file.finish()?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    let _log_guard = observability::init_logging("logs", "monitor.log");

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e}");
            return Err(e);
        }
    };

    if let Some(addr) = config.metrics_addr {
        if let Err(e) = observability::metrics::init(addr) {
            warn!("Failed to initialize metrics exporter: {}", e);
        }
    }

    info!(
        port = config.port,
        timeout_on_search = config.timeout_on_search_secs,
        time_to_failure = config.time_to_failure_secs,
        "Starting log monitor"
    );

    let ports = Ports::from_config(&config)?;
    Monitor::new(config, ports).run(shutdown_signal()).await?;
    Ok(())
}
