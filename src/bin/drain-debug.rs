use clap::Parser;
use log_monitor::constants::DEFAULT_DRAIN_PORT;
use log_monitor::drain;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "drain-debug")]
#[command(about = "Accepts any request and logs method, URL, headers and body")]
#[command(version)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_DRAIN_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    drain::start_drain(cli.port)
        .await
        .map_err(|e| anyhow::anyhow!("drain failed: {e}"))
}
