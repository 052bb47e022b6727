use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use hubwatch::{HubClient, HubCollector, HubConfig, MetricsServer};

#[derive(Parser, Debug)]
#[command(name = "hubwatch")]
#[command(about = "Prometheus exporter for Hubitat Maker API device attributes")]
struct Args {
    /// Configuration file
    #[arg(long, default_value = "hubwatch.yaml")]
    config_file: PathBuf,

    /// Port to serve metrics on (0 picks a free port)
    #[arg(short, long, default_value = "0")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let args = Args::parse();

    let config = HubConfig::load(&args.config_file)
        .with_context(|| format!("Reading config file {}", args.config_file.display()))?;

    let client = HubClient::from_config(&config)?;
    let collector = Arc::new(HubCollector::new(client, &config.metrics)?);
    info!(
        metrics = ?collector.metric_names().collect::<Vec<_>>(),
        "Exporting hub attributes"
    );

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, args.port));
    let server = MetricsServer::bind(addr)
        .await
        .with_context(|| format!("Binding {}", addr))?;
    info!("Serving metrics on http://{}/metrics", server.local_addr()?);

    tokio::select! {
        result = server.serve(collector) => result.context("Metrics server failed")?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}

fn init_logging() {
    // JSON output for container environments. Not HUBWATCH_-prefixed: that
    // prefix is read as configuration.
    let json_logging = std::env::var("LOG_FORMAT").is_ok_and(|v| v == "json");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hubwatch=info"));

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }
}
