//! collins_exporter — Prometheus exporter for Collins asset metrics.
//!
//! Assembles the exporter:
//! - Collins client (credentials from `collins.toml`)
//! - Scrape coordinator (one Collins fetch in flight at a time)
//! - HTTP server exposing `/metrics` and a landing page
//!
//! # Usage
//!
//! ```text
//! collins_exporter --web.listen-address 0.0.0.0:9136 --collins.config /etc/collins.toml
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio::sync::watch;
use tracing::{error, info};

use collins_client::{CollinsClient, CollinsConfig};
use collins_metrics::fetcher::{DEFAULT_PAGE_SIZE, DEFAULT_QUERY};
use collins_metrics::{Collector, FetchOptions, ScrapeCoordinator};

#[derive(Parser)]
#[command(name = "collins_exporter", about = "Prometheus exporter for Collins asset metrics")]
struct Cli {
    /// Address to listen on for web interface and telemetry.
    #[arg(long = "web.listen-address", default_value = "0.0.0.0:9136")]
    listen_address: SocketAddr,

    /// Path under which to expose metrics.
    #[arg(long = "web.telemetry-path", default_value = "/metrics")]
    telemetry_path: String,

    /// Path to the Collins config. Defaults to $COLLINS_CONFIG,
    /// ~/.collins.toml, then /etc/collins.toml.
    #[arg(long = "collins.config")]
    collins_config: Option<PathBuf>,

    /// CQL query selecting the assets to export.
    #[arg(long = "collins.query", default_value = DEFAULT_QUERY)]
    query: String,

    /// Assets requested per page.
    #[arg(long = "collins.page-size", default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);
    run(cli).await
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("info,collins_exporter=debug,collins_metrics=debug")
    });
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    info!("starting collins_exporter");

    // ── Collins client ─────────────────────────────────────────

    let config = match &cli.collins_config {
        Some(path) => CollinsConfig::from_file(path)?,
        None => CollinsConfig::discover()?,
    };
    let client = CollinsClient::new(&config)
        .with_context(|| format!("could not set up collins client for {}", config.host))?;
    info!(host = %config.host, "collins client initialized");

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Scrape coordinator ─────────────────────────────────────

    let options = FetchOptions {
        query: cli.query,
        page_size: cli.page_size.max(1),
    };
    let (coordinator, coordinator_handle) = ScrapeCoordinator::spawn(client, options, shutdown_rx);
    let collector = Collector::new(coordinator);

    // ── HTTP server ────────────────────────────────────────────

    let router = collins_api::build_router(collector, &cli.telemetry_path);
    let listener = tokio::net::TcpListener::bind(cli.listen_address)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen_address))?;
    info!(addr = %cli.listen_address, path = %cli.telemetry_path, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
            }
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    join_coordinator(coordinator_handle).await;

    info!("collins_exporter stopped");
    Ok(())
}

/// Wait for the coordinator task; returns false if it panicked or was cancelled.
async fn join_coordinator(handle: tokio::task::JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, "scrape coordinator task failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_upstream_flags() {
        let cli = Cli::parse_from(["collins_exporter"]);
        assert_eq!(cli.listen_address, "0.0.0.0:9136".parse().unwrap());
        assert_eq!(cli.telemetry_path, "/metrics");
        assert_eq!(cli.collins_config, None);
        assert_eq!(cli.query, DEFAULT_QUERY);
        assert_eq!(cli.page_size, 1000);
        assert!(cli.log_format == LogFormat::Text);
    }

    #[test]
    fn dotted_flags_parse() {
        let cli = Cli::parse_from([
            "collins_exporter",
            "--web.listen-address",
            "127.0.0.1:9999",
            "--web.telemetry-path",
            "/probe",
            "--collins.config",
            "/srv/collins.toml",
            "--collins.page-size",
            "50",
            "--log-format",
            "json",
        ]);
        assert_eq!(cli.listen_address.port(), 9999);
        assert_eq!(cli.telemetry_path, "/probe");
        assert_eq!(cli.collins_config, Some(PathBuf::from("/srv/collins.toml")));
        assert_eq!(cli.page_size, 50);
        assert!(cli.log_format == LogFormat::Json);
    }

    #[tokio::test]
    async fn coordinator_panic_is_reported() {
        let clean = tokio::spawn(async {});
        assert!(join_coordinator(clean).await);

        let panicked = tokio::spawn(async {
            panic!("coordinator blew up");
        });
        assert!(!join_coordinator(panicked).await);
    }
}
