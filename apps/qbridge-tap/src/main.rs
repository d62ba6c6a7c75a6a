use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use qbridge_common::TapConfigPatch;
use qbridge_router::{ClientConfig, TapState, build_client, tap_router};

/// Debugging relay: logs everything and forwards it unmodified to a fixed
/// upstream host and port.
#[derive(Parser)]
#[command(name = "qbridge-tap")]
struct Cli {
    /// Listen port.
    #[arg(long)]
    port: Option<u16>,
    /// Upstream host to relay to.
    #[arg(long)]
    upstream_host: Option<String>,
    /// Upstream port to relay to.
    #[arg(long)]
    upstream_port: Option<u16>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("qbridge-tap failed: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let mut patch = env_patch();
    patch.overlay(TapConfigPatch {
        port: cli.port,
        upstream_host: cli.upstream_host.clone(),
        upstream_port: cli.upstream_port,
    });
    let config = patch.into_config();
    init_tracing();
    info!(
        port = config.port,
        upstream = %format!("{}:{}", config.upstream_host, config.upstream_port),
        "tap starting"
    );

    // Long-lived relays are bounded by the idle timeout, not the total one.
    let client = build_client(&ClientConfig {
        request_timeout: Duration::from_secs(86400),
        ..ClientConfig::default()
    })?;
    let state = TapState {
        config: Arc::new(config.clone()),
        client,
    };

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, tap_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("tap stopped");

    Ok(())
}

fn env_patch() -> TapConfigPatch {
    TapConfigPatch {
        port: non_empty_var("TAP_PORT").and_then(|value| value.parse().ok()),
        upstream_host: non_empty_var("TAP_UPSTREAM_HOST"),
        upstream_port: non_empty_var("TAP_UPSTREAM_PORT").and_then(|value| value.parse().ok()),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("qbridge_tap=info,qbridge_router=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut signal) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            signal.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown requested");
}
