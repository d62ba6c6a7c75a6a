use std::error::Error;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing::info;

mod cli;
mod env;

use qbridge_router::{ClientConfig, GatewayState, build_client, gateway_router};

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("qbridge failed: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let mut patch = env::env_patch();
    patch.overlay(cli.patch());
    let config = patch.into_config()?;
    init_tracing(config.debug);
    info!(
        host = %config.host,
        port = config.port,
        target = %config.target_url,
        debug = config.debug,
        "qbridge starting"
    );

    let state = GatewayState {
        config: Arc::new(config.clone()),
        client: build_client(&ClientConfig::default())?,
        started_at: Instant::now(),
    };
    let app = gateway_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("bridge stopped");

    Ok(())
}

fn init_tracing(debug: bool) {
    let default = if debug {
        "qbridge=debug,qbridge_router=debug,qbridge_transform=debug"
    } else {
        "qbridge=info,qbridge_router=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Stop accepting new connections on ctrl-c or SIGTERM; axum drains
/// in-flight relays before the listener is released.
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
