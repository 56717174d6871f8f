//! ssogate - OpenID Connect single sign-on gateway
//!
//! Binary entry point: loads configuration, wires the context and serves
//! the axum router until SIGINT/SIGTERM.

use std::sync::Arc;

use anyhow::Context as _;
use ssogate_api::utils::logging::init_logging;
use ssogate_api::{create_router, AppContext};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before logging so RUST_LOG from the file applies
    let dotenv = dotenvy::dotenv();
    init_logging();
    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(e) => info!(error = %e, "No .env file loaded"),
    }

    let config = ssogate_infra::config::load().context("failed to load configuration")?;
    let bind_addr = config.server.bind_addr.clone();

    let ctx = Arc::new(AppContext::new(config).context("failed to initialize application")?);
    let app = create_router(Arc::clone(&ctx));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "ssogate listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Err(err) = ctx.shutdown().await {
        warn!(error = %err, "context shutdown reported an error");
    }
    info!("ssogate stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
