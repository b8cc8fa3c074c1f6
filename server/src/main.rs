//! Ticketing HTTP server.

use std::sync::Arc;
use tokio::{signal, sync::Notify};
use ticketing_server::{build_state, config::Config, init_metrics, init_tracing};
use ticketing_web::build_router;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting ticketing server");

    let config = Config::from_env();
    info!(
        storage = ?config.storage,
        redis = config.session.redis_url.is_some(),
        "Configuration loaded"
    );

    init_metrics(&config)?;

    let state = build_state(&config).await?;
    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    let shutdown_started = Arc::new(Notify::new());
    let notifier = Arc::clone(&shutdown_started);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            notifier.notify_one();
        })
        .into_future();

    let timeout = config.server.shutdown_timeout;
    let drain_deadline = async {
        shutdown_started.notified().await;
        tokio::time::sleep(timeout).await;
    };

    tokio::select! {
        result = server => result?,
        () = drain_deadline => {
            warn!(timeout_secs = timeout.as_secs(), "Graceful shutdown timed out");
        }
    }

    info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
