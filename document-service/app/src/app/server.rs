use axum::Router;
use tokio::signal;
use tracing::info;

use crate::error::ServiceError;

/// Serve `app` on all interfaces until SIGINT or SIGTERM.
pub async fn serve(app: Router, http_port: u16) -> Result<(), ServiceError> {
    let bind_addr = format!("0.0.0.0:{http_port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| ServiceError::Bind {
            address: bind_addr.clone(),
            source: e,
        })?;
    info!("Document service listening on {}", listener.local_addr()?);
    info!("  - GET  /                (status)");
    info!("  - GET  /health          (health check)");
    info!("  - POST /documents       (classify and store)");
    info!("  - GET  /documents/{{id}}  (fetch stored document)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT (Ctrl+C) for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, initiating graceful shutdown"),
        () = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
