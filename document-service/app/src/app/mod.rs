mod router;
pub mod server;
mod state;
pub mod tracing;

pub use router::router;
pub use state::AppState;

use crate::config::Settings;
use crate::error::ServiceError;

/// Application entry point. Initializes tracing and configuration, then serves HTTP.
pub async fn run() -> Result<(), ServiceError> {
    // Handle healthcheck subcommand (for Docker healthcheck in distroless image)
    if std::env::args().nth(1).as_deref() == Some("healthcheck") {
        match crate::healthcheck().await {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("Healthcheck failed: {e}");
                std::process::exit(1)
            }
        }
    }

    tracing::init_tracing();

    let settings = Settings::from_env()?;
    ::tracing::info!(
        ml_service_url = %settings.ml_service_url,
        timeout_ms = u64::try_from(settings.ml_service_timeout.as_millis()).unwrap_or(u64::MAX),
        http_port = settings.http_port,
        store_capacity = settings.store_capacity,
        database = %redact_credentials(&settings.database_url),
        "Loaded settings"
    );

    let state = AppState::from_settings(&settings)?;

    server::serve(router(state), settings.http_port).await
}

/// Keeps only the part of a connection string after the last `@`.
fn redact_credentials(url: &str) -> &str {
    url.rsplit_once('@').map_or(url, |(_, host)| host)
}
