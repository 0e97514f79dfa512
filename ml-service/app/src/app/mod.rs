mod router;
pub mod server;
mod state;
pub mod tracing;

pub use router::router;
pub use state::AppState;

use crate::config::Settings;
use crate::error::ServiceError;
use crate::model::ClassificationModel;

/// Application entry point. Loads configuration and the model, then serves HTTP.
///
/// A missing or invalid model artifact is returned as an error before the listener binds.
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
        model_path = %settings.model_path.display(),
        http_port = settings.http_port,
        "Loaded settings"
    );

    let model = ClassificationModel::load(&settings.model_path)?;
    let state = AppState::new(model);

    server::serve(router(state), settings.http_port).await
}
