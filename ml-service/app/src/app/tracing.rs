use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Output format selected through `RUST_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl LogFormat {
    /// Unset or unrecognized values fall back to JSON.
    #[must_use]
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("pretty" | "text") => Self::Pretty,
            Some("compact") => Self::Compact,
            _ => Self::Json,
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` directives are applied on top of INFO.
pub fn init_tracing() {
    let format = LogFormat::from_env_value(std::env::var("RUST_LOG_FORMAT").ok().as_deref());
    let filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true),
            )
            .init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
        LogFormat::Compact => registry.with(fmt::layer().compact().with_target(false)).init(),
    }
}
