use std::env;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_MODEL_PATH: &str = "model/trained_model.json";
pub const DEFAULT_HTTP_PORT: u16 = 8000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Fitted pipeline artifact loaded at startup
    pub model_path: PathBuf,
    pub http_port: u16,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is set but empty")]
    Missing(&'static str),
    #[error("invalid value for {name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl Settings {
    /// Reads `ML_MODEL_PATH` and `ML_SERVICE_HTTP_PORT`, falling back to defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a variable is blank or the port is not a non-zero
    /// integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            model_path: PathBuf::from(env_or("ML_MODEL_PATH", DEFAULT_MODEL_PATH)?),
            http_port: parse_port("ML_SERVICE_HTTP_PORT", DEFAULT_HTTP_PORT)?,
        })
    }
}

fn env_or(name: &'static str, default: &str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::Missing(name)),
        Ok(value) => Ok(value),
        Err(_) => Ok(default.to_string()),
    }
}

pub(crate) fn parse_port(name: &'static str, default: u16) -> Result<u16, ConfigError> {
    let raw = env_or(name, &default.to_string())?;
    let port = raw.trim().parse::<u16>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })?;
    if port == 0 {
        return Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("port cannot be 0"),
        });
    }
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_env(name: &str, value: &str) {
        // SAFETY: tests holding ENV_MUTEX are the only writers.
        unsafe {
            env::set_var(name, value);
        }
    }

    fn remove_env(name: &str) {
        // SAFETY: tests holding ENV_MUTEX are the only writers.
        unsafe {
            env::remove_var(name);
        }
    }

    fn reset_env() {
        remove_env("ML_MODEL_PATH");
        remove_env("ML_SERVICE_HTTP_PORT");
    }

    #[test]
    fn from_env_uses_defaults() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        reset_env();

        let settings = Settings::from_env().expect("defaults should load");

        assert_eq!(settings.model_path, PathBuf::from("model/trained_model.json"));
        assert_eq!(settings.http_port, 8000);
    }

    #[test]
    fn from_env_reads_overrides() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        reset_env();
        set_env("ML_MODEL_PATH", "/models/pipeline.json");
        set_env("ML_SERVICE_HTTP_PORT", "9100");

        let settings = Settings::from_env().expect("overrides should load");

        assert_eq!(settings.model_path, PathBuf::from("/models/pipeline.json"));
        assert_eq!(settings.http_port, 9100);
        reset_env();
    }

    #[test]
    fn zero_port_is_rejected() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        reset_env();
        set_env("ML_SERVICE_HTTP_PORT", "0");

        let error = Settings::from_env().expect_err("port 0 should fail");

        assert!(matches!(
            error,
            ConfigError::Invalid {
                name: "ML_SERVICE_HTTP_PORT",
                ..
            }
        ));
        assert!(error.to_string().contains("ML_SERVICE_HTTP_PORT"));
        reset_env();
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        reset_env();
        set_env("ML_SERVICE_HTTP_PORT", "eighty");

        assert!(Settings::from_env().is_err());
        reset_env();
    }

    #[test]
    fn blank_model_path_is_missing() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        reset_env();
        set_env("ML_MODEL_PATH", "  ");

        let error = Settings::from_env().expect_err("blank path should fail");

        assert!(matches!(error, ConfigError::Missing("ML_MODEL_PATH")));
        reset_env();
    }
}
