use crate::{env_or_default, env_parse, ConfigError, Environment, FromEnv};
use strum::{Display, EnumString};
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install color-eyre with a project-standard configuration.
///
/// Call this early in the main() before any fallible operations to ensure
/// colored error output. Safe to call multiple times.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Output format of the log stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, fields flattened (log aggregation friendly)
    Json,
    /// Multi-line human readable output
    Pretty,
}

/// Logging configuration
#[derive(Clone, Debug)]
pub struct TracingConfig {
    /// Default filter directive when `RUST_LOG` is not set (e.g. "info", "debug")
    pub level: String,
    pub format: LogFormat,
}

impl TracingConfig {
    /// Build the filter: `RUST_LOG` wins, then the configured level.
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

impl FromEnv for TracingConfig {
    /// Environment variables:
    /// - `LOG_LEVEL`: default level (default: "info"; "warning" is accepted as "warn")
    /// - `LOG_FORMAT`: "json" or "pretty" (default: "json")
    fn from_env() -> Result<Self, ConfigError> {
        let level = normalize_level(&env_or_default("LOG_LEVEL", "info"));
        let format = env_parse("LOG_FORMAT", "json")?;

        Ok(Self { level, format })
    }
}

fn normalize_level(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    match level.as_str() {
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        _ => level,
    }
}

/// Initialize tracing with error span capture.
///
/// - `Json` format emits flattened JSON events without module targets.
/// - `Pretty` format is meant for local development.
///
/// Both install `tracing_error::ErrorLayer` so eyre reports carry span traces.
///
/// Safe to call multiple times: a second initialization is ignored (common in tests).
pub fn init_tracing(environment: &Environment, config: &TracingConfig) {
    let filter = config.filter();

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init(),
    };

    match result {
        Ok(_) => {
            info!(
                level = %config.level,
                format = %config.format,
                "Tracing initialized. Environment: {:?}",
                environment
            );
        }
        Err(_) => {
            debug!("Tracing already initialized, skipping re-initialization");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_config_defaults() {
        temp_env::with_vars(
            [("LOG_LEVEL", None::<&str>), ("LOG_FORMAT", None::<&str>)],
            || {
                let config = TracingConfig::from_env().unwrap();
                assert_eq!(config.level, "info");
                assert_eq!(config.format, LogFormat::Json);
            },
        );
    }

    #[test]
    fn test_tracing_config_maps_python_style_levels() {
        temp_env::with_var("LOG_LEVEL", Some("WARNING"), || {
            assert_eq!(TracingConfig::from_env().unwrap().level, "warn");
        });
    }

    #[test]
    fn test_tracing_config_pretty_format() {
        temp_env::with_var("LOG_FORMAT", Some("Pretty"), || {
            assert_eq!(TracingConfig::from_env().unwrap().format, LogFormat::Pretty);
        });
    }

    #[test]
    fn test_tracing_config_rejects_unknown_format() {
        temp_env::with_var("LOG_FORMAT", Some("xml"), || {
            let err = TracingConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("LOG_FORMAT"));
        });
    }

    #[test]
    fn test_init_tracing_multiple_calls() {
        let config = TracingConfig::default();
        init_tracing(&Environment::Development, &config);
        init_tracing(&Environment::Production, &config);
    }
}
