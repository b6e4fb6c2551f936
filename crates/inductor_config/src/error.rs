//! Error types for configuration loading.

use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading or querying the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration is missing the required '{0}' section")]
    MissingSection(&'static str),

    #[error("Unknown operating system '{name}', available: {}", available.join(", "))]
    UnknownOperatingSystem { name: String, available: Vec<String> },

    #[error("Operating system '{os}' has no edition named '{edition}'")]
    UnknownEdition { os: String, edition: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Parse(#[from] serde_json::Error),
}
