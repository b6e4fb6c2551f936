//! Error types for templates.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur during template operations.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to walk directory {path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read template {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template parse error in {template} at line {line}: {message}")]
    Parse {
        template: String,
        line: usize,
        message: String,
    },

    #[error("Template execution failed in {template} at line {line}: {message}")]
    Execution {
        template: String,
        line: usize,
        message: String,
    },

    #[error("Partial template {partial:?} yields an empty block name in template {template:?}")]
    EmptyBlockName { template: PathBuf, partial: PathBuf },

    #[error("Block '{name}' is defined more than once in template {template:?}")]
    DuplicateBlock { template: PathBuf, name: String },

    #[error("Expected a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] inductor_config::ConfigError),
}
