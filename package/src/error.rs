//! Error types for the build pipeline

use thiserror::Error;
use vimbuild_config::ConfigError;

/// Result type alias for build operations
pub type Result<T> = std::result::Result<T, Error>;

/// Build pipeline errors
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("`{command}` exited with {}", code.map_or("a signal".to_string(), |c| format!("status {}", c)))]
    CommandFailed {
        program: String,
        command: String,
        code: Option<i32>,
    },

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Source directory not found: {0}")]
    SourceNotFound(String),
}
