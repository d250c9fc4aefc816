//! Error types for configuration and flag resolution

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Feature '{feature}' was requested but its dependency is not available")]
    MissingDependency { feature: String },

    #[error("Exclusivity rule has no tie-break for enabled features: {}", features.join(", "))]
    ConfigConflict { features: Vec<String> },

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Invalid exclusivity rule: {0}")]
    InvalidRule(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
