//! Recipe configuration loading
//!
//! A recipe file is TOML with two tables:
//!
//! ```toml
//! [settings]
//! prefix = "/usr/local"
//! install_prefix = "/usr/local/Cellar/vim/8.0.1500"
//!
//! [features]
//! lua = "with"
//! python = "without"
//! ```

use crate::{BuildSettings, ConfigError, FeatureSet, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the recipe file
pub const CONFIG_ENV: &str = "VIMBUILD_CONFIG";

/// Default recipe file location
pub const SYSTEM_CONFIG: &str = "/etc/vimbuild/vimbuild.toml";

/// Settings and feature requests for one build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecipeConfig {
    /// Paths and constants
    pub settings: BuildSettings,
    /// Requested features
    pub features: FeatureSet,
}

impl RecipeConfig {
    /// Load configuration from `$VIMBUILD_CONFIG` or the system location,
    /// falling back to defaults when neither exists
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load_from(Path::new(&path));
        }

        let path = PathBuf::from(SYSTEM_CONFIG);
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!("No recipe config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.settings.compiled_by.trim().is_empty() {
            return Err(ConfigError::Invalid("compiled_by must not be empty".to_string()));
        }
        if !self.settings.prefix.is_absolute() {
            return Err(ConfigError::Invalid(format!(
                "prefix must be absolute: {}",
                self.settings.prefix.display()
            )));
        }
        if !self.settings.install_prefix.is_absolute() {
            return Err(ConfigError::Invalid(format!(
                "install_prefix must be absolute: {}",
                self.settings.install_prefix.display()
            )));
        }
        Ok(())
    }
}
