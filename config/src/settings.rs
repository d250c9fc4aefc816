//! Build settings and environment overrides
//!
//! [`BuildSettings`] holds the paths and constants that end up in the fixed
//! configure flags and in the install step. [`EnvOverride`] describes how a
//! single environment variable changes for the duration of the build.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Paths and constants of the build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Prefix vim searches for system vimscript files (`--prefix`)
    pub prefix: PathBuf,
    /// Where `make install` places the files
    pub install_prefix: PathBuf,
    /// Manual page directory; defaults to `<install_prefix>/share/man`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mandir: Option<PathBuf>,
    /// Value for `--with-compiledby`
    pub compiled_by: String,
    /// Lua installation prefix; defaults to `prefix`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lua_prefix: Option<PathBuf>,
    /// Python libexec directory whose `bin` goes first on PATH
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python_libexec: Option<PathBuf>,
    /// Parallel jobs for `make`
    pub jobs: usize,
}

impl Default for BuildSettings {
    fn default() -> Self {
        let jobs = std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(4);

        Self {
            prefix: PathBuf::from("/usr/local"),
            install_prefix: PathBuf::from("/usr/local"),
            mandir: None,
            compiled_by: "vimbuild".to_string(),
            lua_prefix: None,
            python_libexec: None,
            jobs,
        }
    }
}

impl BuildSettings {
    /// Settings rooted at `prefix`, installing into `install_prefix`
    pub fn new(prefix: impl Into<PathBuf>, install_prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            install_prefix: install_prefix.into(),
            ..Self::default()
        }
    }

    /// Effective manual page directory
    pub fn mandir(&self) -> PathBuf {
        self.mandir
            .clone()
            .unwrap_or_else(|| self.install_prefix.join("share/man"))
    }

    /// Effective Lua prefix
    pub fn lua_prefix(&self) -> &Path {
        self.lua_prefix.as_deref().unwrap_or(&self.prefix)
    }

    /// Directory containing installed binaries
    pub fn bin_dir(&self) -> PathBuf {
        self.install_prefix.join("bin")
    }
}

/// How one environment variable changes for the build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "kebab-case")]
pub enum EnvOverride {
    /// Set the variable
    Set(String),
    /// Put a directory in front of a PATH-style list
    PrependPath(String),
    /// Remove the variable
    Unset,
}

impl EnvOverride {
    /// Compute the variable's value given its current value.
    ///
    /// Returns `None` when the variable must be removed.
    pub fn apply(&self, current: Option<OsString>) -> Option<OsString> {
        match self {
            EnvOverride::Set(value) => Some(OsString::from(value)),
            EnvOverride::Unset => None,
            EnvOverride::PrependPath(dir) => {
                let mut paths = vec![PathBuf::from(dir)];
                if let Some(current) = &current {
                    paths.extend(std::env::split_paths(current));
                }
                // Only fails on entries containing the separator
                match std::env::join_paths(&paths) {
                    Ok(joined) => Some(joined),
                    Err(e) => {
                        warn!("Not prepending {} to search path: {}", dir, e);
                        current.or_else(|| Some(OsString::from(dir)))
                    }
                }
            }
        }
    }
}

/// Environment overrides in application order
pub type EnvOverrides = IndexMap<String, EnvOverride>;
