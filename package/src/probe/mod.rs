//! PATH based dependency probing

use parking_lot::Mutex;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::debug;
use vimbuild_config::{DependencyProbe, Feature};

/// Probes dependencies by looking up their executables on a search path.
///
/// Answers are memoized per feature, so each feature is looked up at most once
/// per probe.
pub struct PathProbe {
    /// Search path; `None` uses the process PATH
    search_path: Option<OsString>,
    cache: Mutex<HashMap<Feature, bool>>,
}

impl PathProbe {
    /// Probe the process PATH
    pub fn new() -> Self {
        Self {
            search_path: None,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Probe a specific search path
    pub fn with_search_path(path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(path.into()),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Locate the first executable satisfying `feature`
    pub fn locate(&self, feature: Feature) -> Option<PathBuf> {
        feature
            .executables()
            .iter()
            .find_map(|exe| self.lookup(exe))
    }

    fn lookup(&self, exe: &str) -> Option<PathBuf> {
        let found = match &self.search_path {
            Some(path) => {
                let cwd = std::env::current_dir().ok()?;
                which::which_in(exe, Some(path), cwd)
            }
            None => which::which(exe),
        };
        found.ok()
    }
}

impl Default for PathProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PathProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathProbe")
            .field("search_path", &self.search_path)
            .finish()
    }
}

impl DependencyProbe for PathProbe {
    fn available(&self, feature: Feature) -> bool {
        if let Some(&known) = self.cache.lock().get(&feature) {
            return known;
        }

        let available = feature.executables().is_empty() || self.locate(feature).is_some();
        debug!(
            "Dependency probe for {}: {}",
            feature,
            if available { "found" } else { "missing" }
        );

        self.cache.lock().insert(feature, available);
        available
    }
}
