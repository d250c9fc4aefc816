//! Dependency availability probes

use crate::Feature;
use std::collections::BTreeSet;

/// Answers whether a feature's external dependency is usable.
///
/// Implementations must not have side effects visible to the resolver;
/// memoization is up to the probe.
pub trait DependencyProbe: Send + Sync {
    /// Whether the dependency of `feature` is available
    fn available(&self, feature: Feature) -> bool;
}

impl<F> DependencyProbe for F
where
    F: Fn(Feature) -> bool + Send + Sync,
{
    fn available(&self, feature: Feature) -> bool {
        self(feature)
    }
}

/// Probe with a fixed answer table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticProbe {
    missing: BTreeSet<Feature>,
}

impl StaticProbe {
    /// Every dependency is available
    pub fn all_available() -> Self {
        Self::default()
    }

    /// No dependency is available
    pub fn none_available() -> Self {
        Self {
            missing: Feature::all().iter().copied().collect(),
        }
    }

    /// Only the given dependencies are available
    pub fn only(available: impl IntoIterator<Item = Feature>) -> Self {
        let available: BTreeSet<_> = available.into_iter().collect();
        Self {
            missing: Feature::all()
                .iter()
                .copied()
                .filter(|f| !available.contains(f))
                .collect(),
        }
    }

    /// Mark a dependency as missing
    pub fn missing(mut self, feature: Feature) -> Self {
        self.missing.insert(feature);
        self
    }
}

impl DependencyProbe for StaticProbe {
    fn available(&self, feature: Feature) -> bool {
        !self.missing.contains(&feature)
    }
}
