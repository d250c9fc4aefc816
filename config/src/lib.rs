//! vimbuild build configuration
//!
//! This crate holds the decision logic of the Vim build recipe: which
//! optional features get built and which configure flags that implies.
//!
//! # Overview
//!
//! - [`features`]: the optional features and user requests ([`FeatureSet`])
//! - [`rules`]: mutual exclusivity between features
//! - [`probe`]: dependency availability
//! - [`settings`]: paths, constants and environment overrides
//! - [`resolver`]: [`FlagResolver`], turning requests into configure flags
//! - [`loader`]: recipe configuration files
//!
//! # Quick Start
//!
//! ```rust
//! use vimbuild_config::{BuildSettings, Feature, FeatureSet, FlagResolver, StaticProbe};
//!
//! let features = FeatureSet::parse_options(["with-lua", "with-luajit"]).unwrap();
//! let resolver = FlagResolver::new(BuildSettings::default());
//! let resolution = resolver
//!     .resolve(&features, &StaticProbe::all_available())
//!     .unwrap();
//!
//! assert!(resolution.config.has_flag("--enable-luainterp"));
//! assert!(!resolution.config.is_enabled(Feature::Luajit));
//! assert_eq!(resolution.notices.len(), 1);
//! ```

pub mod error;
pub mod features;
pub mod loader;
pub mod probe;
pub mod resolver;
pub mod rules;
pub mod settings;

pub use error::{ConfigError, Result};
pub use features::{Feature, FeatureSet, FlagTemplate, RequestedState};
pub use loader::RecipeConfig;
pub use probe::{DependencyProbe, StaticProbe};
pub use resolver::{fixed_flags, FlagResolver, Notice, Resolution, ResolvedConfig};
pub use rules::{default_rules, ExclusivityRule, RuleSet};
pub use settings::{BuildSettings, EnvOverride, EnvOverrides};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BuildSettings, ConfigError, DependencyProbe, Feature, FeatureSet, FlagResolver,
        RecipeConfig, RequestedState, Resolution, ResolvedConfig, Result, RuleSet,
    };
}
