//! Configure flag resolution
//!
//! [`FlagResolver`] turns a [`FeatureSet`] into a [`ResolvedConfig`]:
//!
//! 1. A feature is enabled when it is requested `with`, or when it is
//!    default-enabled and not refused, and in both cases its dependency probe
//!    reports it available. A `with` request whose dependency is missing is an
//!    error.
//! 2. Every [`ExclusivityRule`](crate::ExclusivityRule) with more than one
//!    enabled member keeps its winner and drops the rest, producing a
//!    [`Notice`].
//! 3. Feature tokens are emitted in declared feature order, followed by the
//!    fixed flags.
//! 4. Features needing path injection contribute environment overrides.
//!
//! Resolution is a pure function of its inputs: the same features, rules,
//! settings and probe answers always produce byte-identical output.

use crate::{
    BuildSettings, ConfigError, DependencyProbe, EnvOverride, EnvOverrides, Feature, FeatureSet,
    RequestedState, Result, RuleSet,
};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Advisory produced when an exclusivity rule drops features
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Feature that was kept
    pub kept: Feature,
    /// Features that were disabled
    pub dropped: Vec<Feature>,
    /// Advisory text of the rule
    pub message: String,
}

/// Final configure flags and environment for one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    flags: Vec<String>,
    env: EnvOverrides,
    enabled: BTreeSet<Feature>,
}

impl ResolvedConfig {
    /// Configure tokens in emission order
    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    /// Environment overrides scoped to the build
    pub fn env(&self) -> &EnvOverrides {
        &self.env
    }

    /// Features enabled after rule application
    pub fn enabled(&self) -> &BTreeSet<Feature> {
        &self.enabled
    }

    /// Whether a feature ended up enabled
    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.enabled.contains(&feature)
    }

    /// Whether a configure token is present
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    /// Feature set that reproduces this configuration
    pub fn feature_set(&self) -> FeatureSet {
        FeatureSet::from_enabled(&self.enabled)
    }
}

/// A resolved configuration with the advisories raised while deriving it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub config: ResolvedConfig,
    pub notices: Vec<Notice>,
}

/// Resolves feature requests into configure flags
#[derive(Debug, Clone)]
pub struct FlagResolver {
    rules: RuleSet,
    settings: BuildSettings,
}

impl FlagResolver {
    /// Create a resolver with the built-in rule table
    pub fn new(settings: BuildSettings) -> Self {
        Self::with_rules(RuleSet::default(), settings)
    }

    /// Create a resolver with a custom rule table.
    ///
    /// The table is taken as is; a rule without a usable winner fails at
    /// resolution time with `ConfigConflict`.
    pub fn with_rules(rules: RuleSet, settings: BuildSettings) -> Self {
        Self { rules, settings }
    }

    /// Rule table in use
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Build settings in use
    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    /// Resolve `features` against the rule table
    pub fn resolve(&self, features: &FeatureSet, probe: &dyn DependencyProbe) -> Result<Resolution> {
        let mut enabled = enabled_features(features, probe)?;
        let notices = self.apply_rules(&mut enabled)?;

        let config = ResolvedConfig {
            flags: self.flags_for(&enabled),
            env: self.env_for(&enabled),
            enabled,
        };

        debug!("Resolved configure flags: {}", config.flags.join(" "));
        Ok(Resolution { config, notices })
    }

    fn apply_rules(&self, enabled: &mut BTreeSet<Feature>) -> Result<Vec<Notice>> {
        let mut notices = Vec::new();

        for rule in self.rules.iter() {
            let members = rule.enabled_members(enabled);
            if members.len() < 2 {
                continue;
            }

            let winner = match rule.winner {
                Some(winner) if members.contains(&winner) => winner,
                _ => {
                    return Err(ConfigError::ConfigConflict {
                        features: members.iter().map(|f| f.name().to_string()).collect(),
                    })
                }
            };

            let dropped: Vec<_> = members.into_iter().filter(|f| *f != winner).collect();
            for feature in &dropped {
                enabled.remove(feature);
            }

            warn!("{}", rule.advisory);
            notices.push(Notice {
                kept: winner,
                dropped,
                message: rule.advisory.clone(),
            });
        }

        Ok(notices)
    }

    fn flags_for(&self, enabled: &BTreeSet<Feature>) -> Vec<String> {
        let mut flags: Vec<String> = Vec::new();

        for feature in Feature::all() {
            let template = feature.flag_template();
            let tokens = if enabled.contains(feature) {
                template.enabled
            } else {
                template.disabled
            };
            for token in tokens {
                if !flags.iter().any(|f| f == token) {
                    flags.push((*token).to_string());
                }
            }
        }

        flags.extend(fixed_flags(&self.settings));
        flags
    }

    fn env_for(&self, enabled: &BTreeSet<Feature>) -> EnvOverrides {
        let mut env = EnvOverrides::new();

        // The SDK is chosen by the toolchain, and vim needs no Python packages
        env.insert("SDKROOT".to_string(), EnvOverride::Unset);
        env.insert("PYTHONPATH".to_string(), EnvOverride::Unset);

        for feature in enabled {
            match feature {
                Feature::Lua | Feature::Luajit => {
                    let prefix = self.settings.lua_prefix().to_string_lossy().into_owned();
                    env.entry("LUA_PREFIX".to_string())
                        .or_insert(EnvOverride::Set(prefix));
                }
                Feature::Python => {
                    if let Some(libexec) = &self.settings.python_libexec {
                        let bin = libexec.join("bin").to_string_lossy().into_owned();
                        env.insert("PATH".to_string(), EnvOverride::PrependPath(bin));
                    }
                }
                _ => {}
            }
        }

        env
    }
}

/// Flags passed to configure regardless of features
pub fn fixed_flags(settings: &BuildSettings) -> Vec<String> {
    vec![
        format!("--prefix={}", settings.prefix.display()),
        format!("--mandir={}", settings.mandir().display()),
        "--enable-multibyte".to_string(),
        "--with-tlib=ncurses".to_string(),
        "--enable-cscope".to_string(),
        "--enable-terminal".to_string(),
        format!("--with-compiledby={}", settings.compiled_by),
        "--enable-gui=no".to_string(),
    ]
}

fn enabled_features(
    features: &FeatureSet,
    probe: &dyn DependencyProbe,
) -> Result<BTreeSet<Feature>> {
    let mut enabled = BTreeSet::new();

    for feature in Feature::all().iter().copied() {
        match features.request(feature) {
            RequestedState::Without => {
                debug!("{} disabled by request", feature);
            }
            RequestedState::With => {
                if !probe.available(feature) {
                    return Err(ConfigError::MissingDependency {
                        feature: feature.name().to_string(),
                    });
                }
                enabled.insert(feature);
            }
            RequestedState::Default => {
                if !feature.default_enabled() {
                    continue;
                }
                if probe.available(feature) {
                    enabled.insert(feature);
                } else {
                    debug!("{} skipped: dependency not available", feature);
                }
            }
        }
    }

    Ok(enabled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExclusivityRule, StaticProbe};
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn resolver() -> FlagResolver {
        FlagResolver::new(BuildSettings::new("/usr/local", "/usr/local/Cellar/vim/8.0.1500"))
    }

    #[test]
    fn test_default_flags() {
        let resolution = resolver()
            .resolve(&FeatureSet::new(), &StaticProbe::all_available())
            .unwrap();

        assert_eq!(
            resolution.config.flags(),
            &[
                "--enable-perlinterp",
                "--enable-rubyinterp",
                "--enable-pythoninterp",
                "--disable-nls",
                "--without-x",
                "--prefix=/usr/local",
                "--mandir=/usr/local/Cellar/vim/8.0.1500/share/man",
                "--enable-multibyte",
                "--with-tlib=ncurses",
                "--enable-cscope",
                "--enable-terminal",
                "--with-compiledby=vimbuild",
                "--enable-gui=no",
            ]
        );
        assert!(resolution.notices.is_empty());
    }

    #[test]
    fn test_luajit_alone() {
        let features = FeatureSet::new().with(Feature::Luajit);
        let config = resolver()
            .resolve(&features, &StaticProbe::all_available())
            .unwrap()
            .config;

        assert!(config.has_flag("--enable-luainterp"));
        assert!(config.has_flag("--with-luajit"));
        assert_eq!(
            config.env().get("LUA_PREFIX"),
            Some(&EnvOverride::Set("/usr/local".to_string()))
        );
    }

    #[test]
    fn test_default_feature_missing_dependency_is_skipped() {
        let probe = StaticProbe::all_available().missing(Feature::Ruby);
        let config = resolver().resolve(&FeatureSet::new(), &probe).unwrap().config;

        assert!(!config.is_enabled(Feature::Ruby));
        assert!(!config.has_flag("--enable-rubyinterp"));
    }

    #[test]
    fn test_optional_feature_not_probed_unless_requested() {
        let calls = AtomicUsize::new(0);
        let probe = |f: Feature| {
            assert!(f.default_enabled(), "probed {}", f);
            calls.fetch_add(1, Ordering::SeqCst);
            true
        };

        resolver().resolve(&FeatureSet::new(), &probe).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_refused_feature_not_probed() {
        let features = FeatureSet::new().without(Feature::Perl);
        let probe = |f: Feature| {
            assert_ne!(f, Feature::Perl);
            true
        };
        let config = resolver().resolve(&features, &probe).unwrap().config;
        assert!(!config.is_enabled(Feature::Perl));
    }

    #[test]
    fn test_undecided_rule_is_conflict() {
        let rules = RuleSet::new(vec![ExclusivityRule::undecided(
            [Feature::Perl, Feature::Ruby],
            "no",
        )]);
        let resolver = FlagResolver::with_rules(rules, BuildSettings::default());
        let err = resolver
            .resolve(&FeatureSet::new(), &StaticProbe::all_available())
            .unwrap_err();

        assert_matches!(err, ConfigError::ConfigConflict { features } if features == ["perl", "ruby"]);
    }

    #[test]
    fn test_winner_not_enabled_is_conflict() {
        let rules = RuleSet::new(vec![ExclusivityRule::new(
            [Feature::Tcl, Feature::Perl, Feature::Ruby],
            Feature::Tcl,
            "pick one",
        )]);
        let resolver = FlagResolver::with_rules(rules, BuildSettings::default());
        let err = resolver
            .resolve(&FeatureSet::new(), &StaticProbe::all_available())
            .unwrap_err();

        assert_matches!(err, ConfigError::ConfigConflict { .. });
    }

    #[test]
    fn test_rule_with_single_enabled_member_is_silent() {
        let rules = RuleSet::new(vec![ExclusivityRule::undecided(
            [Feature::Perl, Feature::Tcl],
            "no",
        )]);
        let resolver = FlagResolver::with_rules(rules, BuildSettings::default());
        let resolution = resolver
            .resolve(&FeatureSet::new(), &StaticProbe::all_available())
            .unwrap();
        assert!(resolution.notices.is_empty());
        assert!(resolution.config.is_enabled(Feature::Perl));
    }

    #[test]
    fn test_environment_overrides() {
        let settings = BuildSettings {
            python_libexec: Some("/usr/local/opt/python/libexec".into()),
            ..BuildSettings::new("/usr/local", "/usr/local")
        };
        let config = FlagResolver::new(settings)
            .resolve(&FeatureSet::new(), &StaticProbe::all_available())
            .unwrap()
            .config;

        let keys: Vec<_> = config.env().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["SDKROOT", "PYTHONPATH", "PATH"]);
        assert_eq!(
            config.env()["PATH"],
            EnvOverride::PrependPath("/usr/local/opt/python/libexec/bin".to_string())
        );
        assert_eq!(config.env()["SDKROOT"], EnvOverride::Unset);
    }

    #[test]
    fn test_no_path_override_when_python_dropped() {
        let settings = BuildSettings {
            python_libexec: Some("/usr/local/opt/python/libexec".into()),
            ..BuildSettings::default()
        };
        let features = FeatureSet::new().with(Feature::Python3);
        let config = FlagResolver::new(settings)
            .resolve(&features, &StaticProbe::all_available())
            .unwrap()
            .config;
        assert!(!config.env().contains_key("PATH"));
    }
}
