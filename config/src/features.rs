//! Optional build features and user requests
//!
//! Every optional capability of the Vim build is a [`Feature`]. A user request
//! for a feature is one of `with`, `without` or the default policy, collected
//! into a [`FeatureSet`]. The option syntax follows the build recipe
//! conventions:
//!
//! - `with-<feature>` requests the feature
//! - `without-<feature>` refuses the feature
//! - `override-system-vi` is a deprecated alias of `with-override-system-vi`

use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Options that are still accepted under an older spelling
const DEPRECATED_OPTIONS: &[(&str, &str)] = &[("override-system-vi", "with-override-system-vi")];

/// All optional features of the build, in their declared order.
///
/// The declared order is the order in which configure flags are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    /// Perl interpreter
    Perl,
    /// Ruby interpreter
    Ruby,
    /// Python 2 interpreter
    Python,
    /// Python 3 interpreter
    Python3,
    /// Lua interpreter
    Lua,
    /// LuaJIT as the Lua implementation
    Luajit,
    /// Tcl interpreter
    Tcl,
    /// National Language Support
    Gettext,
    /// X11 client/server mode
    ClientServer,
    /// Install a `vi` symlink to `vim`
    OverrideSystemVi,
}

/// Configure tokens a feature contributes in each state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagTemplate {
    /// Tokens emitted when the feature is enabled
    pub enabled: &'static [&'static str],
    /// Tokens emitted when the feature is disabled
    pub disabled: &'static [&'static str],
}

impl Feature {
    /// Get all features in declared order
    pub fn all() -> &'static [Feature] {
        &[
            Feature::Perl,
            Feature::Ruby,
            Feature::Python,
            Feature::Python3,
            Feature::Lua,
            Feature::Luajit,
            Feature::Tcl,
            Feature::Gettext,
            Feature::ClientServer,
            Feature::OverrideSystemVi,
        ]
    }

    /// Get the string name of the feature
    pub fn name(&self) -> &'static str {
        match self {
            Feature::Perl => "perl",
            Feature::Ruby => "ruby",
            Feature::Python => "python",
            Feature::Python3 => "python3",
            Feature::Lua => "lua",
            Feature::Luajit => "luajit",
            Feature::Tcl => "tcl",
            Feature::Gettext => "gettext",
            Feature::ClientServer => "client-server",
            Feature::OverrideSystemVi => "override-system-vi",
        }
    }

    /// Get description of the feature
    pub fn description(&self) -> &'static str {
        match self {
            Feature::Perl => "Build vim with perl support",
            Feature::Ruby => "Build vim with ruby support",
            Feature::Python => "Build vim with python (2) support",
            Feature::Python3 => "Build vim with python3 instead of python[2] support",
            Feature::Lua => "Build vim with lua support",
            Feature::Luajit => "Build vim with luajit as the lua implementation",
            Feature::Tcl => "Build vim with tcl support",
            Feature::Gettext => {
                "Build vim with National Language Support (translated messages, keymaps)"
            }
            Feature::ClientServer => "Enable client/server mode",
            Feature::OverrideSystemVi => "Override system vi",
        }
    }

    /// Parse a feature name string to Feature
    pub fn parse(s: &str) -> Option<Feature> {
        let s = s.trim().to_lowercase();
        Feature::all().iter().copied().find(|f| f.name() == s)
    }

    /// Whether the feature is built unless the user refuses it
    pub fn default_enabled(&self) -> bool {
        matches!(self, Feature::Perl | Feature::Ruby | Feature::Python)
    }

    /// Executables whose presence satisfies the feature's dependency.
    ///
    /// Any one of them is enough. An empty list means the feature has no
    /// external dependency.
    pub fn executables(&self) -> &'static [&'static str] {
        match self {
            Feature::Perl => &["perl"],
            Feature::Ruby => &["ruby"],
            Feature::Python => &["python2", "python"],
            Feature::Python3 => &["python3"],
            Feature::Lua => &["lua"],
            Feature::Luajit => &["luajit"],
            Feature::Tcl => &["tclsh"],
            Feature::Gettext => &["msgfmt"],
            Feature::ClientServer => &["xauth"],
            Feature::OverrideSystemVi => &[],
        }
    }

    /// Configure tokens for this feature.
    ///
    /// These strings must match the configure script's option syntax exactly.
    pub fn flag_template(&self) -> FlagTemplate {
        let (enabled, disabled): (&'static [&'static str], &'static [&'static str]) = match self {
            Feature::Perl => (&["--enable-perlinterp"], &[]),
            Feature::Ruby => (&["--enable-rubyinterp"], &[]),
            Feature::Python => (&["--enable-pythoninterp"], &[]),
            Feature::Python3 => (&["--enable-python3interp"], &[]),
            Feature::Lua => (&["--enable-luainterp"], &[]),
            Feature::Luajit => (&["--enable-luainterp", "--with-luajit"], &[]),
            Feature::Tcl => (&["--enable-tclinterp"], &[]),
            Feature::Gettext => (&[], &["--disable-nls"]),
            Feature::ClientServer => (&["--with-x"], &["--without-x"]),
            // Handled at install time
            Feature::OverrideSystemVi => (&[], &[]),
        };
        FlagTemplate { enabled, disabled }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Feature::parse(s).ok_or_else(|| ConfigError::UnknownFeature(s.trim().to_string()))
    }
}

/// What the user asked for a single feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestedState {
    /// Build the feature, failing if its dependency is missing
    With,
    /// Never build the feature
    Without,
    /// Follow the feature's default policy
    #[default]
    Default,
}

impl fmt::Display for RequestedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestedState::With => write!(f, "with"),
            RequestedState::Without => write!(f, "without"),
            RequestedState::Default => write!(f, "default"),
        }
    }
}

/// Requested state per feature.
///
/// Features that were never mentioned resolve to [`RequestedState::Default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, RequestedState>",
    into = "BTreeMap<String, RequestedState>"
)]
pub struct FeatureSet {
    requests: BTreeMap<Feature, RequestedState>,
}

impl FeatureSet {
    /// Create an empty feature set (everything at its default)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a feature set that requests exactly `enabled` and refuses the rest
    pub fn from_enabled<'a>(enabled: impl IntoIterator<Item = &'a Feature>) -> Self {
        let mut set = Self::new();
        for feature in Feature::all() {
            set.set(*feature, RequestedState::Without);
        }
        for feature in enabled {
            set.set(*feature, RequestedState::With);
        }
        set
    }

    /// Parse a list of recipe options (e.g. `with-lua`, `without-python`)
    pub fn parse_options<I, S>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for option in options {
            set.apply_option(option.as_ref())?;
        }
        Ok(set)
    }

    /// Apply a single recipe option; later options win
    pub fn apply_option(&mut self, option: &str) -> Result<()> {
        let option = option.trim().trim_start_matches("--");

        if let Some((_, canonical)) = DEPRECATED_OPTIONS.iter().find(|(old, _)| *old == option) {
            warn!("Option '{}' is deprecated, use '{}'", option, canonical);
            return self.apply_option(canonical);
        }

        let (state, name) = if let Some(name) = option.strip_prefix("without-") {
            (RequestedState::Without, name)
        } else if let Some(name) = option.strip_prefix("with-") {
            (RequestedState::With, name)
        } else {
            return Err(ConfigError::InvalidOption(option.to_string()));
        };

        let feature = name.parse::<Feature>()?;
        self.set(feature, state);
        Ok(())
    }

    /// Request a feature
    pub fn with(mut self, feature: Feature) -> Self {
        self.set(feature, RequestedState::With);
        self
    }

    /// Refuse a feature
    pub fn without(mut self, feature: Feature) -> Self {
        self.set(feature, RequestedState::Without);
        self
    }

    /// Set the requested state of a feature
    pub fn set(&mut self, feature: Feature, state: RequestedState) {
        if state == RequestedState::Default {
            self.requests.remove(&feature);
        } else {
            self.requests.insert(feature, state);
        }
    }

    /// Get the requested state of a feature
    pub fn request(&self, feature: Feature) -> RequestedState {
        self.requests.get(&feature).copied().unwrap_or_default()
    }

    /// Overlay another feature set on top of this one
    pub fn merge(&mut self, other: &FeatureSet) {
        for (feature, state) in &other.requests {
            self.set(*feature, *state);
        }
    }

    /// Iterate over explicit requests in declared order
    pub fn iter(&self) -> impl Iterator<Item = (Feature, RequestedState)> + '_ {
        self.requests.iter().map(|(f, s)| (*f, *s))
    }

    /// Whether no feature was explicitly requested
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl TryFrom<BTreeMap<String, RequestedState>> for FeatureSet {
    type Error = ConfigError;

    fn try_from(map: BTreeMap<String, RequestedState>) -> Result<Self> {
        let mut set = Self::new();
        for (name, state) in map {
            set.set(name.parse()?, state);
        }
        Ok(set)
    }
}

impl From<FeatureSet> for BTreeMap<String, RequestedState> {
    fn from(set: FeatureSet) -> Self {
        set.requests
            .into_iter()
            .map(|(f, s)| (f.name().to_string(), s))
            .collect()
    }
}
