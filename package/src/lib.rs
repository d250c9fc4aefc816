//! vimbuild build pipeline
//!
//! Drives the external toolchain for a resolved Vim configuration.
//!
//! # Architecture
//!
//! - **Probe**: [`PathProbe`] checks dependency executables on PATH
//! - **Plan**: [`BuildPlan`] lists the configure, compile, install and link steps
//! - **Executor**: [`CommandRunner`] implementations run or record the steps
//!
//! Resolution always happens before the first external command, so a
//! missing dependency or a rule conflict never leaves a half-configured tree.

pub mod error;
pub mod executor;
pub mod plan;
pub mod probe;
pub mod types;

pub use error::{Error, Result};
pub use executor::{CommandRunner, PretendRunner, ProcessRunner};
pub use plan::BuildPlan;
pub use probe::PathProbe;
pub use types::*;

use std::time::Instant;
use tracing::info;
use vimbuild_config::{DependencyProbe, FlagResolver, RecipeConfig, Resolution, RuleSet};

/// Runs complete builds against a probe and a command runner
pub struct Builder<'a> {
    rules: RuleSet,
    probe: &'a dyn DependencyProbe,
    runner: &'a dyn CommandRunner,
}

impl<'a> Builder<'a> {
    /// Create a builder using the built-in rule table
    pub fn new(probe: &'a dyn DependencyProbe, runner: &'a dyn CommandRunner) -> Self {
        Self {
            rules: RuleSet::default(),
            probe,
            runner,
        }
    }

    /// Create a builder with a custom rule table.
    ///
    /// Malformed tables are rejected with `ConfigError::InvalidRule`.
    pub fn with_rules(
        rules: RuleSet,
        probe: &'a dyn DependencyProbe,
        runner: &'a dyn CommandRunner,
    ) -> Result<Self> {
        rules.validate()?;
        Ok(Self {
            rules,
            probe,
            runner,
        })
    }

    /// Resolve the recipe's features without running anything
    pub fn resolve(&self, recipe: &RecipeConfig) -> Result<Resolution> {
        let resolver = FlagResolver::with_rules(self.rules.clone(), recipe.settings.clone());
        Ok(resolver.resolve(&recipe.features, self.probe)?)
    }

    /// Resolve, plan and run the build.
    ///
    /// The first failing step aborts the build with that step's error.
    pub fn build(&self, recipe: &RecipeConfig) -> Result<BuildReport> {
        let start = Instant::now();

        let resolution = self.resolve(recipe)?;
        let plan = BuildPlan::from_resolved(&resolution.config, &recipe.settings);
        info!("Building vim in {} steps", plan.len());

        for step in plan.steps() {
            info!(">>> {}", step.phase);
            self.runner.run(&step.command, resolution.config.env())?;
        }

        Ok(BuildReport {
            flags: resolution.config.flags().to_vec(),
            notices: resolution.notices.into_iter().map(|n| n.message).collect(),
            steps: plan.steps().to_vec(),
            duration: start.elapsed(),
        })
    }
}
