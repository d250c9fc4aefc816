//! Ordered external steps of a build
//!
//! The plan is derived from a resolved configuration and never changes the
//! flags it was given. Steps depend on each other's filesystem output, so they
//! run strictly in order.

use crate::{BuildPhase, BuildStep, CommandSpec};
use serde::Serialize;
use std::path::PathBuf;
use vimbuild_config::{BuildSettings, Feature, ResolvedConfig};

/// The steps of one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
    steps: Vec<BuildStep>,
}

impl BuildPlan {
    /// Plan the build for a resolved configuration
    pub fn from_resolved(config: &ResolvedConfig, settings: &BuildSettings) -> Self {
        let mut steps = Vec::new();

        steps.push(BuildStep {
            phase: BuildPhase::Configure,
            command: CommandSpec::new("./configure").args(config.flags().iter().cloned()),
        });

        let mut make = CommandSpec::new("make");
        if settings.jobs > 1 {
            make = make.arg(format!("-j{}", settings.jobs));
        }
        steps.push(BuildStep {
            phase: BuildPhase::Compile,
            command: make,
        });

        // Parallel install can miss symlinks, and stripping breaks binaries
        // that statically link an interpreter.
        steps.push(BuildStep {
            phase: BuildPhase::Install,
            command: CommandSpec::new("make")
                .arg("install")
                .arg(format!("prefix={}", settings.install_prefix.display()))
                .arg(format!("STRIP={}", no_op_strip().display()))
                .env("MAKEFLAGS", "-j1"),
        });

        if config.is_enabled(Feature::OverrideSystemVi) {
            steps.push(BuildStep {
                phase: BuildPhase::Link,
                command: CommandSpec::new("ln").args([
                    "-sf".to_string(),
                    "vim".to_string(),
                    settings.bin_dir().join("vi").display().to_string(),
                ]),
            });
        }

        Self { steps }
    }

    /// Steps in execution order
    pub fn steps(&self) -> &[BuildStep] {
        &self.steps
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the plan is empty
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Program passed as STRIP so that `make install` leaves binaries untouched
fn no_op_strip() -> PathBuf {
    which::which("true").unwrap_or_else(|_| PathBuf::from("true"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vimbuild_config::{FeatureSet, FlagResolver, StaticProbe};

    fn plan_for(features: FeatureSet, jobs: usize) -> BuildPlan {
        let settings = BuildSettings {
            jobs,
            ..BuildSettings::new("/usr/local", "/usr/local/Cellar/vim/8.0.1500")
        };
        let config = FlagResolver::new(settings.clone())
            .resolve(&features, &StaticProbe::all_available())
            .unwrap()
            .config;
        BuildPlan::from_resolved(&config, &settings)
    }

    #[test]
    fn test_default_plan() {
        let plan = plan_for(FeatureSet::new(), 1);
        let phases: Vec<_> = plan.steps().iter().map(|s| s.phase).collect();
        assert_eq!(
            phases,
            vec![BuildPhase::Configure, BuildPhase::Compile, BuildPhase::Install]
        );

        let make = &plan.steps()[1].command;
        assert_eq!(make.program, "make");
        assert!(make.args.is_empty());
    }

    #[test]
    fn test_configure_gets_resolved_flags() {
        let plan = plan_for(FeatureSet::new().with(Feature::Tcl), 1);
        let configure = &plan.steps()[0].command;
        assert_eq!(configure.program, "./configure");
        assert!(configure.args.contains(&"--enable-tclinterp".to_string()));
        assert!(configure.args.contains(&"--prefix=/usr/local".to_string()));
    }

    #[test]
    fn test_parallel_compile_serial_install() {
        let plan = plan_for(FeatureSet::new(), 8);
        assert_eq!(plan.steps()[1].command.args, vec!["-j8".to_string()]);

        let install = &plan.steps()[2].command;
        assert_eq!(install.args[0], "install");
        assert_eq!(install.args[1], "prefix=/usr/local/Cellar/vim/8.0.1500");
        assert!(install.args[2].starts_with("STRIP="));
        assert_eq!(install.env, vec![("MAKEFLAGS".to_string(), "-j1".to_string())]);
    }

    #[test]
    fn test_override_system_vi_links() {
        let plan = plan_for(FeatureSet::new().with(Feature::OverrideSystemVi), 1);
        assert_eq!(plan.len(), 4);

        let link = &plan.steps()[3];
        assert_eq!(link.phase, BuildPhase::Link);
        assert_eq!(
            link.command.args,
            vec!["-sf", "vim", "/usr/local/Cellar/vim/8.0.1500/bin/vi"]
        );
    }
}
