//! Command execution for build steps
//!
//! A [`CommandRunner`] runs one external command with the resolved
//! environment overrides applied to that command only. The parent process
//! environment is never modified.

use crate::{CommandSpec, Error, Result};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};
use vimbuild_config::EnvOverrides;

/// Runs external build commands
pub trait CommandRunner: Send + Sync {
    /// Run `command`, failing if it cannot be started or exits unsuccessfully
    fn run(&self, command: &CommandSpec, env: &EnvOverrides) -> Result<()>;
}

/// Runs commands as child processes in a working directory
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    workdir: PathBuf,
    /// Capture output instead of inheriting the terminal
    quiet: bool,
}

impl ProcessRunner {
    /// Create a runner working in `workdir`
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            quiet: false,
        }
    }

    /// Capture command output instead of streaming it
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Working directory of spawned commands
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn command(&self, spec: &CommandSpec, env: &EnvOverrides) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args).current_dir(&self.workdir);

        for (key, change) in env {
            match change.apply(std::env::var_os(key)) {
                Some(value) => {
                    cmd.env(key, value);
                }
                None => {
                    cmd.env_remove(key);
                }
            }
        }
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }

        if self.quiet {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }
        cmd
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, spec: &CommandSpec, env: &EnvOverrides) -> Result<()> {
        info!("Running: {}", spec);

        let mut cmd = self.command(spec, env);
        let spawn_error = |source| Error::Spawn {
            program: spec.program.clone(),
            source,
        };

        let status = if self.quiet {
            let output = cmd.output().map_err(spawn_error)?;
            if !output.stderr.is_empty() {
                debug!("{}", String::from_utf8_lossy(&output.stderr));
            }
            output.status
        } else {
            cmd.status().map_err(spawn_error)?
        };

        if status.success() {
            Ok(())
        } else {
            Err(Error::CommandFailed {
                program: spec.program.clone(),
                command: spec.to_string(),
                code: status.code(),
            })
        }
    }
}

/// Records commands without running them
#[derive(Debug, Default)]
pub struct PretendRunner {
    commands: Mutex<Vec<(CommandSpec, EnvOverrides)>>,
}

impl PretendRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands seen so far, in order
    pub fn commands(&self) -> Vec<(CommandSpec, EnvOverrides)> {
        self.commands.lock().clone()
    }
}

impl CommandRunner for PretendRunner {
    fn run(&self, spec: &CommandSpec, env: &EnvOverrides) -> Result<()> {
        info!("Would run: {}", spec);
        self.commands.lock().push((spec.clone(), env.clone()));
        Ok(())
    }
}
