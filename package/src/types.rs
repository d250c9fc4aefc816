//! Core type definitions for the build pipeline

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Phase of the build a step belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildPhase {
    Configure,
    Compile,
    Install,
    Link,
}

impl BuildPhase {
    /// Get the phase name
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildPhase::Configure => "configure",
            BuildPhase::Compile => "compile",
            BuildPhase::Install => "install",
            BuildPhase::Link => "link",
        }
    }
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An external command with its own environment additions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Variables set for this command only, on top of the build overrides
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Create a command with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set a variable for this command
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{}={} ", key, value)?;
        }
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// One step of the build plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildStep {
    pub phase: BuildPhase,
    pub command: CommandSpec,
}

/// Outcome of a completed build
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    /// Configure flags the build used
    pub flags: Vec<String>,
    /// Advisories raised during resolution
    pub notices: Vec<String>,
    /// Steps that ran, in order
    pub steps: Vec<BuildStep>,
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display() {
        let cmd = CommandSpec::new("make")
            .arg("install")
            .args(["prefix=/opt/vim", "STRIP=/usr/bin/true"])
            .env("MAKEFLAGS", "-j1");
        assert_eq!(
            cmd.to_string(),
            "MAKEFLAGS=-j1 make install prefix=/opt/vim STRIP=/usr/bin/true"
        );
    }
}
