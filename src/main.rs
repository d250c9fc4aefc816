//! vimbuild CLI
//!
//! Resolves the optional features of a Vim build into configure flags and
//! drives the configure, make and install steps.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::{DependencyProbe, EnvOverride, Feature, RecipeConfig, Resolution, StaticProbe};
use package::{Builder, CommandRunner, PathProbe, PretendRunner, ProcessRunner};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "vimbuild",
    about = "Build Vim from source with a resolved, conflict-free feature set",
    version,
    author
)]
struct Cli {
    /// Recipe configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Pretend mode (print build steps without running them)
    #[arg(short, long, global = true)]
    pretend: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve options into configure flags
    Resolve(ResolveArgs),
    /// Resolve options and build Vim
    Build(BuildArgs),
    /// List optional features
    Features,
}

#[derive(Args)]
struct ResolveArgs {
    /// Build options (with-<feature>, without-<feature>, optionally prefixed
    /// with --); give other flags before these
    #[arg(allow_hyphen_values = true)]
    options: Vec<String>,

    /// Print the resolution as JSON
    #[arg(long)]
    json: bool,

    /// Treat every dependency as installed
    #[arg(long)]
    assume_available: bool,
}

#[derive(Args)]
struct BuildArgs {
    /// Build options (with-<feature>, without-<feature>, optionally prefixed
    /// with --); give other flags before these
    #[arg(allow_hyphen_values = true)]
    options: Vec<String>,

    /// Unpacked Vim source tree
    #[arg(long)]
    source_dir: PathBuf,

    /// Parallel make jobs
    #[arg(short, long)]
    jobs: Option<usize>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    // Load configuration
    let recipe = match &cli.config {
        Some(path) => RecipeConfig::load_from(path),
        None => RecipeConfig::load(),
    };
    let recipe = match recipe {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match &cli.command {
        Commands::Resolve(args) => cmd_resolve(recipe, args),
        Commands::Build(args) => cmd_build(recipe, args, &cli),
        Commands::Features => cmd_features(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Apply command line options on top of the recipe's feature requests
fn apply_options(recipe: &mut RecipeConfig, options: &[String]) -> Result<()> {
    for option in options {
        recipe.features.apply_option(option)?;
    }
    Ok(())
}

fn cmd_resolve(mut recipe: RecipeConfig, args: &ResolveArgs) -> Result<()> {
    apply_options(&mut recipe, &args.options)?;

    let probe: Box<dyn DependencyProbe> = if args.assume_available {
        Box::new(StaticProbe::all_available())
    } else {
        Box::new(PathProbe::new())
    };
    let runner = PretendRunner::new();
    let resolution = Builder::new(probe.as_ref(), &runner).resolve(&recipe)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        print_resolution(&resolution);
    }
    Ok(())
}

fn print_resolution(resolution: &Resolution) {
    let config = &resolution.config;

    let enabled: Vec<_> = config.enabled().iter().map(|f| f.name()).collect();
    println!("Features: {}", enabled.join(" "));

    println!("Flags:");
    for flag in config.flags() {
        println!("  {}", flag);
    }

    if !config.env().is_empty() {
        println!("Environment:");
        for (key, change) in config.env() {
            match change {
                EnvOverride::Set(value) => println!("  {}={}", key, value),
                EnvOverride::PrependPath(dir) => println!("  {}={}:${}", key, dir, key),
                EnvOverride::Unset => println!("  unset {}", key),
            }
        }
    }

    for notice in &resolution.notices {
        println!("Note: {}", notice.message);
    }
}

fn cmd_build(mut recipe: RecipeConfig, args: &BuildArgs, cli: &Cli) -> Result<()> {
    apply_options(&mut recipe, &args.options)?;
    if let Some(jobs) = args.jobs {
        recipe.settings.jobs = jobs;
    }

    if !args.source_dir.is_dir() {
        return Err(package::Error::SourceNotFound(args.source_dir.display().to_string()).into());
    }

    let probe = PathProbe::new();
    let pretend = PretendRunner::new();
    let process = ProcessRunner::new(&args.source_dir).quiet(cli.quiet);
    let runner: &dyn CommandRunner = if cli.pretend { &pretend } else { &process };

    let report = Builder::new(&probe, runner)
        .build(&recipe)
        .with_context(|| format!("building vim in {}", args.source_dir.display()))?;

    if cli.pretend {
        for (command, _) in pretend.commands() {
            println!("{}", command);
        }
        return Ok(());
    }

    info!(
        "Built vim with {} flags and {} notices in {:.1}s",
        report.flags.len(),
        report.notices.len(),
        report.duration.as_secs_f64()
    );
    if !cli.quiet {
        println!(
            ">>> Installed vim to {}",
            recipe.settings.install_prefix.display()
        );
    }
    Ok(())
}

fn cmd_features() -> Result<()> {
    for feature in Feature::all() {
        println!(
            "{:<20} {:<4} {}",
            feature.name(),
            if feature.default_enabled() { "on" } else { "off" },
            feature.description()
        );
    }
    Ok(())
}
