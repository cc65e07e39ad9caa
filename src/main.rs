use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use mediabucket::cli::{MediaCommand, run_cli_with_settings};
use mediabucket::config::Settings;
use mediabucket::output::OutputFormatter;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mediabucket", version)]
#[command(about = "Sort images into year/month folders, copying recent files and moving old ones")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to .mediabucketrc.toml or ~/.config/mediabucket/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Fixed cutoff date (YYYY-MM-DD); files created before it are moved
    #[arg(long, global = true)]
    cutoff: Option<NaiveDate>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a JSON manifest of the planned operations without touching any file
    Plan {
        source: PathBuf,
        target: PathBuf,
        /// Manifest file name inside TARGET
        #[arg(long)]
        manifest_name: Option<String>,
    },
    /// Copy all images into TARGET/<year>/<month>
    Copy { source: PathBuf, target: PathBuf },
    /// Copy all images, then delete sources created before the cutoff
    CopyDelete { source: PathBuf, target: PathBuf },
    /// Replay a manifest written by `plan`
    Apply { manifest: PathBuf },
}

impl From<Commands> for MediaCommand {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Plan {
                source,
                target,
                manifest_name,
            } => MediaCommand::Plan {
                source,
                target,
                manifest_name,
            },
            Commands::Copy { source, target } => MediaCommand::Copy { source, target },
            Commands::CopyDelete { source, target } => MediaCommand::CopyDelete { source, target },
            Commands::Apply { manifest } => MediaCommand::Apply { manifest },
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut settings = match Settings::load(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            OutputFormatter::error(&format!("Error loading configuration: {}", e));
            return ExitCode::FAILURE;
        }
    };
    if let Some(cutoff) = args.cutoff {
        settings.plan.cutoff_date = Some(cutoff);
    }

    match run_cli_with_settings(&args.command.into(), &settings) {
        Ok(summary) => {
            tracing::debug!("{:?}", summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}
