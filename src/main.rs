//! autonotes CLI entry point.
//!
//! Downloads VHD release notes and image lists for every selected variant of a
//! pipeline run.
//!
//! ```text
//! # download ONLY 2019-containerd release notes from this run ID
//! autonotes --build 76289801 --include 2019-containerd
//!
//! # download everything EXCEPT 2022-containerd-gen2 release notes
//! autonotes --build 76289801 --ignore 2022-containerd-gen2
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use vhd_autonotes::{Config, FetchError, Result, cancel_on_signal};

/// Autogenerate release notes for AKS VHD releases.
#[derive(Parser, Debug)]
#[command(name = "autonotes")]
#[command(version)]
struct Cli {
    /// JSON configuration file; flags below override its values.
    #[arg(long, env = "AUTONOTES_CONFIG")]
    config: Option<PathBuf>,

    /// Run ID of the VHD build to download artifacts from.
    #[arg(long)]
    build: Option<String>,

    /// Only include this comma-separated list of variants.
    #[arg(long)]
    include: Option<String>,

    /// Ignore release notes for this comma-separated list of variants.
    #[arg(long)]
    ignore: Option<String>,

    /// Output path to the root of the release notes tree.
    #[arg(long)]
    path: Option<PathBuf>,

    /// Date of the VHD build in YYMMDD format (default: today).
    #[arg(long)]
    date: Option<String>,

    /// File holding the base image versions.
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Directory to create per-variant workspaces in (default: system temp dir).
    #[arg(long)]
    workspace: Option<PathBuf>,

    /// Path to the az binary (default: search PATH).
    #[arg(long)]
    az_path: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

impl Cli {
    /// Load the config file, if any, and apply the flags on top of it
    async fn into_config(self) -> Result<Config> {
        let config = match &self.config {
            Some(path) => Config::from_json_file(path).await?,
            None => Config::default(),
        };
        Ok(self.apply(config))
    }

    /// Override `config` with every flag that was given
    fn apply(self, mut config: Config) -> Config {
        if let Some(build) = self.build {
            config.run_id = build;
        }
        if let Some(include) = self.include {
            config.include = include;
        }
        if let Some(ignore) = self.ignore {
            config.ignore = ignore;
        }
        if let Some(path) = self.path {
            config.output_root = path;
        }
        if let Some(date) = self.date {
            config.build_date = date;
        }
        if let Some(env_file) = self.env_file {
            config.base_version_file = env_file;
        }
        if let Some(workspace) = self.workspace {
            config.workspace_root = Some(workspace);
        }
        if let Some(az_path) = self.az_path {
            config.tools.az_path = Some(az_path);
        }
        config
    }
}

/// Build the config and source, then fetch every selected variant
///
/// Startup problems (unreadable config file, no az binary, invalid settings)
/// come back as `Err` before any fetch task is launched.
async fn execute(cli: Cli, cancel: CancellationToken) -> Result<Vec<FetchError>> {
    let config = cli.into_config().await?;
    let source = Arc::new(config.tools.artifact_source()?);
    vhd_autonotes::run(config, source, cancel).await
}

/// Print the outcome of a run and map it to the process exit status
///
/// # Arguments
///
/// * `result` - What [`execute`] returned
/// * `out` - Receives one line per failed variant
/// * `err` - Receives a startup error, if there was one
///
/// # Returns
///
/// `0` when every selected variant was fetched, `1` otherwise.
fn report(result: &Result<Vec<FetchError>>, out: &mut impl Write, err: &mut impl Write) -> u8 {
    match result {
        Ok(failures) if failures.is_empty() => 0,
        Ok(failures) => {
            for failure in failures {
                writeln!(out, "{failure}").ok();
            }
            1
        }
        Err(e) => {
            writeln!(err, "{e}").ok();
            1
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --log-level CLI arg > default "info"
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let result = execute(cli, cancel).await;
    let status = report(
        &result,
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    );
    ExitCode::from(status)
}
