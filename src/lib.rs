//! # vhd-autonotes
//!
//! Fetches the release notes and image lists that a VHD build publishes per
//! variant and files them into a versioned release notes tree.
//!
//! ## Overview
//!
//! - **Version resolution** - each variant's output version is its base image
//!   version with the trailing build date replaced
//! - **Variant filtering** - include/ignore lists select which variants to fetch
//! - **Concurrent fetching** - one task per variant, each in its own temporary
//!   workspace, with every failure collected rather than stopping the run
//! - **Pluggable downloads** - the `az` CLI by default, anything implementing
//!   [`ArtifactSource`] otherwise
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use vhd_autonotes::{Config, cancel_on_signal};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         run_id: "76289801".to_string(),
//!         include: "2019-containerd".to_string(),
//!         ..Default::default()
//!     };
//!     let source = Arc::new(config.tools.artifact_source()?);
//!
//!     let cancel = CancellationToken::new();
//!     tokio::spawn(cancel_on_signal(cancel.clone()));
//!
//!     for failure in vhd_autonotes::run(config, source, cancel).await? {
//!         eprintln!("{failure}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Artifact download capability
pub mod artifacts;
/// Configuration types
pub mod config;
/// Fan-out/fan-in over selected variants
pub mod coordinator;
/// Error types
pub mod error;
/// Single-variant fetch task
pub mod fetch_task;
/// Variant selection
pub mod filter;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;
/// Base versions and version resolution
pub mod versions;

#[cfg(test)]
pub(crate) mod test_helpers;

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

// Re-export commonly used types
pub use artifacts::{ArtifactSource, AzPipelinesCli, DownloadOutput};
pub use config::{Config, ToolsConfig, VariantConfig};
pub use coordinator::Coordinator;
pub use error::{Error, FetchError, Result};
pub use fetch_task::{FetchRequest, FetchTask, fetch_variant};
pub use filter::{Selection, select_variants};
pub use types::{ArtifactKind, FetchOutcome, PlacedArtifacts, Stage, TaskState};
pub use versions::{BaseVersions, resolve_version};

/// Validate `config`, load base versions and fetch every selected variant
///
/// Returns the failures of the individual variants; an empty vector means every
/// selected variant was fetched. Configuration problems that affect the whole
/// run (invalid settings, unreadable base version file) are returned as `Err`
/// before any task is launched.
pub async fn run(
    config: Config,
    source: Arc<dyn ArtifactSource>,
    cancel: CancellationToken,
) -> Result<Vec<FetchError>> {
    config.validate()?;
    let versions = BaseVersions::load(&config.base_version_file, &config.variants).await?;

    let coordinator = Coordinator::new(Arc::new(config), Arc::new(versions), source);
    Ok(coordinator.run(cancel).await)
}

/// Cancel `token` when a termination signal arrives
///
/// On Unix both SIGTERM and SIGINT cancel the run; elsewhere only Ctrl+C does.
/// If the signal handlers cannot be installed, Ctrl+C is the fallback. The
/// future also returns once `token` is cancelled by someone else.
///
/// Running tasks stop at their next checkpoint and report a cancellation failure.
pub async fn cancel_on_signal(token: CancellationToken) {
    #[cfg(unix)]
    let received = async {
        use tokio::signal::unix::{SignalKind, signal};

        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => tokio::select! {
                _ = sigterm.recv() => "SIGTERM",
                _ = sigint.recv() => "SIGINT",
            },
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "signal handlers unavailable, listening for Ctrl+C");
                ctrl_c().await
            }
        }
    };
    #[cfg(not(unix))]
    let received = ctrl_c();

    tokio::select! {
        signal = received => {
            tracing::warn!(signal, "cancelling outstanding fetch tasks");
            token.cancel();
        }
        _ = token.cancelled() => {}
    }
}

async fn ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for Ctrl+C, signal cancellation disabled");
        std::future::pending::<()>().await;
    }
    "Ctrl+C"
}
