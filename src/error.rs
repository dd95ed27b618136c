//! Error types for vhd-autonotes
//!
//! Two layers of errors are used:
//! - [`Error`] for crate-wide operations (configuration loading, tool discovery, I/O)
//! - [`FetchError`] for the failure of a single variant's fetch task, carrying the
//!   variant and the [`Stage`] that failed
//!
//! A `FetchError` never aborts sibling tasks; the coordinator collects them all.

use crate::types::{ArtifactKind, Stage};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for vhd-autonotes operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for vhd-autonotes
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "base_version_file")
        key: Option<String>,
    },

    /// External tool could not be executed (az, etc.)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A variant's fetch task failed
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),
}

impl Error {
    /// Build a [`Error::Config`] naming the offending key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

/// Failure of a single variant's fetch task
#[derive(Debug, Error)]
pub enum FetchError {
    /// The variant's output version could not be resolved
    #[error("cannot resolve version for {variant}: {reason}")]
    Configuration {
        /// The variant that was skipped
        variant: String,
        /// Why the version could not be resolved
        reason: String,
    },

    /// The temporary working directory could not be created
    #[error("failed to create temp working directory for {variant}: {reason}")]
    Workspace {
        /// The variant whose task failed
        variant: String,
        /// The underlying I/O error
        reason: String,
    },

    /// The output directory could not be created
    #[error("failed to create output directory {path} for {variant}: {reason}")]
    CreateDir {
        /// The variant whose task failed
        variant: String,
        /// The directory that could not be created
        path: PathBuf,
        /// The underlying I/O error
        reason: String,
    },

    /// The external download command failed or could not be run
    #[error("failed to download {kind} for {variant}, err: {reason}, output: {output}")]
    Download {
        /// The variant whose task failed
        variant: String,
        /// Which artifact was being downloaded
        kind: ArtifactKind,
        /// Exit status or execution error
        reason: String,
        /// Captured stdout and stderr of the command
        output: String,
    },

    /// A downloaded file could not be moved into the output layout
    #[error("failed to rename {kind} file {source_path} to {dest_path} for {variant}: {reason}")]
    Relocate {
        /// The variant whose task failed
        variant: String,
        /// Which artifact was being placed
        kind: ArtifactKind,
        /// The file inside the workspace
        source_path: PathBuf,
        /// The final output path
        dest_path: PathBuf,
        /// The underlying I/O error
        reason: String,
    },

    /// The task observed cancellation and abandoned its work
    #[error("fetch for {variant} cancelled before {stage}")]
    Cancelled {
        /// The variant whose task was abandoned
        variant: String,
        /// The stage the task was about to enter
        stage: Stage,
    },

    /// The task panicked or was aborted by the runtime
    #[error("fetch task for {variant} did not complete: {reason}")]
    TaskPanicked {
        /// The variant whose task was lost
        variant: String,
        /// The join error reported by the runtime
        reason: String,
    },
}

impl FetchError {
    /// The variant this failure belongs to
    pub fn variant(&self) -> &str {
        match self {
            FetchError::Configuration { variant, .. }
            | FetchError::Workspace { variant, .. }
            | FetchError::CreateDir { variant, .. }
            | FetchError::Download { variant, .. }
            | FetchError::Relocate { variant, .. }
            | FetchError::Cancelled { variant, .. }
            | FetchError::TaskPanicked { variant, .. } => variant,
        }
    }

    /// The stage in which the task failed
    pub fn stage(&self) -> Stage {
        match self {
            FetchError::Configuration { .. } => Stage::ResolveVersion,
            FetchError::Workspace { .. } => Stage::Workspace,
            FetchError::CreateDir { .. } => Stage::PrepareOutput,
            FetchError::Download { kind, .. } => Stage::Fetch(*kind),
            FetchError::Relocate { kind, .. } => Stage::Place(*kind),
            FetchError::Cancelled { stage, .. } => *stage,
            FetchError::TaskPanicked { .. } => Stage::Join,
        }
    }

    /// Whether this failure was caused by cancellation rather than a real error
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled { .. })
    }
}
