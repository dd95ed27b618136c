//! Traits and types for artifact downloads

use async_trait::async_trait;
use std::path::Path;

/// Result of one artifact download attempt
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutput {
    /// Whether the tool reported success
    pub success: bool,
    /// Human-readable exit status (e.g. "exit status: 1")
    pub status: String,
    /// Captured stdout followed by stderr
    pub output: String,
}

impl DownloadOutput {
    /// A successful download with the given captured output
    pub fn succeeded(output: impl Into<String>) -> Self {
        Self {
            success: true,
            status: "exit status: 0".to_string(),
            output: output.into(),
        }
    }

    /// A failed download with the given status and captured output
    pub fn failed(status: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            success: false,
            status: status.into(),
            output: output.into(),
        }
    }
}

/// Downloads named artifacts of a pipeline run
///
/// Implementations write the artifact's files into `dest_dir`. The call is
/// awaited to completion; callers only check for cancellation between calls.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Download `artifact_name` from pipeline run `run_id` into `dest_dir`
    ///
    /// # Errors
    ///
    /// Returns an error only when the download could not be attempted at all
    /// (e.g. the external binary cannot be executed). A download that ran and
    /// failed is reported as `Ok` with `success == false`.
    async fn download(
        &self,
        run_id: &str,
        dest_dir: &Path,
        artifact_name: &str,
    ) -> crate::Result<DownloadOutput>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
