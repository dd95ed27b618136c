//! Shared test helpers: an in-process artifact source
//!
//! Only compiled under `cfg(test)`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::artifacts::{ArtifactSource, DownloadOutput};
use crate::types::ArtifactKind;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;
use tokio_util::sync::CancellationToken;

/// One recorded call to [`FakeArtifactSource::download`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DownloadCall {
    pub run_id: String,
    pub dest_dir: PathBuf,
    pub artifact_name: String,
}

/// Artifact source that writes the expected workspace file instead of downloading
///
/// The written file contains the artifact name so tests can check which
/// artifact ended up where.
#[derive(Default)]
pub(crate) struct FakeArtifactSource {
    calls: Mutex<Vec<DownloadCall>>,
    failing: HashSet<String>,
    unrunnable: HashSet<String>,
    missing_file: HashSet<String>,
    barrier: Option<Arc<Barrier>>,
    cancel_after: Option<(String, CancellationToken)>,
}

impl FakeArtifactSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Report a failed exit for this artifact
    pub(crate) fn failing(mut self, artifact_name: &str) -> Self {
        self.failing.insert(artifact_name.to_string());
        self
    }

    /// Return an execution error for this artifact
    pub(crate) fn unrunnable(mut self, artifact_name: &str) -> Self {
        self.unrunnable.insert(artifact_name.to_string());
        self
    }

    /// Report success for this artifact without writing its file
    pub(crate) fn missing_file(mut self, artifact_name: &str) -> Self {
        self.missing_file.insert(artifact_name.to_string());
        self
    }

    /// Make every download wait until `parties` downloads are in flight at once
    pub(crate) fn with_barrier(mut self, parties: usize) -> Self {
        self.barrier = Some(Arc::new(Barrier::new(parties)));
        self
    }

    /// Cancel `token` once this artifact has been downloaded
    pub(crate) fn cancel_after(mut self, artifact_name: &str, token: CancellationToken) -> Self {
        self.cancel_after = Some((artifact_name.to_string(), token));
        self
    }

    pub(crate) fn calls(&self) -> Vec<DownloadCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn artifact_names(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|call| call.artifact_name)
            .collect()
    }

    pub(crate) fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

/// Workspace file name the real tool would produce for `artifact_name`
pub(crate) fn workspace_file_for(artifact_name: &str) -> Option<&'static str> {
    ArtifactKind::ALL
        .into_iter()
        .find(|kind| artifact_name.starts_with(&kind.artifact_name("")))
        .map(ArtifactKind::workspace_file_name)
}

#[async_trait]
impl ArtifactSource for FakeArtifactSource {
    async fn download(
        &self,
        run_id: &str,
        dest_dir: &Path,
        artifact_name: &str,
    ) -> crate::Result<DownloadOutput> {
        self.calls.lock().unwrap().push(DownloadCall {
            run_id: run_id.to_string(),
            dest_dir: dest_dir.to_path_buf(),
            artifact_name: artifact_name.to_string(),
        });

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }

        if self.unrunnable.contains(artifact_name) {
            return Err(crate::Error::ExternalTool(
                "Failed to execute az: No such file or directory".into(),
            ));
        }

        if self.failing.contains(artifact_name) {
            return Ok(DownloadOutput::failed(
                "exit status: 1",
                format!("ERROR: artifact {artifact_name} not found"),
            ));
        }

        if !self.missing_file.contains(artifact_name) {
            let file_name = workspace_file_for(artifact_name).unwrap_or("artifact.bin");
            tokio::fs::write(dest_dir.join(file_name), artifact_name).await?;
        }

        if let Some((name, token)) = &self.cancel_after {
            if name == artifact_name {
                token.cancel();
            }
        }

        Ok(DownloadOutput::succeeded(format!("downloaded {artifact_name}")))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
