//! In-process artifact source for integration tests

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;
use vhd_autonotes::{ArtifactKind, ArtifactSource, DownloadOutput};

/// Writes the workspace file a real download would produce
#[derive(Default)]
pub struct RecordingSource {
    downloaded: Mutex<Vec<String>>,
    failing: HashSet<String>,
}

impl RecordingSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, artifact_name: &str) -> Self {
        self.failing.insert(artifact_name.to_string());
        self
    }

    /// Artifact names requested so far
    pub fn downloaded(&self) -> Vec<String> {
        self.downloaded.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl ArtifactSource for RecordingSource {
    async fn download(
        &self,
        _run_id: &str,
        dest_dir: &Path,
        artifact_name: &str,
    ) -> vhd_autonotes::Result<DownloadOutput> {
        self.downloaded
            .lock()
            .expect("lock poisoned")
            .push(artifact_name.to_string());

        if self.failing.contains(artifact_name) {
            return Ok(DownloadOutput::failed("exit status: 1", "artifact not found"));
        }

        let kind = ArtifactKind::ALL
            .into_iter()
            .find(|kind| artifact_name.starts_with(&kind.artifact_name("")))
            .expect("unexpected artifact name");
        tokio::fs::write(dest_dir.join(kind.workspace_file_name()), artifact_name).await?;
        Ok(DownloadOutput::succeeded(""))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
