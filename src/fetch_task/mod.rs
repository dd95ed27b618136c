//! Fetch task: retrieve and place one variant's artifacts.
//!
//! A task owns a private temporary workspace for its whole lifetime. It downloads
//! the release notes, moves them into the output tree, then does the same for
//! the image list. The first failure stops the task. The workspace is removed
//! on every exit path because it is a [`TempDir`] dropped when the task returns.
//!
//! Cancellation is checked before the workspace is created and before each
//! download. A download already in progress is allowed to finish.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use crate::artifacts::ArtifactSource;
use crate::error::FetchError;
use crate::types::{ArtifactKind, FetchOutcome, PlacedArtifacts, Stage, TaskState};
use crate::utils::move_file;

/// Prefix of every per-task workspace directory
const WORKSPACE_PREFIX: &str = "releasenotes";

/// Everything a fetch task needs to know about its variant
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    /// Variant id, used in artifact names
    pub variant: String,
    /// Output directory relative to `output_root`
    pub subpath: PathBuf,
    /// Pipeline run to download from
    pub run_id: String,
    /// Resolved output version
    pub version: String,
    /// Root of the output tree
    pub output_root: PathBuf,
    /// Parent directory for the workspace (None = system temp dir)
    pub workspace_root: Option<PathBuf>,
}

impl FetchRequest {
    /// `<output_root>/<subpath>`
    pub fn output_dir(&self) -> PathBuf {
        self.output_root.join(&self.subpath)
    }

    /// Final location of `kind` in the output tree
    pub fn output_path(&self, kind: ArtifactKind) -> PathBuf {
        self.output_dir().join(kind.output_file_name(&self.version))
    }
}

/// A single variant's fetch, driven through [`TaskState`]
pub struct FetchTask {
    request: FetchRequest,
    source: Arc<dyn ArtifactSource>,
    cancel: CancellationToken,
    state: TaskState,
}

impl FetchTask {
    /// Create a task in the `Created` state
    pub fn new(
        request: FetchRequest,
        source: Arc<dyn ArtifactSource>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            request,
            source,
            cancel,
            state: TaskState::Created,
        }
    }

    /// Current state of the task
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Run the task to completion, producing exactly one outcome
    ///
    /// Afterwards the task is in a terminal state.
    pub async fn run(&mut self) -> FetchOutcome {
        let outcome = self.execute().await;
        match &outcome {
            Ok(placed) => {
                self.transition(TaskState::Succeeded);
                tracing::info!(
                    variant = %self.request.variant,
                    version = %placed.version,
                    "release notes placed"
                );
            }
            Err(e) => {
                self.transition(TaskState::Failed(e.stage()));
                if e.is_cancelled() {
                    tracing::warn!(variant = %self.request.variant, "fetch cancelled");
                } else {
                    tracing::warn!(variant = %self.request.variant, error = %e, "fetch failed");
                }
            }
        }
        outcome
    }

    async fn execute(&mut self) -> FetchOutcome {
        self.checkpoint(Stage::Workspace)?;
        let workspace = self.acquire_workspace()?;
        self.transition(TaskState::WorkspaceAcquired);

        self.prepare_output_dir().await?;

        for kind in ArtifactKind::ALL {
            self.checkpoint(Stage::Fetch(kind))?;
            self.fetch(kind, workspace.path()).await?;
            self.transition(TaskState::fetched(kind));

            self.place(kind, workspace.path()).await?;
            self.transition(TaskState::placed(kind));
        }

        let workspace_path = workspace.path().to_path_buf();
        if let Err(e) = workspace.close() {
            tracing::warn!(
                variant = %self.request.variant,
                path = ?workspace_path,
                error = %e,
                "failed to remove workspace"
            );
        }

        Ok(PlacedArtifacts {
            variant: self.request.variant.clone(),
            version: self.request.version.clone(),
            notes_path: self.request.output_path(ArtifactKind::Notes),
            image_list_path: self.request.output_path(ArtifactKind::ImageList),
        })
    }

    fn transition(&mut self, next: TaskState) {
        tracing::debug!(
            variant = %self.request.variant,
            from = ?self.state,
            to = ?next,
            "fetch task transition"
        );
        self.state = next;
    }

    fn checkpoint(&self, stage: Stage) -> Result<(), FetchError> {
        if self.cancel.is_cancelled() {
            return Err(FetchError::Cancelled {
                variant: self.request.variant.clone(),
                stage,
            });
        }
        Ok(())
    }

    fn acquire_workspace(&self) -> Result<TempDir, FetchError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let workspace = match &self.request.workspace_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| FetchError::Workspace {
            variant: self.request.variant.clone(),
            reason: e.to_string(),
        })?;

        tracing::debug!(
            variant = %self.request.variant,
            path = ?workspace.path(),
            "workspace acquired"
        );
        Ok(workspace)
    }

    async fn prepare_output_dir(&self) -> Result<(), FetchError> {
        let output_dir = self.request.output_dir();
        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|e| FetchError::CreateDir {
                variant: self.request.variant.clone(),
                path: output_dir,
                reason: e.to_string(),
            })
    }

    async fn fetch(&self, kind: ArtifactKind, workspace: &Path) -> Result<(), FetchError> {
        let artifact_name = kind.artifact_name(&self.request.variant);
        tracing::info!(
            variant = %self.request.variant,
            run_id = %self.request.run_id,
            artifact = %artifact_name,
            source = self.source.name(),
            "downloading {}",
            kind
        );

        let download_error = |reason: String, output: String| FetchError::Download {
            variant: self.request.variant.clone(),
            kind,
            reason,
            output,
        };

        let result = self
            .source
            .download(&self.request.run_id, workspace, &artifact_name)
            .await
            .map_err(|e| download_error(e.to_string(), String::new()))?;

        if !result.success {
            return Err(download_error(result.status, result.output));
        }
        Ok(())
    }

    async fn place(&self, kind: ArtifactKind, workspace: &Path) -> Result<(), FetchError> {
        let source_path = workspace.join(kind.workspace_file_name());
        let dest_path = self.request.output_path(kind);

        if let Err(e) = move_file(&source_path, &dest_path).await {
            return Err(FetchError::Relocate {
                variant: self.request.variant.clone(),
                kind,
                source_path,
                dest_path,
                reason: e.to_string(),
            });
        }

        tracing::debug!(
            variant = %self.request.variant,
            path = ?dest_path,
            "placed {}",
            kind
        );
        Ok(())
    }
}

/// Fetch one variant's artifacts; shorthand for [`FetchTask::run`]
///
/// # Arguments
///
/// * `request` - Variant, run id, resolved version and output location
/// * `source` - Capability that downloads a named artifact
/// * `cancel` - Checked before the workspace is created and before each download
///
/// # Returns
///
/// The placed file paths, or the first failure together with its stage
pub async fn fetch_variant(
    request: FetchRequest,
    source: Arc<dyn ArtifactSource>,
    cancel: CancellationToken,
) -> FetchOutcome {
    let mut task = FetchTask::new(request, source, cancel);
    task.run().await
}
