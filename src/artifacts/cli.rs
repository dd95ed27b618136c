//! Artifact downloads through the Azure CLI

use super::traits::{ArtifactSource, DownloadOutput};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Artifact source backed by `az pipelines runs artifact download`
///
/// Requires the `azure-devops` extension and a logged-in `az` session with the
/// default organization and project configured.
///
/// # Examples
///
/// ```no_run
/// use vhd_autonotes::artifacts::AzPipelinesCli;
/// use std::path::PathBuf;
///
/// // Explicit path
/// let az = AzPipelinesCli::new(PathBuf::from("/usr/bin/az"));
///
/// // Or auto-discover from PATH
/// let az = AzPipelinesCli::from_path().expect("az not found in PATH");
/// ```
#[derive(Debug, Clone)]
pub struct AzPipelinesCli {
    binary_path: PathBuf,
}

impl AzPipelinesCli {
    /// Create a source with an explicit az binary path
    ///
    /// # Arguments
    ///
    /// * `binary_path` - Path to the az executable
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find az in PATH
    ///
    /// # Returns
    ///
    /// `Some(AzPipelinesCli)` if az is found, `None` otherwise
    pub fn from_path() -> Option<Self> {
        which::which("az").ok().map(Self::new)
    }

    /// Path of the az binary this source runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    fn command(&self, run_id: &str, dest_dir: &Path, artifact_name: &str) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.args(["pipelines", "runs", "artifact", "download", "--run-id"])
            .arg(run_id)
            .arg("--path")
            .arg(dest_dir)
            .arg("--artifact-name")
            .arg(artifact_name)
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl ArtifactSource for AzPipelinesCli {
    async fn download(
        &self,
        run_id: &str,
        dest_dir: &Path,
        artifact_name: &str,
    ) -> crate::Result<DownloadOutput> {
        let output = self
            .command(run_id, dest_dir, artifact_name)
            .output()
            .await
            .map_err(|e| crate::Error::ExternalTool(format!("Failed to execute az: {}", e)))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(DownloadOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            output: combined,
        })
    }

    fn name(&self) -> &'static str {
        "az-pipelines"
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_consistency_with_which_crate() {
        let which_result = which::which("az");
        let from_path_result = AzPipelinesCli::from_path();

        assert_eq!(
            which_result.is_ok(),
            from_path_result.is_some(),
            "from_path() should return Some if and only if which::which() succeeds"
        );
        if let (Ok(expected), Some(cli)) = (which_result, from_path_result) {
            assert_eq!(cli.binary_path(), expected);
        }
    }

    #[test]
    fn test_command_passes_run_destination_and_artifact() {
        let az = AzPipelinesCli::new(PathBuf::from("az"));
        let cmd = az.command("76289801", Path::new("/tmp/ws"), "vhd-image-bom-2019-containerd");

        let args: Vec<String> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "pipelines",
                "runs",
                "artifact",
                "download",
                "--run-id",
                "76289801",
                "--path",
                "/tmp/ws",
                "--artifact-name",
                "vhd-image-bom-2019-containerd",
            ]
        );
    }

    #[tokio::test]
    async fn test_download_with_invalid_binary_path_is_external_tool_error() {
        let az = AzPipelinesCli::new(PathBuf::from("/nonexistent/path/to/az"));
        let dir = tempfile::tempdir().unwrap();

        let result = az.download("1", dir.path(), "vhd-release-notes-x").await;

        match result {
            Err(crate::Error::ExternalTool(msg)) => {
                assert!(msg.contains("Failed to execute az"));
            }
            other => panic!("Expected ExternalTool error, got: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_reported_as_failed_output() {
        // `false` ignores its arguments and exits 1
        let Ok(false_bin) = which::which("false") else {
            println!("Skipping test: false binary not found in PATH");
            return;
        };
        let source = AzPipelinesCli::new(false_bin);
        let dir = tempfile::tempdir().unwrap();

        let result = source.download("1", dir.path(), "artifact").await.unwrap();

        assert!(!result.success);
        assert!(result.status.contains('1'), "status was {}", result.status);
    }

    #[tokio::test]
    #[ignore] // Requires a logged-in az CLI with the azure-devops extension
    async fn test_download_unknown_run_fails() {
        let Some(az) = AzPipelinesCli::from_path() else {
            println!("Skipping test: az binary not found in PATH");
            return;
        };
        let dir = tempfile::tempdir().unwrap();

        let result = az
            .download("0", dir.path(), "vhd-release-notes-2019-containerd")
            .await
            .unwrap();

        assert!(!result.success);
    }
}
