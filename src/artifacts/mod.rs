//! Artifact download capability
//!
//! Fetch tasks never shell out directly. They go through the [`ArtifactSource`]
//! trait, which downloads one named artifact of a pipeline run into a directory.
//!
//! - [`AzPipelinesCli`]: uses the external `az` binary
//!   (`az pipelines runs artifact download`)
//!
//! Tests substitute their own implementation so no network or tool is needed.
//!
//! ## Usage
//!
//! ```no_run
//! use vhd_autonotes::artifacts::{ArtifactSource, AzPipelinesCli};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let az = AzPipelinesCli::from_path().expect("az binary not found");
//!
//!     let result = az
//!         .download("76289801", Path::new("/tmp/notes"), "vhd-release-notes-2019-containerd")
//!         .await?;
//!     if !result.success {
//!         println!("download failed: {}", result.output);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod cli;
mod traits;

pub use cli::AzPipelinesCli;
pub use traits::{ArtifactSource, DownloadOutput};
