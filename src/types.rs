//! Core types shared by the fetch task and the coordinator

use crate::error::FetchError;
use std::fmt;
use std::path::PathBuf;

/// One of the two artifacts published per variant by a VHD build
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Release notes text
    Notes,
    /// Image bill of materials (JSON)
    ImageList,
}

impl ArtifactKind {
    /// Both artifacts, in the order a fetch task retrieves them
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::Notes, ArtifactKind::ImageList];

    /// Name of the artifact as published by the pipeline run for `variant`
    ///
    /// ```
    /// use vhd_autonotes::ArtifactKind;
    ///
    /// assert_eq!(
    ///     ArtifactKind::Notes.artifact_name("2019-containerd"),
    ///     "vhd-release-notes-2019-containerd"
    /// );
    /// assert_eq!(
    ///     ArtifactKind::ImageList.artifact_name("2019-containerd"),
    ///     "vhd-image-bom-2019-containerd"
    /// );
    /// ```
    pub fn artifact_name(self, variant: &str) -> String {
        match self {
            ArtifactKind::Notes => format!("vhd-release-notes-{variant}"),
            ArtifactKind::ImageList => format!("vhd-image-bom-{variant}"),
        }
    }

    /// Fixed file name the download tool writes into the destination directory
    pub fn workspace_file_name(self) -> &'static str {
        match self {
            ArtifactKind::Notes => "release-notes.txt",
            ArtifactKind::ImageList => "image-bom.json",
        }
    }

    /// File name in the output layout for a resolved `version`
    pub fn output_file_name(self, version: &str) -> String {
        match self {
            ArtifactKind::Notes => format!("{version}.txt"),
            ArtifactKind::ImageList => format!("{version}-image-list.json"),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Notes => f.write_str("release notes"),
            ArtifactKind::ImageList => f.write_str("image list"),
        }
    }
}

/// Stage of a fetch task, used to report where a failure happened
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Resolving the output version before launch
    ResolveVersion,
    /// Acquiring the temporary workspace
    Workspace,
    /// Creating the output directory
    PrepareOutput,
    /// Running the external download for an artifact
    Fetch(ArtifactKind),
    /// Moving a downloaded artifact into the output layout
    Place(ArtifactKind),
    /// Waiting for the spawned task to finish
    Join,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::ResolveVersion => f.write_str("version resolution"),
            Stage::Workspace => f.write_str("workspace setup"),
            Stage::PrepareOutput => f.write_str("output directory setup"),
            Stage::Fetch(kind) => write!(f, "{kind} download"),
            Stage::Place(kind) => write!(f, "{kind} placement"),
            Stage::Join => f.write_str("task join"),
        }
    }
}

/// Lifecycle of a single fetch task
///
/// `Created → WorkspaceAcquired → NotesFetched → NotesPlaced → ManifestFetched →
/// ManifestPlaced → Succeeded`, with `Failed` reachable from any non-terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    /// Task constructed, nothing done yet
    Created,
    /// Temporary workspace exists
    WorkspaceAcquired,
    /// Release notes downloaded into the workspace
    NotesFetched,
    /// Release notes moved into the output layout
    NotesPlaced,
    /// Image list downloaded into the workspace
    ManifestFetched,
    /// Image list moved into the output layout
    ManifestPlaced,
    /// All artifacts placed
    Succeeded,
    /// Task stopped at the given stage
    Failed(Stage),
}

impl TaskState {
    /// State reached once `kind` has been downloaded
    pub fn fetched(kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::Notes => TaskState::NotesFetched,
            ArtifactKind::ImageList => TaskState::ManifestFetched,
        }
    }

    /// State reached once `kind` has been placed
    pub fn placed(kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::Notes => TaskState::NotesPlaced,
            ArtifactKind::ImageList => TaskState::ManifestPlaced,
        }
    }
}

/// Output files written by a successful fetch task
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedArtifacts {
    /// Variant the files belong to
    pub variant: String,
    /// Resolved version used to name the files
    pub version: String,
    /// `<root>/<subpath>/<version>.txt`
    pub notes_path: PathBuf,
    /// `<root>/<subpath>/<version>-image-list.json`
    pub image_list_path: PathBuf,
}

/// Exactly one of these is produced for every launched fetch task
pub type FetchOutcome = std::result::Result<PlacedArtifacts, FetchError>;
