//! Configuration types for vhd-autonotes

use crate::artifacts::AzPipelinesCli;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A build variant whose artifacts can be fetched
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantConfig {
    /// Variant identifier, also the suffix of its artifact names (e.g. "2019-containerd")
    pub id: String,

    /// Output directory relative to [`Config::output_root`]
    pub subpath: PathBuf,

    /// Key in the base version file holding this variant's base image version
    /// (e.g. "WINDOWS_2019_BASE_IMAGE_VERSION")
    pub version_marker: String,
}

impl VariantConfig {
    /// Create a variant entry
    pub fn new(
        id: impl Into<String>,
        subpath: impl Into<PathBuf>,
        version_marker: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            subpath: subpath.into(),
            version_marker: version_marker.into(),
        }
    }
}

/// External tool paths
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the az executable (auto-detected if None)
    #[serde(default)]
    pub az_path: Option<PathBuf>,

    /// Whether to search PATH for az if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            az_path: None,
            search_path: true,
        }
    }
}

impl ToolsConfig {
    /// Build the az-backed artifact source from these settings
    ///
    /// An explicit `az_path` always wins; otherwise PATH is searched when
    /// `search_path` is enabled.
    pub fn artifact_source(&self) -> Result<AzPipelinesCli> {
        if let Some(path) = &self.az_path {
            return Ok(AzPipelinesCli::new(path.clone()));
        }

        if self.search_path {
            if let Some(cli) = AzPipelinesCli::from_path() {
                return Ok(cli);
            }
            return Err(Error::config("az_path", "az binary not found in PATH"));
        }

        Err(Error::config(
            "az_path",
            "no az path configured and PATH search is disabled",
        ))
    }
}

/// Main configuration for a release notes run
///
/// Built once at startup, validated, then shared read-only with every fetch task.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Pipeline run to download artifacts from
    #[serde(default)]
    pub run_id: String,

    /// Comma-separated variant ids to fetch exclusively (empty = all)
    #[serde(default)]
    pub include: String,

    /// Comma-separated variant ids to skip
    #[serde(default)]
    pub ignore: String,

    /// Root of the release notes tree (default: "vhdbuilder/release-notes")
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// Build date token in YYMMDD form (default: today)
    #[serde(default = "default_build_date")]
    pub build_date: String,

    /// File holding base image versions (default: "vhdbuilder/packer/windows-image.env")
    #[serde(default = "default_base_version_file")]
    pub base_version_file: PathBuf,

    /// Parent directory for per-task workspaces (None = system temp dir)
    #[serde(default)]
    pub workspace_root: Option<PathBuf>,

    /// Variant catalog (default: AKS Windows variants)
    #[serde(default = "default_variants")]
    pub variants: Vec<VariantConfig>,

    /// External tool settings
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            run_id: String::new(),
            include: String::new(),
            ignore: String::new(),
            output_root: default_output_root(),
            build_date: default_build_date(),
            base_version_file: default_base_version_file(),
            workspace_root: None,
            variants: default_variants(),
            tools: ToolsConfig::default(),
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file; missing fields take their defaults
    pub async fn from_json_file(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config(
                "config",
                format!("failed to read {}: {}", path.display(), e),
            )
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Check the settings a run cannot proceed without
    pub fn validate(&self) -> Result<()> {
        if self.run_id.trim().is_empty() {
            return Err(Error::config("run_id", "a pipeline run id is required"));
        }

        if self.build_date.trim().is_empty() {
            return Err(Error::config("build_date", "build date must not be empty"));
        }

        let mut seen = HashSet::new();
        for variant in &self.variants {
            if !seen.insert(variant.id.as_str()) {
                return Err(Error::config(
                    "variants",
                    format!("duplicate variant id '{}'", variant.id),
                ));
            }
        }

        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_output_root() -> PathBuf {
    PathBuf::from("vhdbuilder").join("release-notes")
}

fn default_base_version_file() -> PathBuf {
    PathBuf::from("vhdbuilder").join("packer").join("windows-image.env")
}

fn default_build_date() -> String {
    chrono::Local::now().format("%y%m%d").to_string()
}

fn default_variants() -> Vec<VariantConfig> {
    let windows = |id: &str, marker: &str| {
        VariantConfig::new(id, PathBuf::from("AKSWindows").join(id), marker)
    };

    vec![
        windows("2019-containerd", "WINDOWS_2019_BASE_IMAGE_VERSION"),
        windows("2022-containerd", "WINDOWS_2022_BASE_IMAGE_VERSION"),
        windows("2022-containerd-gen2", "WINDOWS_2022_GEN2_BASE_IMAGE_VERSION"),
    ]
}
