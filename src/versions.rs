//! Base image versions and output version resolution
//!
//! Each variant's base image version is read from an env-style file such as
//! `windows-image.env`:
//!
//! ```text
//! WINDOWS_2019_BASE_IMAGE_VERSION=17763.6054.240703
//! WINDOWS_2022_BASE_IMAGE_VERSION=20348.2582.240703
//! ```
//!
//! The output version replaces the trailing date of the base version with the
//! date of the VHD build.

use crate::config::VariantConfig;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

/// Length of the trailing date suffix removed from a base version
pub const VERSION_SUFFIX_LEN: usize = 6;

/// Base image version per variant id
///
/// Loaded once before any fetch task starts and only read afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BaseVersions {
    versions: HashMap<String, String>,
}

impl BaseVersions {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `text` for the version markers of every variant in `catalog`
    ///
    /// For each line, the first variant whose `<marker>=` appears in the line
    /// takes the second `=`-separated field as its base version. Later lines
    /// override earlier ones.
    pub fn parse(text: &str, catalog: &[VariantConfig]) -> Self {
        let needles: Vec<(String, &str)> = catalog
            .iter()
            .map(|v| (format!("{}=", v.version_marker), v.id.as_str()))
            .collect();

        let mut versions = HashMap::new();
        for line in text.lines() {
            let Some((_, id)) = needles.iter().find(|(needle, _)| line.contains(needle.as_str()))
            else {
                continue;
            };
            let value = line.split('=').nth(1).unwrap_or_default().trim();
            versions.insert((*id).to_string(), value.to_string());
        }

        Self { versions }
    }

    /// Read and parse the base version file at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Environment-style file holding `<marker>=<version>` lines
    /// * `catalog` - Variants whose markers are looked up
    ///
    /// # Returns
    ///
    /// The versions found, or `Error::Config` keyed `base_version_file` when the
    /// file cannot be read. Variants without a marker line are simply absent.
    pub async fn load(path: &Path, catalog: &[VariantConfig]) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config(
                "base_version_file",
                format!("failed to read {}: {}", path.display(), e),
            )
        })?;

        let versions = Self::parse(&text, catalog);
        tracing::debug!(?path, count = versions.len(), "loaded base image versions");
        for variant in catalog {
            if versions.get(&variant.id).is_none() {
                tracing::warn!(
                    variant = %variant.id,
                    marker = %variant.version_marker,
                    "no base image version found"
                );
            }
        }
        Ok(versions)
    }

    /// Base version for a variant, if the file provided one
    pub fn get(&self, variant: &str) -> Option<&str> {
        self.versions.get(variant).map(String::as_str)
    }

    /// Set the base version for a variant
    pub fn insert(&mut self, variant: impl Into<String>, version: impl Into<String>) {
        self.versions.insert(variant.into(), version.into());
    }

    /// Number of variants with a known base version
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Whether no base versions are known
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BaseVersions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            versions: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Replace the trailing date suffix of `base` with `date`
///
/// # Arguments
///
/// * `base` - Base image version ending in a `YYMMDD` build date
/// * `date` - Build date token to put in its place
///
/// # Returns
///
/// The output version, or a configuration error when `base` is not longer than
/// [`VERSION_SUFFIX_LEN`].
///
/// # Examples
///
/// ```
/// use vhd_autonotes::versions::resolve_version;
///
/// assert_eq!(resolve_version("1.2.3-240101", "240615").unwrap(), "1.2.3-240615");
/// assert!(resolve_version("240101", "240615").is_err());
/// ```
pub fn resolve_version(base: &str, date: &str) -> Result<String> {
    if base.len() <= VERSION_SUFFIX_LEN {
        return Err(Error::config(
            "base_version",
            format!(
                "base version '{}' must be longer than {} characters",
                base, VERSION_SUFFIX_LEN
            ),
        ));
    }

    let prefix = base.get(..base.len() - VERSION_SUFFIX_LEN).ok_or_else(|| {
        Error::config(
            "base_version",
            format!("base version '{}' has a non-ASCII date suffix", base),
        )
    })?;

    Ok(format!("{prefix}{date}"))
}
