//! Variant selection from include/ignore token lists
//!
//! Include and ignore lists are comma-separated variant ids. Whitespace
//! anywhere in a list is ignored, so `"a, b"` and `"a,b"` are the same list.
//!
//! - With a non-empty include list, a variant is selected when it is included
//!   and not ignored.
//! - With an empty include list, every variant that is not ignored is selected.
//!
//! A list is empty only when nothing but whitespace was given. A list such as
//! `","` is non-empty: its tokens are empty strings, which match no variant.

use crate::config::VariantConfig;
use crate::utils::strip_whitespace;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Split a comma-separated list into exact, case-sensitive tokens
///
/// # Arguments
///
/// * `raw` - The list as given on the command line or in the config file
///
/// # Returns
///
/// The set of tokens, empty only when `raw` holds nothing but whitespace.
/// Empty tokens between commas are kept.
pub fn parse_tokens(raw: &str) -> HashSet<String> {
    let stripped = strip_whitespace(raw);
    if stripped.is_empty() {
        return HashSet::new();
    }
    stripped.split(',').map(str::to_string).collect()
}

/// Selected variants mapped to their output subpath
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    variants: BTreeMap<String, PathBuf>,
}

impl Selection {
    /// Number of selected variants
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Whether nothing was selected
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Whether `variant` was selected
    pub fn contains(&self, variant: &str) -> bool {
        self.variants.contains_key(variant)
    }

    /// Output subpath of a selected variant
    pub fn subpath(&self, variant: &str) -> Option<&Path> {
        self.variants.get(variant).map(PathBuf::as_path)
    }

    /// Selected variant ids in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }

    /// Selected `(id, subpath)` pairs in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.variants
            .iter()
            .map(|(id, path)| (id.as_str(), path.as_path()))
    }
}

/// Compute the working set of variants from the catalog
///
/// # Arguments
///
/// * `catalog` - Every known variant
/// * `include` - Comma-separated ids to fetch exclusively (blank = all)
/// * `ignore` - Comma-separated ids to skip; wins over `include`
///
/// # Returns
///
/// The selected variants with their output subpaths
pub fn select_variants(catalog: &[VariantConfig], include: &str, ignore: &str) -> Selection {
    let include = parse_tokens(include);
    let ignore = parse_tokens(ignore);
    let enforce_include = !include.is_empty();

    let variants = catalog
        .iter()
        .filter(|v| !ignore.contains(&v.id))
        .filter(|v| !enforce_include || include.contains(&v.id))
        .map(|v| (v.id.clone(), v.subpath.clone()))
        .collect();

    Selection { variants }
}
