//! Config and base version file fixtures

use std::path::{Path, PathBuf};
use vhd_autonotes::{Config, VariantConfig};

/// Base version used for every fixture variant
pub const BASE_VERSION: &str = "9.9.9-999999";

/// Write an env file assigning `BASE_VERSION` to each marker
pub fn write_env_file(dir: &Path, markers: &[&str]) -> PathBuf {
    let path = dir.join("windows-image.env");
    let body: String = markers
        .iter()
        .map(|marker| format!("{marker}={BASE_VERSION}\n"))
        .collect();
    std::fs::write(&path, body).expect("failed to write env file");
    path
}

/// Config with variants "a" and "b" writing under `dir/out`
pub fn two_variant_config(dir: &Path, include: &str, ignore: &str, date: &str) -> Config {
    Config {
        run_id: "4242".to_string(),
        include: include.to_string(),
        ignore: ignore.to_string(),
        output_root: dir.join("out"),
        build_date: date.to_string(),
        base_version_file: write_env_file(dir, &["A_VERSION", "B_VERSION"]),
        workspace_root: Some(dir.to_path_buf()),
        variants: vec![
            VariantConfig::new("a", "a", "A_VERSION"),
            VariantConfig::new("b", "b", "B_VERSION"),
        ],
        ..Default::default()
    }
}
