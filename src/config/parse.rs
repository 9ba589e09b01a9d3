//! Manifest parsing and discovery

use crate::config::types::Manifest;
use crate::error::{ConfigError, ConfigResult, TaskrigError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest file names looked up in the working directory
pub const MANIFEST_FILE_NAMES: &[&str] = &["taskrig.yml", "taskrig.yaml"];

/// Find the manifest in the current working directory
pub fn find_manifest() -> ConfigResult<PathBuf> {
    find_manifest_in(&env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the manifest in a specific directory
///
/// Only the directory itself is searched, parent directories are not.
pub fn find_manifest_in(dir: &Path) -> ConfigResult<PathBuf> {
    let mut searched_paths = Vec::new();

    for file_name in MANIFEST_FILE_NAMES {
        let manifest_path = dir.join(file_name);
        if manifest_path.is_file() {
            return Ok(manifest_path);
        }
        searched_paths.push(manifest_path.display().to_string());
    }

    Err(ConfigError::NotFound(searched_paths.join(", ")))
}

/// Parse a manifest file from a path
pub fn parse_manifest_file(path: &Path) -> Result<Manifest, TaskrigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    parse_manifest(&contents)
}

/// Parse a manifest from a string
pub fn parse_manifest(yaml: &str) -> Result<Manifest, TaskrigError> {
    // An empty file is a valid, empty manifest
    if yaml.trim().is_empty() {
        return Ok(Manifest::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

/// Parse the manifest of the current working directory
pub fn parse_manifest_auto() -> Result<(Manifest, PathBuf), TaskrigError> {
    let manifest_path = find_manifest()?;
    let manifest = parse_manifest_file(&manifest_path)?;
    Ok((manifest, manifest_path))
}

/// Load a `.env` file next to the manifest, if there is one
///
/// Returns whether a file was loaded. Variables already present in the
/// process environment are not overridden.
pub fn load_env_file(manifest_path: &Path) -> ConfigResult<bool> {
    let dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let env_path = dir.join(".env");
    if !env_path.is_file() {
        return Ok(false);
    }

    dotenvy::from_path(&env_path).map_err(|e| ConfigError::Read {
        path: env_path.clone(),
        error: e.to_string(),
    })?;
    Ok(true)
}
