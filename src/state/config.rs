/// Sweep configuration
///
/// Values are layered: built-in defaults, then an optional JSON config file,
/// then command-line flags (applied by `main`).
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SweepError};

/// Default number of entries kept after filtering
pub const DEFAULT_LIMIT: usize = 30;

/// Image that is never reaped, whether referenced or not
pub const DEFAULT_FALLBACK_IMAGE: &str = "fallbackImage.png";

/// Extensions (lower-case, no dot) the reaper treats as images
pub const DEFAULT_IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// Which steps of the pipeline run
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct StepToggles {
    pub purge_percent: bool,
    pub filter_missing: bool,
    pub truncate: bool,
    pub sanitize: bool,
    pub reap: bool,
}

impl Default for StepToggles {
    fn default() -> Self {
        Self {
            purge_percent: true,
            filter_missing: true,
            truncate: true,
            sanitize: true,
            reap: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    /// The JSON catalog (top-level array of objects)
    pub catalog_path: PathBuf,
    /// Flat folder holding the images the catalog points to
    pub images_dir: PathBuf,
    /// Maximum entries kept by truncation
    pub limit: usize,
    /// Character stripped from sanitized text fields
    pub forbidden_char: char,
    /// Image files whose name contains this character are purged up front
    pub reserved_char: char,
    pub fallback_image: String,
    pub image_extensions: Vec<String>,
    /// Text fields the sanitizer cleans
    pub sanitized_fields: Vec<String>,
    pub steps: StepToggles,
    /// Report what would change without touching the filesystem
    pub dry_run: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("content.json"),
            images_dir: PathBuf::from("images"),
            limit: DEFAULT_LIMIT,
            forbidden_char: '*',
            reserved_char: '%',
            fallback_image: DEFAULT_FALLBACK_IMAGE.to_string(),
            image_extensions: DEFAULT_IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            sanitized_fields: vec!["title".to_string(), "description".to_string()],
            steps: StepToggles::default(),
            dry_run: false,
        }
    }
}

impl SweepConfig {
    /// Read a config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| SweepError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| SweepError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Resolve the config: an explicit file must exist, otherwise the user
    /// config file is used when present, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::user_config_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "using user config");
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Get the path of the per-user config file
    /// - Linux: ~/.config/content-sweep/config.json
    /// - macOS: ~/Library/Application Support/content-sweep/config.json
    /// - Windows: %APPDATA%\content-sweep\config.json
    pub fn user_config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("content-sweep");
        path.push("config.json");
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SweepConfig::default();
        assert_eq!(config.catalog_path, PathBuf::from("content.json"));
        assert_eq!(config.images_dir, PathBuf::from("images"));
        assert_eq!(config.limit, 30);
        assert_eq!(config.forbidden_char, '*');
        assert_eq!(config.reserved_char, '%');
        assert_eq!(config.fallback_image, "fallbackImage.png");
        assert_eq!(config.image_extensions.len(), 6);
        assert!(config.steps.reap);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"limit": 5, "steps": {"reap": false}}"#).unwrap();

        let config = SweepConfig::load(Some(&path)).unwrap();
        assert_eq!(config.limit, 5);
        assert!(!config.steps.reap);
        assert!(config.steps.sanitize);
        assert_eq!(config.fallback_image, DEFAULT_FALLBACK_IMAGE);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"limt": 5}"#).unwrap();
        assert!(matches!(SweepConfig::load(Some(&path)), Err(SweepError::Config { .. })));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(SweepConfig::load(Some(&path)), Err(SweepError::Config { .. })));
    }
}
