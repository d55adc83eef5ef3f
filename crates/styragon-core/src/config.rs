//! Configuration types for Styragon components.
//!
//! Connection settings come from the environment (see the CLI). Site-level
//! settings live in an optional TOML file:
//!
//! ```toml
//! base_url = "https://www.styragon.com"
//! posts_per_page = 9
//!
//! [storage]
//! image_bucket = "images"
//! lead_bucket = "leads"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::query::DEFAULT_PAGE_SIZE;
use crate::AppError;

/// Database connection pool configuration.
pub struct DbConfig {
    pub max_connections: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self { max_connections: 5 }
    }
}

/// HTTP client configuration for the storage and auth services.
pub struct HttpConfig {
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// Buckets used by the uploader.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Bucket for post, project and avatar images.
    pub image_bucket: String,
    /// Bucket for lead-form attachments.
    pub lead_bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            image_bucket: "images".to_string(),
            lead_bucket: "leads".to_string(),
        }
    }
}

/// Site-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Absolute origin used in the sitemap and robots.txt. No trailing slash.
    pub base_url: String,
    pub posts_per_page: u32,
    pub storage: StorageConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.styragon.com".to_string(),
            posts_per_page: DEFAULT_PAGE_SIZE,
            storage: StorageConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Base URL with any trailing slash removed.
    pub fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// `<config dir>/styragon/site.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("styragon").join("site.toml"))
}

/// Loads site settings from `path`, or from [`default_config_path`] when
/// `path` is `None`. A missing file yields the defaults; a malformed one is
/// an error.
pub fn load_site_config(path: Option<&Path>) -> Result<SiteConfig, AppError> {
    let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(p) => p,
        None => return Ok(SiteConfig::default()),
    };

    if !path.exists() {
        debug!(path = %path.display(), "no site config, using defaults");
        return Ok(SiteConfig::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|e| {
        AppError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let config: SiteConfig = toml::from_str(&content).map_err(|e| {
        AppError::ConfigError(format!("Invalid config {}: {}", path.display(), e))
    })?;

    if config.posts_per_page == 0 {
        return Err(AppError::ConfigError(
            "posts_per_page must be at least 1".to_string(),
        ));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_db_config_defaults() {
        let config = DbConfig::default();
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn test_http_config_defaults() {
        assert_eq!(HttpConfig::default().timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_site_config(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.posts_per_page, 9);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = \"https://example.org/\"").unwrap();
        writeln!(file, "[storage]").unwrap();
        writeln!(file, "lead_bucket = \"inbox\"").unwrap();

        let config = load_site_config(Some(file.path())).unwrap();
        assert_eq!(config.origin(), "https://example.org");
        assert_eq!(config.posts_per_page, 9);
        assert_eq!(config.storage.image_bucket, "images");
        assert_eq!(config.storage.lead_bucket, "inbox");
    }

    #[test]
    fn test_invalid_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "posts_per_page = \"many\"").unwrap();
        let err = load_site_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "posts_per_page = 0").unwrap();
        assert!(load_site_config(Some(file.path())).is_err());
    }
}
