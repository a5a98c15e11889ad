//! Application configuration for Polidoc.
//!
//! User config lives at `~/.polidoc/polidoc.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PolidocError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "polidoc.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".polidoc";

// ---------------------------------------------------------------------------
// Config structs (matching polidoc.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Catalog database and object store locations.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Spreadsheet import settings.
    #[serde(default)]
    pub import: ImportConfig,

    /// Search and browse settings.
    #[serde(default)]
    pub search: SearchConfig,
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the libSQL catalog database.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Root directory for the local object store.
    #[serde(default = "default_object_store_root")]
    pub object_store_root: String,

    /// Public URL prefix prepended to object keys.
    #[serde(default = "default_public_url_prefix")]
    pub public_url_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            object_store_root: default_object_store_root(),
            public_url_prefix: default_public_url_prefix(),
        }
    }
}

fn default_database_path() -> String {
    "~/.polidoc/polidoc.db".into()
}
fn default_object_store_root() -> String {
    "~/.polidoc/objects".into()
}
fn default_public_url_prefix() -> String {
    "https://files.polidoc.local/".into()
}

/// `[import]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Case-insensitive marker selecting the data sheet by name.
    #[serde(default = "default_sheet_marker")]
    pub sheet_marker: String,

    /// Upper bound on uploaded workbook size; parsing buffers the file.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            sheet_marker: default_sheet_marker(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_sheet_marker() -> String {
    "database".into()
}
fn default_max_upload_bytes() -> u64 {
    25 * 1024 * 1024
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Results per search page.
    #[serde(default = "default_entries_per_page")]
    pub entries_per_page: u32,

    /// Years at or below this floor are treated as placeholders and
    /// excluded from the year facet.
    #[serde(default = "default_min_facet_year")]
    pub min_facet_year: i32,

    /// Minimum occurrence count for an entry type to appear in its facet.
    /// Zero keeps every value.
    #[serde(default)]
    pub entry_type_min_count: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            entries_per_page: default_entries_per_page(),
            min_facet_year: default_min_facet_year(),
            entry_type_min_count: 0,
        }
    }
}

fn default_entries_per_page() -> u32 {
    30
}
fn default_min_facet_year() -> i32 {
    1800
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.polidoc/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PolidocError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.polidoc/polidoc.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PolidocError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| PolidocError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PolidocError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PolidocError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PolidocError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Expand a leading `~/` against the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("database_path"));
        assert!(toml_str.contains("entries_per_page"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.search.entries_per_page, 30);
        assert_eq!(parsed.import.sheet_marker, "database");
        assert_eq!(parsed.search.min_facet_year, 1800);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[storage]
database_path = "/tmp/catalog.db"

[search]
entries_per_page = 10
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.storage.database_path, "/tmp/catalog.db");
        assert_eq!(config.search.entries_per_page, 10);
        // Untouched sections keep their defaults
        assert_eq!(config.import.sheet_marker, "database");
        assert_eq!(config.search.entry_type_min_count, 0);
    }

    #[test]
    fn expand_home_passthrough() {
        assert_eq!(expand_home("/tmp/x"), PathBuf::from("/tmp/x"));
        let expanded = expand_home("~/x");
        assert!(expanded.ends_with("x"));
    }
}
