use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Where the song catalog lives and how to talk to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Per-request timeout. Unset means requests may hang indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory `songs.csv` is written into.
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Also patch the rating shown in search results after a successful
    /// rating write. Off by default: only the loaded page copy is updated.
    #[serde(default)]
    pub sync_search_ratings: bool,
    #[serde(default = "default_show_keys_bar")]
    pub show_keys_bar: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            sync_search_ratings: false,
            show_keys_bar: default_show_keys_bar(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_user_agent() -> String {
    format!("songdash/{}", env!("CARGO_PKG_VERSION"))
}

fn default_export_dir() -> PathBuf {
    platform::downloads_dir()
}

fn default_show_keys_bar() -> bool {
    true
}

impl Config {
    /// Load `config_path`, writing defaults there on first run.
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.normalize();
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    /// A zero page size would make every page empty; clamp it.
    fn normalize(&mut self) {
        if self.catalog.page_size == 0 {
            tracing::warn!("config: page_size = 0, using {}", default_page_size());
            self.catalog.page_size = default_page_size();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.catalog.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.catalog.page_size, 10);
        assert!(config.catalog.timeout_secs.is_none());
        assert!(config.catalog.user_agent.starts_with("songdash/"));
        assert!(!config.ui.sync_search_ratings);
        assert!(config.ui.show_keys_bar);
    }

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.catalog.page_size, 10);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.catalog.base_url, config.catalog.base_url);
        assert_eq!(reloaded.export.dir, config.export.dir);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[catalog]\nbase_url = \"http://songs.local:8080\"\npage_size = 0\n\n[ui]\nsync_search_ratings = true\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.catalog.base_url, "http://songs.local:8080");
        assert_eq!(config.catalog.page_size, 10);
        assert!(config.ui.sync_search_ratings);
        assert!(config.ui.show_keys_bar);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[catalog\nbase_url = ").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
