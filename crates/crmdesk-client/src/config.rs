//! # Client Configuration
//!
//! Settings for the dashboard client: backend location, table defaults and
//! amount display.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     CRMDESK_BASE_URL=https://crm.example.com/api                        │
//! │     CRMDESK_ROWS_PER_PAGE=25                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     ~/.config/crmdesk/crmdesk.toml (Linux)                              │
//! │     ~/Library/Application Support/com.crmdesk.crmdesk/crmdesk.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # crmdesk.toml
//! [backend]
//! base_url = "http://localhost:5000/api"
//! request_timeout_secs = 30
//!
//! [table]
//! rows_per_page = 10
//! pipeline_order = "filter_sort_paginate"  # or "paginate_then_sort"
//!
//! [display]
//! currency_symbol = "₹"
//! decimals = 2
//! ```

use std::path::PathBuf;

use crmdesk_core::gst::round_currency;
use crmdesk_core::validation::validate_rows_per_page;
use crmdesk_core::{PipelineOrder, DEFAULT_ROWS_PER_PAGE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "crmdesk.toml";

// =============================================================================
// Backend Settings
// =============================================================================

/// Where the REST backend lives. Consumed by [`crate::http::HttpBackend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL; collections are `{base_url}/{resource}`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl BackendSettings {
    /// Collection URL for a resource, e.g. `.../api/leads`.
    pub fn collection_url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), resource)
    }

    /// Item URL for update/delete, e.g. `.../api/leads/42`.
    pub fn item_url(&self, resource: &str, id: &str) -> String {
        format!("{}/{}", self.collection_url(resource), id)
    }
}

// =============================================================================
// Table Settings
// =============================================================================

/// Defaults applied to every new table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSettings {
    #[serde(default = "default_rows_per_page")]
    pub rows_per_page: usize,

    #[serde(default)]
    pub pipeline_order: PipelineOrder,
}

fn default_rows_per_page() -> usize {
    DEFAULT_ROWS_PER_PAGE
}

impl Default for TableSettings {
    fn default() -> Self {
        TableSettings {
            rows_per_page: default_rows_per_page(),
            pipeline_order: PipelineOrder::default(),
        }
    }
}

// =============================================================================
// Display Settings
// =============================================================================

/// How amounts are shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    #[serde(default = "default_decimals")]
    pub decimals: u32,
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_decimals() -> u32 {
    2
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            currency_symbol: default_currency_symbol(),
            decimals: default_decimals(),
        }
    }
}

impl DisplaySettings {
    /// Formats an amount for display, e.g. `₹1062.00` or `-₹82.00`.
    ///
    /// Rounds half away from zero; stored values are never rounded.
    pub fn format_amount(&self, value: f64) -> String {
        let rounded = round_currency(value, self.decimals);
        let sign = if rounded < 0.0 { "-" } else { "" };
        format!(
            "{}{}{:.*}",
            sign,
            self.currency_symbol,
            self.decimals as usize,
            rounded.abs()
        )
    }
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub table: TableSettings,

    #[serde(default)]
    pub display: DisplaySettings,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (crmdesk.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load client config, using defaults");
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = &self.backend.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ClientError::InvalidConfig(format!(
                "base_url must start with http:// or https://, got: {}",
                url
            )));
        }

        validate_rows_per_page(self.table.rows_per_page)
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        if self.display.decimals > 6 {
            return Err(ClientError::InvalidConfig(
                "display.decimals must be at most 6".into(),
            ));
        }

        Ok(())
    }

    /// Applies `CRMDESK_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup; unparseable values are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("CRMDESK_BASE_URL") {
            debug!(url = %url, "Overriding base URL from environment");
            self.backend.base_url = url;
        }

        if let Some(rows) = lookup("CRMDESK_ROWS_PER_PAGE") {
            match rows.parse::<usize>() {
                Ok(n) => self.table.rows_per_page = n,
                Err(_) => warn!(value = %rows, "Ignoring invalid CRMDESK_ROWS_PER_PAGE"),
            }
        }

        if let Some(order) = lookup("CRMDESK_PIPELINE_ORDER") {
            match order.parse::<PipelineOrder>() {
                Ok(parsed) => {
                    debug!(?parsed, "Overriding pipeline order from environment");
                    self.table.pipeline_order = parsed;
                }
                Err(e) => warn!(error = %e, "Ignoring CRMDESK_PIPELINE_ORDER"),
            }
        }

        if let Some(symbol) = lookup("CRMDESK_CURRENCY_SYMBOL") {
            self.display.currency_symbol = symbol;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "crmdesk", "crmdesk")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn base_url(&self) -> &str {
        &self.backend.base_url
    }

    pub fn rows_per_page(&self) -> usize {
        self.table.rows_per_page
    }

    pub fn pipeline_order(&self) -> PipelineOrder {
        self.table.pipeline_order
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn temp_config_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("crmdesk-test-{}", uuid::Uuid::new_v4()))
            .join(CONFIG_FILE_NAME)
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.rows_per_page(), DEFAULT_ROWS_PER_PAGE);
        assert_eq!(config.pipeline_order(), PipelineOrder::FilterSortPaginate);
        assert_eq!(config.display.currency_symbol, "₹");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [table]
            rows_per_page = 25
            pipeline_order = "paginate_then_sort"
            "#,
        )
        .unwrap();
        assert_eq!(config.rows_per_page(), 25);
        assert_eq!(config.pipeline_order(), PipelineOrder::PaginateThenSort);
        assert_eq!(config.base_url(), "http://localhost:5000/api");
        assert_eq!(config.display.decimals, 2);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::default();

        config.backend.base_url = "ftp://crm".to_string();
        assert!(config.validate().is_err());

        config.backend.base_url = "https://crm.example.com/api".to_string();
        config.table.rows_per_page = 0;
        assert!(matches!(config.validate(), Err(ClientError::InvalidConfig(_))));

        config.table.rows_per_page = 50;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("CRMDESK_BASE_URL", "https://crm.example.com/api"),
            ("CRMDESK_ROWS_PER_PAGE", "25"),
            ("CRMDESK_PIPELINE_ORDER", "legacy"),
            ("CRMDESK_CURRENCY_SYMBOL", "Rs "),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.base_url(), "https://crm.example.com/api");
        assert_eq!(config.rows_per_page(), 25);
        assert_eq!(config.pipeline_order(), PipelineOrder::PaginateThenSort);
        assert_eq!(config.display.currency_symbol, "Rs ");
    }

    #[test]
    fn test_bad_overrides_are_ignored() {
        let mut config = ClientConfig::default();
        config.apply_overrides(|key| match key {
            "CRMDESK_ROWS_PER_PAGE" => Some("lots".to_string()),
            "CRMDESK_PIPELINE_ORDER" => Some("sideways".to_string()),
            _ => None,
        });
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_config_path();
        let mut config = ClientConfig::default();
        config.table.rows_per_page = 5;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[backend]"));
        assert!(contents.contains("[table]"));

        let loaded: ClientConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.rows_per_page(), 5);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_urls() {
        let backend = BackendSettings {
            base_url: "https://crm.example.com/api/".to_string(),
            ..BackendSettings::default()
        };
        assert_eq!(backend.collection_url("leads"), "https://crm.example.com/api/leads");
        assert_eq!(backend.item_url("leads", "7"), "https://crm.example.com/api/leads/7");
    }

    #[test]
    fn test_format_amount() {
        let display = DisplaySettings::default();
        assert_eq!(display.format_amount(1062.0), "₹1062.00");
        assert_eq!(display.format_amount(-82.0), "-₹82.00");
        assert_eq!(display.format_amount(10.555), "₹10.56");
    }
}
