//! Centralized console configuration.
//!
//! Loaded via the `config` crate from environment variables, with `__`
//! separating nested keys (e.g. `HISTORY__LIMIT=100`). Leptos site options
//! (address, site root) come from `[package.metadata.leptos]` instead.

use serde::Deserialize;

/// Console configuration composed from per-area settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    /// Sample data loaded at startup.
    #[serde(default)]
    pub seed: SeedConfig,

    /// Workflow editor undo/redo settings.
    #[serde(default)]
    pub history: HistoryConfig,

    /// User table settings.
    #[serde(default)]
    pub listing: ListingConfig,

    /// Name recorded in audit trails and `created_by` fields.
    #[serde(default = "default_operator_name")]
    pub operator_name: String,
}

/// Sample data configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    /// Whether to start with the demonstration data set.
    /// When false the console starts empty.
    #[serde(default = "default_sample_data")]
    pub sample_data: bool,
}

/// Workflow editor history configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Snapshots kept by the canvas editor before the oldest is evicted.
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

/// User table configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    /// Rows per page when the table first loads.
    /// Must be one of the offered page sizes.
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

fn default_sample_data() -> bool {
    true
}

fn default_history_limit() -> usize {
    pharma_lims_workflow::DEFAULT_HISTORY_LIMIT
}

fn default_page_size() -> usize {
    10
}

fn default_operator_name() -> String {
    "System Administrator".to_string()
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            seed: SeedConfig::default(),
            history: HistoryConfig::default(),
            listing: ListingConfig::default(),
            operator_name: default_operator_name(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            sample_data: default_sample_data(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: default_history_limit(),
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
        }
    }
}

impl ConsoleConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Settings the browser needs, sent once per page load.
    #[must_use]
    pub fn client_settings(&self) -> crate::types::ClientSettings {
        let page_size = if pharma_lims_accounts::PAGE_SIZE_OPTIONS.contains(&self.listing.default_page_size) {
            self.listing.default_page_size
        } else {
            tracing::warn!(
                page_size = self.listing.default_page_size,
                "Configured page size is not offered, using 10"
            );
            default_page_size()
        };
        crate::types::ClientSettings {
            history_limit: self.history.limit.max(1),
            default_page_size: page_size,
            operator_name: self.operator_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_config_has_correct_defaults() {
        let config = ConsoleConfig::default();
        assert!(config.seed.sample_data);
        assert_eq!(config.history.limit, 50);
        assert_eq!(config.listing.default_page_size, 10);
        assert_eq!(config.operator_name, "System Administrator");
    }

    #[test]
    fn unsupported_page_size_falls_back() {
        let config = ConsoleConfig {
            listing: ListingConfig {
                default_page_size: 7,
            },
            history: HistoryConfig { limit: 0 },
            ..ConsoleConfig::default()
        };
        let settings = config.client_settings();
        assert_eq!(settings.default_page_size, 10);
        assert_eq!(settings.history_limit, 1);
    }
}
