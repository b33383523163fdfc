//! # Application Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     MELAR_API_URL=https://melar.example/api/v1                          │
//! │     MELAR_DB_PATH=/tmp/melar.db                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     ~/.config/melar/melar.toml (Linux)                                  │
//! │     ~/Library/Application Support/id.melar.melar/melar.toml (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! │     localhost backend, 5% service fee, 10% tax                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [api]
//! base_url = "http://localhost:8000/api/v1"
//! auth_scheme = "Token"
//! timeout_secs = 30
//!
//! [storage]
//! database_path = "/var/lib/melar/melar.db"
//!
//! [checkout]
//! service_fee_bps = 500
//! tax_bps = 1000
//! admin_whatsapp = "6281234567890"
//! currency_symbol = "$"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use melar_client::{ClientConfig, DEFAULT_AUTH_SCHEME, DEFAULT_BASE_URL};
use melar_core::whatsapp::normalize_phone;
use melar_core::{FeeSchedule, DEFAULT_ADMIN_WHATSAPP};
use melar_store::StoreConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ConfigError;

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "melar.toml";

/// Basis points in 100%.
const MAX_BPS: u32 = 10_000;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// `Authorization` header scheme (`Token` for the stock backend).
    #[serde(default = "default_auth_scheme")]
    pub auth_scheme: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_auth_scheme() -> String {
    DEFAULT_AUTH_SCHEME.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            auth_scheme: default_auth_scheme(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file. Defaults to `melar.db` in the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSettings {
    #[serde(default = "default_service_fee_bps")]
    pub service_fee_bps: u32,

    #[serde(default = "default_tax_bps")]
    pub tax_bps: u32,

    /// Receives the confirmation when the cart spans several shops or the
    /// shop has no phone number.
    #[serde(default = "default_admin_whatsapp")]
    pub admin_whatsapp: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_service_fee_bps() -> u32 {
    500
}

fn default_tax_bps() -> u32 {
    1000
}

fn default_admin_whatsapp() -> String {
    DEFAULT_ADMIN_WHATSAPP.to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            service_fee_bps: default_service_fee_bps(),
            tax_bps: default_tax_bps(),
            admin_whatsapp: default_admin_whatsapp(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub checkout: CheckoutSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`melar.toml`, or `config_path` when given)
    /// 3. `MELAR_*` environment variables
    ///
    /// An explicit `config_path` that does not exist is an error; a missing
    /// default file is not.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => {
                info!(?path, "Loading config from file");
                Self::from_file(path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => {
                    info!(?path, "Loading config from file");
                    Self::from_file(&path)?
                }
                other => {
                    debug!(path = ?other, "Config file not found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<&Path>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "api.base_url must start with http:// or https://, got: {}",
                url
            )));
        }

        if self.api.auth_scheme.trim().is_empty() {
            return Err(ConfigError::Invalid("api.auth_scheme must not be empty".into()));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "api.timeout_secs must be greater than 0".into(),
            ));
        }

        for (name, bps) in [
            ("checkout.service_fee_bps", self.checkout.service_fee_bps),
            ("checkout.tax_bps", self.checkout.tax_bps),
        ] {
            if bps > MAX_BPS {
                return Err(ConfigError::Invalid(format!(
                    "{} must be at most {} (100%), got {}",
                    name, MAX_BPS, bps
                )));
            }
        }

        if normalize_phone(&self.checkout.admin_whatsapp).is_none() {
            return Err(ConfigError::Invalid(
                "checkout.admin_whatsapp must contain a phone number".into(),
            ));
        }

        Ok(())
    }

    /// Applies `MELAR_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from a variable lookup. Unparseable numbers are
    /// logged and skipped.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("MELAR_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(scheme) = lookup("MELAR_AUTH_SCHEME") {
            self.api.auth_scheme = scheme;
        }

        if let Some(timeout) = lookup("MELAR_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring invalid MELAR_TIMEOUT_SECS"),
            }
        }

        if let Some(path) = lookup("MELAR_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(bps) = lookup("MELAR_SERVICE_FEE_BPS") {
            match bps.parse::<u32>() {
                Ok(v) => self.checkout.service_fee_bps = v,
                Err(_) => warn!(value = %bps, "Ignoring invalid MELAR_SERVICE_FEE_BPS"),
            }
        }

        if let Some(bps) = lookup("MELAR_TAX_BPS") {
            match bps.parse::<u32>() {
                Ok(v) => self.checkout.tax_bps = v,
                Err(_) => warn!(value = %bps, "Ignoring invalid MELAR_TAX_BPS"),
            }
        }

        if let Some(number) = lookup("MELAR_ADMIN_WHATSAPP") {
            self.checkout.admin_whatsapp = number;
        }

        if let Some(symbol) = lookup("MELAR_CURRENCY_SYMBOL") {
            self.checkout.currency_symbol = symbol;
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("id", "melar", "melar")
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Derived settings
    // =========================================================================

    pub fn fee_schedule(&self) -> FeeSchedule {
        FeeSchedule::from_bps(self.checkout.service_fee_bps, self.checkout.tax_bps)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api.base_url.trim())
            .auth_scheme(self.api.auth_scheme.trim())
            .timeout(Duration::from_secs(self.api.timeout_secs))
    }

    /// SQLite file location. Falls back to the working directory when the
    /// platform has no data directory.
    pub fn database_path(&self) -> PathBuf {
        self.storage.database_path.clone().unwrap_or_else(|| {
            Self::project_dirs()
                .map(|dirs| dirs.data_dir().join("melar.db"))
                .unwrap_or_else(|| PathBuf::from("melar.db"))
        })
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.database_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.api.auth_scheme, "Token");
        assert_eq!(config.fee_schedule(), FeeSchedule::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://melar.example/api/v1"

            [checkout]
            tax_bps = 1100
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://melar.example/api/v1");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.checkout.tax_bps, 1100);
        assert_eq!(config.checkout.service_fee_bps, 500);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("MELAR_API_URL", "https://api.melar.example/v1"),
            ("MELAR_DB_PATH", "/tmp/melar-test.db"),
            ("MELAR_SERVICE_FEE_BPS", "250"),
            ("MELAR_TAX_BPS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "https://api.melar.example/v1");
        assert_eq!(config.database_path(), PathBuf::from("/tmp/melar-test.db"));
        assert_eq!(config.checkout.service_fee_bps, 250);
        assert_eq!(config.checkout.tax_bps, 1000);
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        config.api.base_url = "ftp://melar".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.checkout.tax_bps = 10_001;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.checkout.admin_whatsapp = "none".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[checkout]\ncurrency_symbol = \"Rp\"").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.checkout.currency_symbol, "Rp");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            AppConfig::load(Some(&missing)),
            Err(ConfigError::Read(_))
        ));
    }
}
