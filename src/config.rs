// =============================================================================
// Engine Configuration
// =============================================================================
//
// Central knobs for the analysis engine: collaborator endpoints, request
// timeout, target currency, and the indicator parameters that are genuinely
// tunable (risk-free rate, band width). Window sizes and MACD spans are NOT
// configurable — they are fixed by the horizon policy and by convention.
//
// Every field carries a serde default so an older JSON file missing new
// fields still loads. Persistence uses an atomic tmp + rename write.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_coincap_base_url() -> String {
    crate::api::coincap::DEFAULT_BASE_URL.to_string()
}

fn default_coingecko_base_url() -> String {
    crate::api::coingecko::DEFAULT_BASE_URL.to_string()
}

fn default_rates_url() -> String {
    crate::api::rates::DEFAULT_RATES_URL.to_string()
}

fn default_symbols_url() -> String {
    crate::api::rates::DEFAULT_SYMBOLS_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_risk_free_rate() -> f64 {
    0.0
}

fn default_bollinger_num_std() -> f64 {
    2.0
}

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// CoinCap v2 API base URL.
    #[serde(default = "default_coincap_base_url")]
    pub coincap_base_url: String,

    /// CoinGecko v3 API base URL.
    #[serde(default = "default_coingecko_base_url")]
    pub coingecko_base_url: String,

    /// Daily USD FX table endpoint.
    #[serde(default = "default_rates_url")]
    pub rates_url: String,

    /// Currency display-symbol table endpoint.
    #[serde(default = "default_symbols_url")]
    pub symbols_url: String,

    /// Per-request timeout for every REST call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Currency series are denominated in, lower-case code.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Risk-free rate for the Sharpe computation, per period.
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,

    /// Bollinger band width in standard deviations.
    #[serde(default = "default_bollinger_num_std")]
    pub bollinger_num_std: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            coincap_base_url: default_coincap_base_url(),
            coingecko_base_url: default_coingecko_base_url(),
            rates_url: default_rates_url(),
            symbols_url: default_symbols_url(),
            request_timeout_secs: default_request_timeout_secs(),
            currency: default_currency(),
            risk_free_rate: default_risk_free_rate(),
            bollinger_num_std: default_bollinger_num_std(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path`, then apply
    /// environment overrides (`CANDELA_CURRENCY`, `CANDELA_RISK_FREE_RATE`).
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let mut config: Self = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("failed to parse {}: {e}", path.display()))
        })?;

        config.apply_env_overrides();

        info!(
            path = %path.display(),
            currency = %config.currency,
            "engine config loaded"
        );
        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write (write to
    /// `.tmp`, then rename) so a crash mid-write cannot corrupt the file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &content).map_err(|e| {
            Error::Config(format!("failed to write {}: {e}", tmp_path.display()))
        })?;
        std::fs::rename(&tmp_path, path).map_err(|e| {
            Error::Config(format!("failed to rename into {}: {e}", path.display()))
        })?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(currency) = std::env::var("CANDELA_CURRENCY") {
            let currency = currency.trim().to_lowercase();
            if !currency.is_empty() {
                debug!(%currency, "currency overridden from environment");
                self.currency = currency;
            }
        }
        if let Ok(raw) = std::env::var("CANDELA_RISK_FREE_RATE") {
            if let Ok(rate) = raw.trim().parse::<f64>() {
                debug!(rate, "risk-free rate overridden from environment");
                self.risk_free_rate = rate;
            }
        }
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.currency, "usd");
        assert_eq!(cfg.request_timeout_secs, 10);
        assert!((cfg.bollinger_num_std - 2.0).abs() < f64::EPSILON);
        assert!((cfg.risk_free_rate - 0.0).abs() < f64::EPSILON);
        assert!(cfg.coincap_base_url.contains("coincap"));
        assert!(cfg.coingecko_base_url.contains("coingecko"));
    }

    #[test]
    fn deserialize_empty_json_uses_defaults() {
        let cfg: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.currency, "usd");
        assert_eq!(cfg.request_timeout_secs, 10);
    }

    #[test]
    fn deserialize_partial_json_fills_defaults() {
        let json = r#"{ "currency": "eur", "request_timeout_secs": 5 }"#;
        let cfg: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.currency, "eur");
        assert_eq!(cfg.request_timeout_secs, 5);
        assert!((cfg.bollinger_num_std - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn roundtrip_serialization() {
        let mut cfg = EngineConfig::default();
        cfg.currency = "gbp".to_string();
        cfg.risk_free_rate = 0.01;
        let json = serde_json::to_string(&cfg).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.currency, "gbp");
        assert!((back.risk_free_rate - 0.01).abs() < f64::EPSILON);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("candela-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("engine_config.json");

        let mut cfg = EngineConfig::default();
        cfg.currency = "inr".to_string();
        cfg.save(&path).unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded.currency, "inr");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let err = EngineConfig::load("/nonexistent/candela.json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
