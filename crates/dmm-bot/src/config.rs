//! Application configuration.

use crate::error::{AppError, AppResult};
use dmm_gateway::{ErrorClassifier, ErrorRule};
use dmm_mm::PricingConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Cycle loop timing and shutdown behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Pause between cycles (ms). Default: 1,000.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Interval multiplier applied after a transient venue error. Default: 3.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: u32,
    /// Cancel tracked orders when the worker stops. Default: true.
    #[serde(default = "default_cancel_on_shutdown")]
    pub cancel_on_shutdown: bool,
    /// Log a statistics summary every N cycles (0 = shutdown only). Default: 60.
    #[serde(default = "default_summary_every")]
    pub summary_every: u64,
}

fn default_interval_ms() -> u64 {
    1_000
}

fn default_backoff_multiplier() -> u32 {
    3
}

fn default_cancel_on_shutdown() -> bool {
    true
}

fn default_summary_every() -> u64 {
    60
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            cancel_on_shutdown: default_cancel_on_shutdown(),
            summary_every: default_summary_every(),
        }
    }
}

impl WorkerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(
            self.interval_ms
                .saturating_mul(u64::from(self.backoff_multiplier)),
        )
    }
}

/// Venue selection and error mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Venue adapter name. Only "paper" ships with this binary.
    #[serde(default = "default_venue")]
    pub venue: String,
    /// Whether the venue amends orders in place.
    #[serde(default = "default_supports_edit")]
    pub supports_edit: bool,
    /// Venue-specific error text rules, checked before the built-in table.
    #[serde(default)]
    pub error_rules: Vec<ErrorRule>,
}

fn default_venue() -> String {
    "paper".to_string()
}

fn default_supports_edit() -> bool {
    true
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            venue: default_venue(),
            supports_edit: default_supports_edit(),
            error_rules: Vec::new(),
        }
    }
}

impl GatewayConfig {
    pub fn classifier(&self) -> ErrorClassifier {
        ErrorClassifier::with_rules(self.error_rules.clone())
    }

    pub fn is_paper(&self) -> bool {
        self.venue.eq_ignore_ascii_case("paper")
    }
}

/// Synthetic market served by the paper venue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperConfig {
    #[serde(default = "default_paper_mid_price")]
    pub mid_price: Decimal,
    /// Levels per side, one tick apart.
    #[serde(default = "default_paper_levels")]
    pub levels: usize,
    #[serde(default = "default_paper_level_size")]
    pub level_size: Decimal,
    #[serde(default = "default_paper_quote_balance")]
    pub quote_balance: Decimal,
    /// Starting position. Absent = spot venue.
    #[serde(default)]
    pub position: Option<Decimal>,
}

fn default_paper_mid_price() -> Decimal {
    Decimal::new(100, 0)
}

fn default_paper_levels() -> usize {
    10
}

fn default_paper_level_size() -> Decimal {
    Decimal::ONE
}

fn default_paper_quote_balance() -> Decimal {
    Decimal::new(10_000, 0)
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            mid_price: default_paper_mid_price(),
            levels: default_paper_levels(),
            level_size: default_paper_level_size(),
            quote_balance: default_paper_quote_balance(),
            position: None,
        }
    }
}

/// Root configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub paper: PaperConfig,
}

impl AppConfig {
    /// Load from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        self.pricing.validate()?;

        if self.worker.interval_ms == 0 {
            return Err(AppError::Config("worker.interval_ms must be > 0".to_string()));
        }
        if self.worker.backoff_multiplier == 0 {
            return Err(AppError::Config(
                "worker.backoff_multiplier must be >= 1".to_string(),
            ));
        }
        if self.gateway.is_paper() {
            if self.paper.mid_price <= Decimal::ZERO {
                return Err(AppError::Config("paper.mid_price must be > 0".to_string()));
            }
            if self.paper.levels == 0 {
                return Err(AppError::Config("paper.levels must be >= 1".to_string()));
            }
            if self.paper.level_size < Decimal::ZERO || self.paper.quote_balance < Decimal::ZERO {
                return Err(AppError::Config(
                    "paper.level_size and paper.quote_balance must be >= 0".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmm_gateway::ErrorKind;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.worker.interval_ms, 1_000);
        assert_eq!(config.worker.backoff(), Duration::from_millis(3_000));
        assert!(config.worker.cancel_on_shutdown);
        assert!(config.gateway.is_paper());
        assert_eq!(config.pricing.vwap_levels, 5);
        assert_eq!(config.paper.position, None);
    }

    #[test]
    fn test_full_file() {
        let config = AppConfig::from_toml(
            r#"
[pricing]
target_spread_pct = "0.001"
min_spread = "0.05"
max_spread = "2"
base_amount = "0.25"
vwap_levels = 3

[worker]
interval_ms = 250
backoff_multiplier = 4
cancel_on_shutdown = false

[gateway]
venue = "paper"
supports_edit = false

[[gateway.error_rules]]
pattern = "E-2011"
kind = "not_found"

[paper]
mid_price = "2500"
position = "0.5"
"#,
        )
        .unwrap();

        assert_eq!(config.pricing.target_spread_pct, dec!(0.001));
        assert_eq!(config.pricing.base_amount, dec!(0.25));
        assert_eq!(config.pricing.vwap_levels, 3);
        assert_eq!(config.worker.backoff(), Duration::from_millis(1_000));
        assert!(!config.worker.cancel_on_shutdown);
        assert!(!config.gateway.supports_edit);
        assert_eq!(
            config.gateway.classifier().classify("code E-2011"),
            ErrorKind::NotFound
        );
        assert_eq!(config.paper.mid_price, dec!(2500));
        assert_eq!(config.paper.position, Some(dec!(0.5)));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(matches!(
            AppConfig::from_toml("[worker]\ninterval_ms = 0\n"),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_toml("[pricing]\nmin_spread = \"5\"\nmax_spread = \"1\"\n"),
            Err(AppError::Core(_))
        ));
        assert!(matches!(
            AppConfig::from_toml("[paper]\nmid_price = \"0\"\n"),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            AppConfig::from_file("does/not/exist.toml"),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_bundled_default_config_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/default.toml");
        let config = AppConfig::from_file(path).unwrap();
        assert!(config.gateway.is_paper());
    }
}
