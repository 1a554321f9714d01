//! Risk configuration with configurable thresholds
//!
//! Loaded once at startup and shared read-only by every evaluation.
//! Every key is optional; missing keys fall back to the defaults below.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use crate::error::{EngineError, EngineResult};
use crate::rules::RuleKind;

/// Longest accepted rapid succession window (366 days)
pub const MAX_RAPID_WINDOW_SECS: u64 = 366 * 24 * 60 * 60;

/// Policy when a dependency (history store, classifier) fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailPolicy {
    /// Treat the failed check as flagged
    #[default]
    FailClosed,

    /// Proceed as if the failed check passed
    FailOpen,
}

/// Weights of the logistic classifier over (entity id, amount, history count)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModelConfig {
    #[serde(default)]
    pub entity_weight: f64,
    #[serde(default)]
    pub amount_weight: f64,
    #[serde(default)]
    pub count_weight: f64,
    #[serde(default)]
    pub bias: f64,
    /// Scores at or above this are flagged
    #[serde(default = "default_model_threshold")]
    pub threshold: f64,
}

/// Configuration for the risk engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    // === Static attribute rules ===
    /// Jurisdictions whose transactions are always flagged
    #[serde(default = "default_high_risk_countries")]
    pub high_risk_countries: BTreeSet<String>,

    /// Amounts strictly above this are flagged
    #[serde(default = "default_amount_threshold")]
    pub amount_threshold: Decimal,

    /// Currencies that are always flagged (privacy coins etc.)
    #[serde(default = "default_suspicious_currencies")]
    pub suspicious_currencies: BTreeSet<String>,

    // === History rules ===
    /// Lifetime transaction count above which an entity is flagged
    #[serde(default = "default_historical_volume_limit")]
    pub historical_volume_limit: u64,

    /// Trailing window for rapid succession checks (in seconds)
    #[serde(default = "default_rapid_window_secs")]
    pub rapid_window_secs: u64,

    /// Transaction count in the rapid window above which an entity is flagged
    #[serde(default = "default_rapid_transaction_limit")]
    pub rapid_transaction_limit: u64,

    /// Amounts strictly below this count towards structuring
    #[serde(default = "default_structuring_ceiling")]
    pub structuring_ceiling: Decimal,

    /// Below-ceiling transaction count above which an entity is flagged
    #[serde(default = "default_structuring_count_limit")]
    pub structuring_count_limit: u64,

    // === Time of day ===
    /// First unusual UTC hour (inclusive)
    #[serde(default = "default_unusual_hour_start")]
    pub unusual_hour_start: u32,

    /// First usual UTC hour after the unusual range (exclusive end)
    #[serde(default = "default_unusual_hour_end")]
    pub unusual_hour_end: u32,

    // === Catalog ===
    /// Built-in rules switched off for this deployment
    #[serde(default)]
    pub disabled_rules: BTreeSet<RuleKind>,

    /// Policy when a history query fails (per affected rule)
    #[serde(default)]
    pub history_failure_mode: FailPolicy,

    // === Classifier ===
    #[serde(default)]
    pub classifier_enabled: bool,

    /// Policy when the classifier fails or times out
    #[serde(default = "default_classifier_failure_mode")]
    pub classifier_failure_mode: FailPolicy,

    /// Upper bound on one classifier call
    #[serde(default = "default_classifier_timeout_ms")]
    pub classifier_timeout_ms: u64,

    /// Built-in linear model; absent when the classifier is supplied by the caller
    #[serde(default)]
    pub classifier_model: Option<LinearModelConfig>,
}

fn default_high_risk_countries() -> BTreeSet<String> {
    [
        "North Korea",
        "Iran",
        "Syria",
        "Sudan",
        "Romania",
        "Nigeria",
        "Ghana",
        "Ukraine",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_amount_threshold() -> Decimal {
    Decimal::new(10_000, 0)
}

fn default_suspicious_currencies() -> BTreeSet<String> {
    ["BTC", "XMR"].into_iter().map(String::from).collect()
}

fn default_historical_volume_limit() -> u64 {
    5
}

fn default_rapid_window_secs() -> u64 {
    300 // 5 minutes
}

fn default_rapid_transaction_limit() -> u64 {
    3
}

fn default_structuring_ceiling() -> Decimal {
    Decimal::new(900_000, 0)
}

fn default_structuring_count_limit() -> u64 {
    5
}

fn default_unusual_hour_start() -> u32 {
    23
}

fn default_unusual_hour_end() -> u32 {
    5
}

fn default_classifier_failure_mode() -> FailPolicy {
    FailPolicy::FailOpen
}

fn default_classifier_timeout_ms() -> u64 {
    500
}

fn default_model_threshold() -> f64 {
    0.5
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            high_risk_countries: default_high_risk_countries(),
            amount_threshold: default_amount_threshold(),
            suspicious_currencies: default_suspicious_currencies(),
            historical_volume_limit: default_historical_volume_limit(),
            rapid_window_secs: default_rapid_window_secs(),
            rapid_transaction_limit: default_rapid_transaction_limit(),
            structuring_ceiling: default_structuring_ceiling(),
            structuring_count_limit: default_structuring_count_limit(),
            unusual_hour_start: default_unusual_hour_start(),
            unusual_hour_end: default_unusual_hour_end(),
            disabled_rules: BTreeSet::new(),
            history_failure_mode: FailPolicy::default(),
            classifier_enabled: false,
            classifier_failure_mode: default_classifier_failure_mode(),
            classifier_timeout_ms: default_classifier_timeout_ms(),
            classifier_model: None,
        }
    }
}

impl RiskConfig {
    /// Load configuration from a JSON file and validate it
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no rule can interpret
    pub fn validate(&self) -> EngineResult<()> {
        if self.unusual_hour_start >= 24 {
            return Err(EngineError::config(format!(
                "unusual_hour_start must be in [0, 24), got {}",
                self.unusual_hour_start
            )));
        }
        if self.unusual_hour_end >= 24 {
            return Err(EngineError::config(format!(
                "unusual_hour_end must be in [0, 24), got {}",
                self.unusual_hour_end
            )));
        }
        if self.rapid_window_secs == 0 {
            return Err(EngineError::config("rapid_window_secs must be positive"));
        }
        if self.rapid_window_secs > MAX_RAPID_WINDOW_SECS {
            return Err(EngineError::config(format!(
                "rapid_window_secs must be at most {}, got {}",
                MAX_RAPID_WINDOW_SECS, self.rapid_window_secs
            )));
        }
        if self.amount_threshold < Decimal::ZERO || self.structuring_ceiling < Decimal::ZERO {
            return Err(EngineError::config("amount thresholds must be non-negative"));
        }
        if self.classifier_enabled && self.classifier_timeout_ms == 0 {
            return Err(EngineError::config("classifier_timeout_ms must be positive"));
        }
        Ok(())
    }

    /// Rapid succession window as a chrono Duration
    pub fn rapid_window(&self) -> EngineResult<chrono::Duration> {
        i64::try_from(self.rapid_window_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| {
                EngineError::config(format!(
                    "rapid_window_secs out of range: {}",
                    self.rapid_window_secs
                ))
            })
    }

    /// Classifier timeout as Duration
    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_millis(self.classifier_timeout_ms)
    }

    /// Whether a built-in rule is switched on
    pub fn is_enabled(&self, kind: RuleKind) -> bool {
        !self.disabled_rules.contains(&kind)
    }
}
