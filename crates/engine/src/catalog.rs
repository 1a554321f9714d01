//! Rule Catalog - ordered set of rules evaluated for every transaction
//!
//! Every enabled rule runs; a match never short-circuits the rest so the
//! verdict lists all reasons for a flag.

use std::sync::Arc;

use amlwatch_core::EvaluationContext;
use amlwatch_history::HistoryError;

use crate::aggregator::TemporalAggregator;
use crate::config::{FailPolicy, RiskConfig};
use crate::error::EngineResult;
use crate::rules::{
    AbsoluteAmountThreshold, HighRiskJurisdiction, HistoricalVolumeLimit, RapidSuccession, Rule,
    RuleKind, Severity, StructuringPattern, SuspiciousCurrency, UnusualHour,
};

/// Result of one rule against one context
#[derive(Debug)]
pub enum RuleStatus {
    Matched,
    NotMatched,
    /// The rule's history query failed; resolved by the history fail policy
    Failed(HistoryError),
}

#[derive(Debug)]
pub struct RuleOutcome {
    pub rule_id: String,
    pub severity: Severity,
    pub status: RuleStatus,
}

impl RuleOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self.status, RuleStatus::Matched)
    }

    pub fn failure(&self) -> Option<&HistoryError> {
        match &self.status {
            RuleStatus::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Whether this outcome counts as a match under `policy`
    pub fn counts_as_match(&self, policy: FailPolicy) -> bool {
        match self.status {
            RuleStatus::Matched => true,
            RuleStatus::NotMatched => false,
            RuleStatus::Failed(_) => policy == FailPolicy::FailClosed,
        }
    }
}

/// Ordered rule list
///
/// Built once at startup and shared read-only across evaluations.
#[derive(Default)]
pub struct RuleCatalog {
    rules: Vec<Arc<dyn Rule>>,
}

impl RuleCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in rules in canonical order, minus the disabled ones
    pub fn from_config(config: &RiskConfig) -> EngineResult<Self> {
        let mut catalog = Self::new();

        let builtins: [(RuleKind, Arc<dyn Rule>); 7] = [
            (
                RuleKind::HighRiskJurisdiction,
                Arc::new(HighRiskJurisdiction::new(
                    config.high_risk_countries.iter().cloned(),
                )),
            ),
            (
                RuleKind::AbsoluteAmountThreshold,
                Arc::new(AbsoluteAmountThreshold::new(config.amount_threshold)),
            ),
            (
                RuleKind::HistoricalVolumeLimit,
                Arc::new(HistoricalVolumeLimit::new(config.historical_volume_limit)),
            ),
            (
                RuleKind::RapidSuccession,
                Arc::new(RapidSuccession::new(
                    config.rapid_window()?,
                    config.rapid_transaction_limit,
                )),
            ),
            (
                RuleKind::SuspiciousCurrency,
                Arc::new(SuspiciousCurrency::new(
                    config.suspicious_currencies.iter().cloned(),
                )),
            ),
            (
                RuleKind::StructuringPattern,
                Arc::new(StructuringPattern::new(
                    config.structuring_ceiling,
                    config.structuring_count_limit,
                )),
            ),
            (
                RuleKind::UnusualHour,
                Arc::new(UnusualHour::new(
                    config.unusual_hour_start,
                    config.unusual_hour_end,
                )),
            ),
        ];

        for (kind, rule) in builtins {
            if config.is_enabled(kind) {
                catalog.push(rule);
            } else {
                tracing::debug!(rule = %kind, "Rule disabled by configuration");
            }
        }

        Ok(catalog)
    }

    /// Append a rule after the existing ones
    pub fn push(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Evaluate every rule in order
    pub async fn evaluate(
        &self,
        ctx: &EvaluationContext,
        history: &TemporalAggregator<'_>,
    ) -> Vec<RuleOutcome> {
        let mut outcomes = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            let status = match rule.evaluate(ctx, history).await {
                Ok(true) => {
                    tracing::debug!(rule = rule.id(), entity = %ctx.entity_id, "Rule matched");
                    RuleStatus::Matched
                }
                Ok(false) => RuleStatus::NotMatched,
                Err(e) => {
                    tracing::error!(
                        rule = rule.id(),
                        entity = %ctx.entity_id,
                        error = %e,
                        "Rule history query failed"
                    );
                    RuleStatus::Failed(e)
                }
            };

            outcomes.push(RuleOutcome {
                rule_id: rule.id().to_string(),
                severity: rule.severity(),
                status,
            });
        }

        outcomes
    }

    /// Ids counted as matched under `policy`, in catalog order
    pub fn matched_ids(outcomes: &[RuleOutcome], policy: FailPolicy) -> Vec<String> {
        outcomes
            .iter()
            .filter(|o| o.counts_as_match(policy))
            .map(|o| o.rule_id.clone())
            .collect()
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule ids in evaluation order
    pub fn ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id()).collect()
    }
}
