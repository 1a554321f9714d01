//! Risk verdict - the engine's answer for one transaction

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{RuleCatalog, RuleOutcome};
use crate::config::FailPolicy;
use crate::rules::Severity;

/// A rule whose history query failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFailure {
    pub rule_id: String,
    pub error: String,
}

/// Outcome of one evaluation.
///
/// # Invariant
/// `flagged == !matched_rules.is_empty() || classifier_flagged == Some(true)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskVerdict {
    pub flagged: bool,

    /// Matched rule ids in catalog order
    pub matched_rules: Vec<String>,

    /// `None` when the classifier was not consulted or failed open
    pub classifier_flagged: Option<bool>,

    pub evaluated_at: DateTime<Utc>,

    /// Rules whose history query failed, whatever the policy decided
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rule_failures: Vec<RuleFailure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier_error: Option<String>,

    /// Highest severity among matched rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_severity: Option<Severity>,
}

impl RiskVerdict {
    /// Fuse rule outcomes and the classifier opinion into a verdict
    pub fn from_outcomes(
        outcomes: &[RuleOutcome],
        history_policy: FailPolicy,
        classifier_flagged: Option<bool>,
        classifier_error: Option<String>,
        evaluated_at: DateTime<Utc>,
    ) -> Self {
        let matched_rules = RuleCatalog::matched_ids(outcomes, history_policy);

        let rule_failures = outcomes
            .iter()
            .filter_map(|o| {
                o.failure().map(|e| RuleFailure {
                    rule_id: o.rule_id.clone(),
                    error: e.to_string(),
                })
            })
            .collect();

        let max_severity = outcomes
            .iter()
            .filter(|o| o.counts_as_match(history_policy))
            .map(|o| o.severity)
            .max();

        Self {
            flagged: !matched_rules.is_empty() || classifier_flagged == Some(true),
            matched_rules,
            classifier_flagged,
            evaluated_at,
            rule_failures,
            classifier_error,
            max_severity,
        }
    }

    /// Whether `rule_id` contributed to the flag
    pub fn matched(&self, rule_id: &str) -> bool {
        self.matched_rules.iter().any(|r| r == rule_id)
    }

    /// Check the flag invariant
    pub fn is_consistent(&self) -> bool {
        self.flagged == (!self.matched_rules.is_empty() || self.classifier_flagged == Some(true))
    }
}
