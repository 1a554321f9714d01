//! Risk Evaluation Engine - main orchestrator
//!
//! ```text
//! EvaluationContext
//!        │ validate
//!        ▼
//! ┌─────────────────┐      ┌────────────────────┐
//! │ RuleCatalog     │─────►│ TemporalAggregator │──► TransactionHistoryPort
//! │ (all rules)     │      │ (count_all memo)   │
//! └────────┬────────┘      └─────────┬──────────┘
//!          │                         │ historical count
//!          ▼                         ▼
//! ┌─────────────────┐      ┌────────────────────┐
//! │ Fail policies   │◄─────│ ClassifierPort     │ (optional, bounded by timeout)
//! └────────┬────────┘      └────────────────────┘
//!          ▼
//!     RiskVerdict
//! ```

use std::sync::Arc;

use amlwatch_core::EvaluationContext;
use amlwatch_history::TransactionHistoryPort;

use crate::aggregator::TemporalAggregator;
use crate::catalog::RuleCatalog;
use crate::classifier::{ClassifierError, ClassifierFeatures, ClassifierPort, LinearClassifier};
use crate::clock::{Clock, SystemClock};
use crate::config::{FailPolicy, RiskConfig};
use crate::error::{EngineError, EngineResult};
use crate::rules::Rule;
use crate::verdict::RiskVerdict;

/// Evaluates transactions against the rule catalog and optional classifier.
///
/// Holds no mutable state of its own; share it through `Arc`.
pub struct RiskEvaluationEngine {
    config: RiskConfig,
    catalog: RuleCatalog,
    history: Arc<dyn TransactionHistoryPort>,
    classifier: Option<Arc<dyn ClassifierPort>>,
    clock: Arc<dyn Clock>,
}

/// Builder for [`RiskEvaluationEngine`]
pub struct EngineBuilder {
    config: RiskConfig,
    history: Arc<dyn TransactionHistoryPort>,
    classifier: Option<Arc<dyn ClassifierPort>>,
    clock: Option<Arc<dyn Clock>>,
    extra_rules: Vec<Arc<dyn Rule>>,
}

impl EngineBuilder {
    pub fn new(config: RiskConfig, history: Arc<dyn TransactionHistoryPort>) -> Self {
        Self {
            config,
            history,
            classifier: None,
            clock: None,
            extra_rules: Vec::new(),
        }
    }

    /// Use a caller-supplied classifier instead of the configured linear model
    pub fn with_classifier(mut self, classifier: Arc<dyn ClassifierPort>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Append a rule after the built-in ones
    pub fn with_rule(mut self, rule: Arc<dyn Rule>) -> Self {
        self.extra_rules.push(rule);
        self
    }

    pub fn build(self) -> EngineResult<RiskEvaluationEngine> {
        self.config.validate()?;

        let classifier = if self.config.classifier_enabled {
            let classifier = match (self.classifier, &self.config.classifier_model) {
                (Some(classifier), _) => classifier,
                (None, Some(model)) => {
                    Arc::new(LinearClassifier::new(model.clone())) as Arc<dyn ClassifierPort>
                }
                (None, None) => {
                    return Err(EngineError::config(
                        "classifier_enabled requires classifier_model or a supplied classifier",
                    ))
                }
            };
            Some(classifier)
        } else {
            None
        };

        let mut catalog = RuleCatalog::from_config(&self.config)?;
        for rule in self.extra_rules {
            catalog.push(rule);
        }

        tracing::info!(
            rules = catalog.len(),
            classifier = classifier.as_ref().map(|c| c.name()).unwrap_or("none"),
            "Risk engine ready"
        );

        Ok(RiskEvaluationEngine {
            config: self.config,
            catalog,
            history: self.history,
            classifier,
            clock: self
                .clock
                .unwrap_or_else(|| Arc::new(SystemClock::new())),
        })
    }
}

impl RiskEvaluationEngine {
    /// Engine with default configuration and no classifier
    pub fn with_defaults(history: Arc<dyn TransactionHistoryPort>) -> EngineResult<Self> {
        EngineBuilder::new(RiskConfig::default(), history).build()
    }

    /// Evaluate one transaction.
    ///
    /// Only an invalid context is an error; dependency failures are
    /// resolved by the configured fail policies and reported in the verdict.
    pub async fn evaluate(&self, ctx: &EvaluationContext) -> EngineResult<RiskVerdict> {
        ctx.validate()?;

        let aggregator = TemporalAggregator::new(self.history.as_ref());
        let outcomes = self.catalog.evaluate(ctx, &aggregator).await;

        let (classifier_flagged, classifier_error) = match &self.classifier {
            Some(classifier) => self.consult(classifier.as_ref(), ctx, &aggregator).await,
            None => (None, None),
        };

        let verdict = RiskVerdict::from_outcomes(
            &outcomes,
            self.config.history_failure_mode,
            classifier_flagged,
            classifier_error,
            self.clock.now(),
        );

        if verdict.flagged {
            tracing::info!(
                entity = %ctx.entity_id,
                rules = ?verdict.matched_rules,
                classifier = ?verdict.classifier_flagged,
                "Transaction flagged"
            );
        } else {
            tracing::debug!(entity = %ctx.entity_id, "Transaction passed");
        }

        Ok(verdict)
    }

    /// Evaluate transactions one after another, in input order
    pub async fn evaluate_batch(
        &self,
        contexts: &[EvaluationContext],
    ) -> EngineResult<Vec<RiskVerdict>> {
        let mut verdicts = Vec::with_capacity(contexts.len());
        for ctx in contexts {
            verdicts.push(self.evaluate(ctx).await?);
        }
        Ok(verdicts)
    }

    /// Ask the classifier, applying timeout and fail policy.
    ///
    /// Returns `(classifier_flagged, classifier_error)`.
    async fn consult(
        &self,
        classifier: &dyn ClassifierPort,
        ctx: &EvaluationContext,
        aggregator: &TemporalAggregator<'_>,
    ) -> (Option<bool>, Option<String>) {
        match self.predict(classifier, ctx, aggregator).await {
            Ok(flagged) => (Some(flagged), None),
            Err(e) => {
                tracing::warn!(
                    classifier = classifier.name(),
                    entity = %ctx.entity_id,
                    error = %e,
                    policy = ?self.config.classifier_failure_mode,
                    "Classifier failed"
                );
                match self.config.classifier_failure_mode {
                    FailPolicy::FailOpen => (None, Some(e.to_string())),
                    FailPolicy::FailClosed => (Some(true), Some(e.to_string())),
                }
            }
        }
    }

    async fn predict(
        &self,
        classifier: &dyn ClassifierPort,
        ctx: &EvaluationContext,
        aggregator: &TemporalAggregator<'_>,
    ) -> Result<bool, ClassifierError> {
        let historical_count = aggregator
            .count_all(&ctx.entity_id)
            .await
            .map_err(|e| ClassifierError::Unavailable(format!("history: {e}")))?;

        let features = ClassifierFeatures {
            entity_id: ctx.entity_id.clone(),
            amount: ctx.amount.value(),
            historical_count,
        };

        tokio::time::timeout(self.config.classifier_timeout(), classifier.predict(&features))
            .await
            .map_err(|_| ClassifierError::Timeout(self.config.classifier_timeout_ms))?
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }
}
