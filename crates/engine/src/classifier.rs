//! Classifier port - optional statistical opinion fused with rule results
//!
//! The engine consults the classifier after the rules, passing the
//! entity's lifetime transaction count it already looked up.

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use amlwatch_core::EntityId;

use crate::config::LinearModelConfig;

/// Classifier errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Classifier timed out after {0}ms")]
    Timeout(u64),

    #[error("Invalid classifier features: {0}")]
    InvalidFeatures(String),
}

pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// Features handed to the classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierFeatures {
    pub entity_id: EntityId,
    pub amount: Decimal,
    /// Lifetime transaction count of the entity
    pub historical_count: u64,
}

/// Binary suspicious/not-suspicious predictor
#[async_trait]
pub trait ClassifierPort: Send + Sync {
    /// Name for logs
    fn name(&self) -> &str;

    /// `true` means the transaction looks suspicious
    async fn predict(&self, features: &ClassifierFeatures) -> ClassifierResult<bool>;
}

/// Logistic model over (entity id, amount, historical count).
///
/// Inference only: weights come from configuration.
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    model: LinearModelConfig,
}

impl LinearClassifier {
    pub fn new(model: LinearModelConfig) -> Self {
        Self { model }
    }

    /// Probability-like score in (0, 1)
    pub fn score(&self, features: &ClassifierFeatures) -> ClassifierResult<f64> {
        let entity = if self.model.entity_weight == 0.0 {
            0.0
        } else {
            features.entity_id.as_numeric().ok_or_else(|| {
                ClassifierError::InvalidFeatures(format!(
                    "entity id '{}' is not numeric",
                    features.entity_id
                ))
            })? as f64
        };

        let amount = features.amount.to_f64().ok_or_else(|| {
            ClassifierError::InvalidFeatures(format!("amount {} out of range", features.amount))
        })?;

        let z = self.model.entity_weight * entity
            + self.model.amount_weight * amount
            + self.model.count_weight * features.historical_count as f64
            + self.model.bias;

        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

#[async_trait]
impl ClassifierPort for LinearClassifier {
    fn name(&self) -> &str {
        "linear"
    }

    async fn predict(&self, features: &ClassifierFeatures) -> ClassifierResult<bool> {
        let score = self.score(features)?;
        tracing::trace!(entity = %features.entity_id, score, "Classifier score");
        Ok(score >= self.model.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn model(amount_weight: f64, count_weight: f64, bias: f64) -> LinearModelConfig {
        LinearModelConfig {
            entity_weight: 0.0,
            amount_weight,
            count_weight,
            bias,
            threshold: 0.5,
        }
    }

    fn features(entity: impl Into<EntityId>, amount: Decimal, count: u64) -> ClassifierFeatures {
        ClassifierFeatures {
            entity_id: entity.into(),
            amount,
            historical_count: count,
        }
    }

    #[test]
    fn test_score_is_sigmoid() {
        let classifier = LinearClassifier::new(model(0.0, 0.0, 0.0));
        let score = classifier.score(&features(1u64, dec!(10), 0)).unwrap();
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_predict_threshold() {
        // flagged once amount * 0.001 + count - 10 >= 0
        let classifier = LinearClassifier::new(model(0.001, 1.0, -10.0));

        assert!(!classifier.predict(&features(1u64, dec!(500), 2)).await.unwrap());
        assert!(classifier.predict(&features(1u64, dec!(5000), 6)).await.unwrap());
    }

    #[tokio::test]
    async fn test_opaque_entity_with_entity_weight() {
        let classifier = LinearClassifier::new(LinearModelConfig {
            entity_weight: 0.1,
            ..model(0.0, 0.0, 0.0)
        });

        let err = classifier
            .predict(&features("acct-7f3a", dec!(1), 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidFeatures(_)));

        // opaque ids are fine when the entity feature is unused
        let classifier = LinearClassifier::new(model(0.0, 0.0, 0.0));
        assert!(classifier.predict(&features("acct-7f3a", dec!(1), 0)).await.is_ok());
    }
}
