//! Evaluation context - immutable input to one risk evaluation

use chrono::{DateTime, Timelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::amount::{Amount, AmountError};
use crate::currency::{CurrencyCode, CurrencyError};
use crate::entity::EntityId;

/// Reasons a context is rejected before evaluation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error(transparent)]
    Currency(#[from] CurrencyError),
}

/// The transaction under evaluation.
///
/// Timestamps are always UTC so hour-of-day rules are unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationContext {
    /// Entity whose history is consulted
    pub entity_id: EntityId,

    /// Transaction amount (never negative)
    pub amount: Amount,

    /// Currency code (e.g. "USD", "BTC")
    pub currency: CurrencyCode,

    /// Country name or code as submitted
    pub country: String,

    /// When the transaction happened
    pub timestamp: DateTime<Utc>,
}

impl EvaluationContext {
    /// Build and validate a context.
    pub fn new(
        entity_id: impl Into<EntityId>,
        amount: Decimal,
        currency: &str,
        country: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ContextError> {
        let ctx = Self {
            entity_id: entity_id.into(),
            amount: Amount::new(amount)?,
            currency: currency.parse()?,
            country: country.into().trim().to_string(),
            timestamp,
        };
        ctx.validate()?;
        Ok(ctx)
    }

    /// Re-check invariants (contexts may also arrive through deserialization).
    pub fn validate(&self) -> Result<(), ContextError> {
        if self.entity_id.is_empty() {
            return Err(ContextError::MissingField("entity_id"));
        }
        if self.country.trim().is_empty() {
            return Err(ContextError::MissingField("country"));
        }
        Ok(())
    }

    /// Hour of day (0-23) in UTC
    pub fn utc_hour(&self) -> u32 {
        self.timestamp.hour()
    }
}
