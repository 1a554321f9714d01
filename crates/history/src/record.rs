//! Transaction record - what the persistence layer keeps per transaction

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use amlwatch_core::{Amount, ContextError, CurrencyCode, EntityId, EvaluationContext};

/// A past transaction together with the flag it received
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique record id
    pub id: String,
    pub entity_id: EntityId,
    pub amount: Amount,
    pub currency: CurrencyCode,
    pub country: String,
    pub timestamp: DateTime<Utc>,
    /// Verdict recorded with the transaction
    #[serde(default)]
    pub flagged: bool,
}

impl TransactionRecord {
    /// Create an unflagged record
    pub fn new(
        entity_id: impl Into<EntityId>,
        amount: Decimal,
        currency: &str,
        country: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ContextError> {
        let ctx = EvaluationContext::new(entity_id, amount, currency, country, timestamp)?;
        Ok(Self::from_context(&ctx, false))
    }

    /// Record an evaluated context with its verdict
    pub fn from_context(ctx: &EvaluationContext, flagged: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            entity_id: ctx.entity_id.clone(),
            amount: ctx.amount,
            currency: ctx.currency.clone(),
            country: ctx.country.clone(),
            timestamp: ctx.timestamp,
            flagged,
        }
    }

    /// Set the flag
    pub fn with_flag(mut self, flagged: bool) -> Self {
        self.flagged = flagged;
        self
    }

    /// UTC calendar day of the transaction
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_record_from_context() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 2, 23, 30, 0).unwrap();
        let ctx = EvaluationContext::new(9u64, dec!(10), "xmr", "Iran", ts).unwrap();
        let record = TransactionRecord::from_context(&ctx, true);

        assert_eq!(record.entity_id.as_str(), "9");
        assert_eq!(record.currency.as_str(), "XMR");
        assert!(record.flagged);
        assert_eq!(record.day(), NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert!(!record.id.is_empty());
    }

    #[test]
    fn test_record_invalid_amount() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        assert!(TransactionRecord::new(1u64, dec!(-3), "USD", "USA", ts).is_err());
    }

    #[test]
    fn test_flag_defaults_to_false_when_missing() {
        let json = r#"{"id":"r1","entity_id":5,"amount":"20","currency":"USD","country":"USA","timestamp":"2024-05-02T10:00:00Z"}"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        assert!(!record.flagged);
        assert_eq!(record.entity_id.as_str(), "5");
    }
}
