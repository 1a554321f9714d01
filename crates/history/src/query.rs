//! WindowQuery - a typed counting request against transaction history
//!
//! Boundary semantics are fixed here, once:
//! - `since` is an **inclusive** lower bound on the record timestamp
//! - `until` is an **inclusive** upper bound on the record timestamp
//! - `AmountPredicate::Below` is a **strict** upper bound on the amount
//! - all present predicates are combined with AND

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use amlwatch_core::{Amount, EntityId};

use crate::record::TransactionRecord;

/// Predicate on the recorded amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum AmountPredicate {
    /// amount < ceiling
    Below(Decimal),
}

impl AmountPredicate {
    pub fn matches(&self, amount: Amount) -> bool {
        match self {
            AmountPredicate::Below(ceiling) => amount.is_below(*ceiling),
        }
    }
}

/// Count of an entity's past transactions matching every given predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowQuery {
    pub entity_id: EntityId,
    /// Inclusive lower bound; `None` means unbounded
    pub since: Option<DateTime<Utc>>,
    /// Inclusive upper bound; `None` means unbounded
    pub until: Option<DateTime<Utc>>,
    pub amount: Option<AmountPredicate>,
}

impl WindowQuery {
    /// Every transaction of the entity
    pub fn for_entity(entity_id: EntityId) -> Self {
        Self {
            entity_id,
            since: None,
            until: None,
            amount: None,
        }
    }

    /// Restrict to records at or after `since`
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Restrict to records at or before `until`
    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    /// Restrict to records with amount strictly below `ceiling`
    pub fn amount_below(mut self, ceiling: Decimal) -> Self {
        self.amount = Some(AmountPredicate::Below(ceiling));
        self
    }

    /// Whether a record is counted by this query
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        if record.entity_id != self.entity_id {
            return false;
        }
        if let Some(since) = self.since {
            if record.timestamp < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if record.timestamp > until {
                return false;
            }
        }
        match &self.amount {
            Some(predicate) => predicate.matches(record.amount),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn record(entity: &str, amount: Decimal, ts: DateTime<Utc>) -> TransactionRecord {
        TransactionRecord::new(entity, amount, "USD", "USA", ts).unwrap()
    }

    #[test]
    fn test_since_is_inclusive() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let query = WindowQuery::for_entity("E1".into()).since(t0);

        assert!(query.matches(&record("E1", dec!(1), t0)));
        assert!(!query.matches(&record("E1", dec!(1), t0 - Duration::milliseconds(1))));
    }

    #[test]
    fn test_until_is_inclusive() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let query = WindowQuery::for_entity("E1".into()).until(t0);

        assert!(query.matches(&record("E1", dec!(1), t0)));
        assert!(!query.matches(&record("E1", dec!(1), t0 + Duration::milliseconds(1))));
    }

    #[test]
    fn test_amount_below_is_strict() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let query = WindowQuery::for_entity("E1".into()).amount_below(dec!(900000));

        assert!(query.matches(&record("E1", dec!(899999.99), t0)));
        assert!(!query.matches(&record("E1", dec!(900000), t0)));
    }

    #[test]
    fn test_other_entity_never_matches() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let query = WindowQuery::for_entity("E1".into());
        assert!(!query.matches(&record("E2", dec!(1), t0)));
    }

    #[test]
    fn test_predicates_combine_with_and() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let query = WindowQuery::for_entity("E1".into())
            .since(t0)
            .amount_below(dec!(100));

        assert!(query.matches(&record("E1", dec!(50), t0)));
        assert!(!query.matches(&record("E1", dec!(150), t0)));
        assert!(!query.matches(&record("E1", dec!(50), t0 - Duration::seconds(1))));
    }
}
