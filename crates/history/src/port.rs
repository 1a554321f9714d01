//! TransactionHistoryPort - the history capability consumed by the engine

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use amlwatch_core::EntityId;

use crate::error::HistoryResult;
use crate::query::WindowQuery;

/// Counting queries over an entity's past transactions.
///
/// Implementations can be:
/// - InMemoryHistory: for tests, replays and small deployments
/// - a SQL-backed store owned by the persistence layer
///
/// Counts must include every transaction committed before the current
/// evaluation began, and a burst of transactions for one entity must be
/// visible in arrival order. No cross-entity ordering is required.
#[async_trait]
pub trait TransactionHistoryPort: Send + Sync {
    /// Count records matching every predicate of `query`
    async fn count(&self, query: &WindowQuery) -> HistoryResult<u64>;

    /// Records at or after `since` (inclusive)
    async fn count_since(&self, entity_id: &EntityId, since: DateTime<Utc>) -> HistoryResult<u64> {
        self.count(&WindowQuery::for_entity(entity_id.clone()).since(since))
            .await
    }

    /// Records in `[since, until]` (both inclusive)
    async fn count_between(
        &self,
        entity_id: &EntityId,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> HistoryResult<u64> {
        self.count(&WindowQuery::for_entity(entity_id.clone()).since(since).until(until))
            .await
    }

    /// Records with amount strictly below `ceiling`
    async fn count_with_amount_below(
        &self,
        entity_id: &EntityId,
        ceiling: Decimal,
    ) -> HistoryResult<u64> {
        self.count(&WindowQuery::for_entity(entity_id.clone()).amount_below(ceiling))
            .await
    }

    /// Every record of the entity
    async fn count_all(&self, entity_id: &EntityId) -> HistoryResult<u64> {
        self.count(&WindowQuery::for_entity(entity_id.clone())).await
    }
}
