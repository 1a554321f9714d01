//! Temporal aggregator - the single owner of window and hour boundary math
//!
//! Rules never build [`WindowQuery`] values or compare hours themselves;
//! they ask the aggregator, which fixes the semantics once:
//!
//! - trailing window `[anchor - duration, anchor]`, lower bound inclusive
//! - amount ceiling strict (`amount < ceiling`)
//! - hour range `[start, end)`, wrapping past midnight when `start > end`
//!
//! One aggregator lives for one evaluation. `count_all` is memoised so the
//! classifier reuses the rule's answer instead of querying again.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

use amlwatch_core::EntityId;
use amlwatch_history::{HistoryResult, TransactionHistoryPort};

/// Per-evaluation view over the history port
pub struct TemporalAggregator<'a> {
    history: &'a dyn TransactionHistoryPort,
    count_all_cache: Mutex<HashMap<EntityId, u64>>,
}

impl<'a> TemporalAggregator<'a> {
    pub fn new(history: &'a dyn TransactionHistoryPort) -> Self {
        Self {
            history,
            count_all_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Transactions at or after `since`
    pub async fn count_since(&self, entity_id: &EntityId, since: DateTime<Utc>) -> HistoryResult<u64> {
        self.history.count_since(entity_id, since).await
    }

    /// Transactions in the trailing window ending at `anchor`
    pub async fn count_in_trailing_window(
        &self,
        entity_id: &EntityId,
        anchor: DateTime<Utc>,
        duration: Duration,
    ) -> HistoryResult<u64> {
        self.history
            .count_between(entity_id, window_start(anchor, duration), anchor)
            .await
    }

    /// Transactions with amount strictly below `ceiling`
    pub async fn count_with_amount_below(
        &self,
        entity_id: &EntityId,
        ceiling: Decimal,
    ) -> HistoryResult<u64> {
        self.history.count_with_amount_below(entity_id, ceiling).await
    }

    /// All transactions of the entity (memoised for this evaluation)
    pub async fn count_all(&self, entity_id: &EntityId) -> HistoryResult<u64> {
        if let Some(count) = self.cached_count_all(entity_id) {
            return Ok(count);
        }

        let count = self.history.count_all(entity_id).await?;

        if let Ok(mut cache) = self.count_all_cache.lock() {
            cache.insert(entity_id.clone(), count);
        }
        Ok(count)
    }

    fn cached_count_all(&self, entity_id: &EntityId) -> Option<u64> {
        self.count_all_cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(entity_id).copied())
    }
}

/// Inclusive lower bound of the trailing window ending at `anchor`.
///
/// Saturates at the earliest representable instant, so an oversized window
/// counts more history rather than none.
pub fn window_start(anchor: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    anchor
        .checked_sub_signed(duration)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Whether `hour` lies in `[start, end)`, wrapping past midnight.
///
/// `start == end` is an empty range.
pub fn hour_in_range(hour: u32, start: u32, end: u32) -> bool {
    if start < end {
        start <= hour && hour < end
    } else if start > end {
        hour >= start || hour < end
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amlwatch_history::{HistoryError, InMemoryHistory, TransactionRecord, WindowQuery};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    /// Counts queries and answers 4 to everything
    #[derive(Default)]
    struct CountingHistory {
        queries: AtomicUsize,
    }

    #[async_trait]
    impl TransactionHistoryPort for CountingHistory {
        async fn count(&self, _query: &WindowQuery) -> HistoryResult<u64> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(4)
        }
    }

    struct DownHistory;

    #[async_trait]
    impl TransactionHistoryPort for DownHistory {
        async fn count(&self, _query: &WindowQuery) -> HistoryResult<u64> {
            Err(HistoryError::unavailable("db down"))
        }
    }

    #[test]
    fn test_hour_range_wraparound() {
        for hour in [23, 0, 1, 2, 3, 4] {
            assert!(hour_in_range(hour, 23, 5), "hour {hour} should match");
        }
        for hour in 5..=22 {
            assert!(!hour_in_range(hour, 23, 5), "hour {hour} should not match");
        }
    }

    #[test]
    fn test_hour_range_non_wrapping() {
        assert!(hour_in_range(9, 9, 17));
        assert!(hour_in_range(16, 9, 17));
        assert!(!hour_in_range(17, 9, 17));
        assert!(!hour_in_range(8, 9, 17));
    }

    #[test]
    fn test_hour_range_empty() {
        for hour in 0..24 {
            assert!(!hour_in_range(hour, 6, 6));
        }
    }

    #[test]
    fn test_window_start() {
        assert_eq!(
            window_start(t0(), Duration::minutes(5)),
            Utc.with_ymd_and_hms(2024, 6, 1, 11, 55, 0).unwrap()
        );
    }

    #[test]
    fn test_window_start_saturates() {
        let start = window_start(t0(), Duration::MAX);
        assert_eq!(start, DateTime::<Utc>::MIN_UTC);
    }

    #[tokio::test]
    async fn test_oversized_window_counts_everything() {
        let entity = EntityId::from(1u64);
        let history = InMemoryHistory::with_records(vec![
            TransactionRecord::new(1u64, dec!(1), "USD", "USA", t0() - Duration::days(4000)).unwrap(),
            TransactionRecord::new(1u64, dec!(1), "USD", "USA", t0()).unwrap(),
        ])
        .unwrap();
        let aggregator = TemporalAggregator::new(&history);

        let count = aggregator
            .count_in_trailing_window(&entity, t0(), Duration::MAX)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_trailing_window_counts_boundary() {
        let entity = EntityId::from(1u64);
        let history = InMemoryHistory::with_records(vec![
            TransactionRecord::new(1u64, dec!(1), "USD", "USA", t0() - Duration::minutes(5)).unwrap(),
            TransactionRecord::new(1u64, dec!(1), "USD", "USA", t0() - Duration::minutes(6)).unwrap(),
            // after the anchor: outside the window
            TransactionRecord::new(1u64, dec!(1), "USD", "USA", t0() + Duration::minutes(1)).unwrap(),
        ])
        .unwrap();
        let aggregator = TemporalAggregator::new(&history);

        let count = aggregator
            .count_in_trailing_window(&entity, t0(), Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_count_all_is_memoised() {
        let history = CountingHistory::default();
        let aggregator = TemporalAggregator::new(&history);
        let entity = EntityId::from(1u64);

        assert_eq!(aggregator.count_all(&entity).await.unwrap(), 4);
        assert_eq!(aggregator.count_all(&entity).await.unwrap(), 4);
        assert_eq!(history.queries.load(Ordering::SeqCst), 1);

        // other queries are never cached
        aggregator.count_since(&entity, t0()).await.unwrap();
        aggregator.count_since(&entity, t0()).await.unwrap();
        assert_eq!(history.queries.load(Ordering::SeqCst), 3);
    }

    /// Adapter answering the helper queries natively
    struct NativeHelpers;

    #[async_trait]
    impl TransactionHistoryPort for NativeHelpers {
        async fn count(&self, _query: &WindowQuery) -> HistoryResult<u64> {
            Ok(0)
        }

        async fn count_since(&self, _entity_id: &EntityId, _since: DateTime<Utc>) -> HistoryResult<u64> {
            Ok(11)
        }

        async fn count_between(
            &self,
            _entity_id: &EntityId,
            _since: DateTime<Utc>,
            _until: DateTime<Utc>,
        ) -> HistoryResult<u64> {
            Ok(22)
        }

        async fn count_with_amount_below(
            &self,
            _entity_id: &EntityId,
            _ceiling: Decimal,
        ) -> HistoryResult<u64> {
            Ok(33)
        }

        async fn count_all(&self, _entity_id: &EntityId) -> HistoryResult<u64> {
            Ok(44)
        }
    }

    #[tokio::test]
    async fn test_delegates_to_port_helpers() {
        let history = NativeHelpers;
        let aggregator = TemporalAggregator::new(&history);
        let entity = EntityId::from(1u64);

        assert_eq!(aggregator.count_since(&entity, t0()).await.unwrap(), 11);
        assert_eq!(
            aggregator
                .count_in_trailing_window(&entity, t0(), Duration::minutes(5))
                .await
                .unwrap(),
            22
        );
        assert_eq!(
            aggregator.count_with_amount_below(&entity, dec!(10)).await.unwrap(),
            33
        );
        assert_eq!(aggregator.count_all(&entity).await.unwrap(), 44);
    }

    #[tokio::test]
    async fn test_failures_propagate() {
        let aggregator = TemporalAggregator::new(&DownHistory);
        let entity = EntityId::from(1u64);

        assert!(aggregator.count_all(&entity).await.is_err());
        assert!(aggregator
            .count_with_amount_below(&entity, dec!(10))
            .await
            .is_err());
    }
}
