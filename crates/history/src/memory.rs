//! In-memory transaction history
//!
//! Keeps each entity's records in arrival order behind a `RwLock`, so
//! concurrent evaluations read a consistent per-entity snapshot while a
//! writer appends.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use amlwatch_core::EntityId;

use crate::error::{HistoryError, HistoryResult};
use crate::port::TransactionHistoryPort;
use crate::query::WindowQuery;
use crate::record::TransactionRecord;

/// Thread-safe in-memory history store
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    records: RwLock<HashMap<EntityId, Vec<TransactionRecord>>>,
}

impl InMemoryHistory {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with records (in the given order)
    pub fn with_records(records: impl IntoIterator<Item = TransactionRecord>) -> HistoryResult<Self> {
        let history = Self::new();
        for record in records {
            history.record(record)?;
        }
        Ok(history)
    }

    /// Append a record after the entity's existing records
    pub fn record(&self, record: TransactionRecord) -> HistoryResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| HistoryError::unavailable("history lock poisoned"))?;
        tracing::trace!(entity = %record.entity_id, flagged = record.flagged, "Recording transaction");
        records
            .entry(record.entity_id.clone())
            .or_default()
            .push(record);
        Ok(())
    }

    /// Records of one entity, in arrival order
    pub fn records_for(&self, entity_id: &EntityId) -> HistoryResult<Vec<TransactionRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| HistoryError::unavailable("history lock poisoned"))?;
        Ok(records.get(entity_id).cloned().unwrap_or_default())
    }

    /// Number of flagged transactions per UTC day, oldest day first
    pub fn flagged_per_day(&self) -> HistoryResult<BTreeMap<NaiveDate, u64>> {
        let records = self
            .records
            .read()
            .map_err(|_| HistoryError::unavailable("history lock poisoned"))?;

        let mut per_day = BTreeMap::new();
        for record in records.values().flatten().filter(|r| r.flagged) {
            *per_day.entry(record.day()).or_insert(0) += 1;
        }
        Ok(per_day)
    }

    /// Number of entities with at least one record
    pub fn entity_count(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.records
            .read()
            .map(|r| r.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TransactionHistoryPort for InMemoryHistory {
    async fn count(&self, query: &WindowQuery) -> HistoryResult<u64> {
        let records = self
            .records
            .read()
            .map_err(|_| HistoryError::unavailable("history lock poisoned"))?;

        let count = records
            .get(&query.entity_id)
            .map(|rs| rs.iter().filter(|r| query.matches(r)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }
}
