//! Rules - independently evaluable AML checks
//!
//! Built-in rules:
//! - [`HighRiskJurisdiction`] - country on the denylist
//! - [`AbsoluteAmountThreshold`] - amount strictly above threshold
//! - [`HistoricalVolumeLimit`] - lifetime transaction count above limit
//! - [`RapidSuccession`] - too many transactions in a trailing window
//! - [`SuspiciousCurrency`] - currency on the denylist
//! - [`StructuringPattern`] - many transactions kept under a ceiling
//! - [`UnusualHour`] - UTC hour inside a (wrapping) hour range

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use amlwatch_core::EvaluationContext;
use amlwatch_history::HistoryResult;

use crate::aggregator::{hour_in_range, TemporalAggregator};

/// Severity of a rule - reporting only, never part of the flag decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

/// Identifiers of the built-in rules (also their audit ids)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum RuleKind {
    HighRiskJurisdiction,
    AbsoluteAmountThreshold,
    HistoricalVolumeLimit,
    RapidSuccession,
    SuspiciousCurrency,
    StructuringPattern,
    UnusualHour,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// A stateless predicate over a transaction and its entity's history.
///
/// Rules must not mutate history. A failed history query is returned as
/// `Err` and resolved by the engine's fail policy.
#[async_trait]
pub trait Rule: Send + Sync {
    /// Stable identifier used in verdicts and logs
    fn id(&self) -> &str;

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    async fn evaluate(
        &self,
        ctx: &EvaluationContext,
        history: &TemporalAggregator<'_>,
    ) -> HistoryResult<bool>;
}

// =============================================================================
// Static attribute rules
// =============================================================================

/// Country is on the high-risk jurisdiction list
pub struct HighRiskJurisdiction {
    countries: BTreeSet<String>,
}

impl HighRiskJurisdiction {
    pub fn new(countries: impl IntoIterator<Item = String>) -> Self {
        Self {
            countries: countries.into_iter().map(|c| c.trim().to_string()).collect(),
        }
    }
}

#[async_trait]
impl Rule for HighRiskJurisdiction {
    fn id(&self) -> &str {
        RuleKind::HighRiskJurisdiction.as_str()
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    async fn evaluate(
        &self,
        ctx: &EvaluationContext,
        _history: &TemporalAggregator<'_>,
    ) -> HistoryResult<bool> {
        Ok(self.countries.contains(ctx.country.trim()))
    }
}

/// Amount strictly above a fixed threshold
pub struct AbsoluteAmountThreshold {
    threshold: Decimal,
}

impl AbsoluteAmountThreshold {
    pub fn new(threshold: Decimal) -> Self {
        Self { threshold }
    }
}

#[async_trait]
impl Rule for AbsoluteAmountThreshold {
    fn id(&self) -> &str {
        RuleKind::AbsoluteAmountThreshold.as_str()
    }

    async fn evaluate(
        &self,
        ctx: &EvaluationContext,
        _history: &TemporalAggregator<'_>,
    ) -> HistoryResult<bool> {
        Ok(ctx.amount.exceeds(self.threshold))
    }
}

/// Currency is on the suspicious currency list
pub struct SuspiciousCurrency {
    currencies: BTreeSet<String>,
}

impl SuspiciousCurrency {
    pub fn new(currencies: impl IntoIterator<Item = String>) -> Self {
        Self {
            currencies: currencies
                .into_iter()
                .map(|c| c.trim().to_uppercase())
                .collect(),
        }
    }
}

#[async_trait]
impl Rule for SuspiciousCurrency {
    fn id(&self) -> &str {
        RuleKind::SuspiciousCurrency.as_str()
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    async fn evaluate(
        &self,
        ctx: &EvaluationContext,
        _history: &TemporalAggregator<'_>,
    ) -> HistoryResult<bool> {
        Ok(self.currencies.contains(ctx.currency.as_str()))
    }
}

/// Transaction hour (UTC) falls in `[start, end)`, wrapping past midnight
pub struct UnusualHour {
    start: u32,
    end: u32,
}

impl UnusualHour {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

#[async_trait]
impl Rule for UnusualHour {
    fn id(&self) -> &str {
        RuleKind::UnusualHour.as_str()
    }

    fn severity(&self) -> Severity {
        Severity::Low
    }

    async fn evaluate(
        &self,
        ctx: &EvaluationContext,
        _history: &TemporalAggregator<'_>,
    ) -> HistoryResult<bool> {
        Ok(hour_in_range(ctx.utc_hour(), self.start, self.end))
    }
}

// =============================================================================
// History rules
// =============================================================================

/// Lifetime transaction count above a limit
pub struct HistoricalVolumeLimit {
    limit: u64,
}

impl HistoricalVolumeLimit {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

#[async_trait]
impl Rule for HistoricalVolumeLimit {
    fn id(&self) -> &str {
        RuleKind::HistoricalVolumeLimit.as_str()
    }

    async fn evaluate(
        &self,
        ctx: &EvaluationContext,
        history: &TemporalAggregator<'_>,
    ) -> HistoryResult<bool> {
        let count = history.count_all(&ctx.entity_id).await?;
        Ok(count > self.limit)
    }
}

/// More than `limit` transactions in `[timestamp - window, timestamp]`
pub struct RapidSuccession {
    window: Duration,
    limit: u64,
}

impl RapidSuccession {
    pub fn new(window: Duration, limit: u64) -> Self {
        Self { window, limit }
    }
}

#[async_trait]
impl Rule for RapidSuccession {
    fn id(&self) -> &str {
        RuleKind::RapidSuccession.as_str()
    }

    async fn evaluate(
        &self,
        ctx: &EvaluationContext,
        history: &TemporalAggregator<'_>,
    ) -> HistoryResult<bool> {
        let count = history
            .count_in_trailing_window(&ctx.entity_id, ctx.timestamp, self.window)
            .await?;
        Ok(count > self.limit)
    }
}

/// More than `limit` transactions with amount strictly below `ceiling`
pub struct StructuringPattern {
    ceiling: Decimal,
    limit: u64,
}

impl StructuringPattern {
    pub fn new(ceiling: Decimal, limit: u64) -> Self {
        Self { ceiling, limit }
    }
}

#[async_trait]
impl Rule for StructuringPattern {
    fn id(&self) -> &str {
        RuleKind::StructuringPattern.as_str()
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    async fn evaluate(
        &self,
        ctx: &EvaluationContext,
        history: &TemporalAggregator<'_>,
    ) -> HistoryResult<bool> {
        let count = history
            .count_with_amount_below(&ctx.entity_id, self.ceiling)
            .await?;
        Ok(count > self.limit)
    }
}

// =============================================================================
// Tests
// =============================================================================
