//! AmlWatch Engine - AML risk evaluation for single transactions
//!
//! Combines deterministic rules with an optional classifier opinion:
//!
//! - Rules inspect static attributes (country, amount, currency, hour)
//!   and the entity's history through a [`TemporalAggregator`]
//! - A [`ClassifierPort`] may add a statistical opinion
//! - Dependency failures are resolved by configurable [`FailPolicy`]s
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use amlwatch_core::EvaluationContext;
//! use amlwatch_engine::RiskEvaluationEngine;
//! use amlwatch_history::InMemoryHistory;
//! use chrono::Utc;
//! use rust_decimal::Decimal;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = RiskEvaluationEngine::with_defaults(Arc::new(InMemoryHistory::new()))?;
//! let ctx = EvaluationContext::new(1001u64, Decimal::new(500, 0), "USD", "Nigeria", Utc::now())?;
//!
//! let verdict = engine.evaluate(&ctx).await?;
//! assert!(verdict.matched("HighRiskJurisdiction"));
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod catalog;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod rules;
pub mod verdict;

pub use aggregator::TemporalAggregator;
pub use catalog::{RuleCatalog, RuleOutcome, RuleStatus};
pub use classifier::{
    ClassifierError, ClassifierFeatures, ClassifierPort, ClassifierResult, LinearClassifier,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{FailPolicy, LinearModelConfig, RiskConfig};
pub use engine::{EngineBuilder, RiskEvaluationEngine};
pub use error::{EngineError, EngineResult};
pub use rules::{Rule, RuleKind, Severity};
pub use verdict::{RiskVerdict, RuleFailure};
