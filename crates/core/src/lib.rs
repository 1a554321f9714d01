//! AmlWatch Core - Domain types
//!
//! This crate contains the fundamental types shared by the risk engine
//! and its history adapters:
//! - `Amount`: Non-negative decimal wrapper for transaction amounts
//! - `CurrencyCode`: Validated, uppercased currency/asset code
//! - `EntityId`: Account/user identifier (numeric or opaque)
//! - `EvaluationContext`: Immutable input to one risk evaluation

pub mod amount;
pub mod context;
pub mod currency;
pub mod entity;

pub use amount::{Amount, AmountError};
pub use context::{ContextError, EvaluationContext};
pub use currency::{CurrencyCode, CurrencyError};
pub use entity::EntityId;
