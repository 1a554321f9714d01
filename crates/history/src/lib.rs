//! AmlWatch History - transaction history queries for the risk engine
//!
//! The engine never stores transactions itself; it asks a
//! [`TransactionHistoryPort`] to count past transactions for an entity:
//!
//! ```text
//!   TemporalAggregator ──► WindowQuery { entity, since?, amount < ceiling? }
//!                                │
//!                                ▼
//!                  TransactionHistoryPort::count
//!                    ├── InMemoryHistory   (reference adapter)
//!                    └── <persistence layer> (external)
//! ```
//!
//! ## Key Components
//!
//! - [`query::WindowQuery`] - Typed counting request (inclusive lower bound, strict amount ceiling)
//! - [`port::TransactionHistoryPort`] - Async query interface consumed by the engine
//! - [`memory::InMemoryHistory`] - Thread-safe in-memory adapter, per-entity arrival order
//! - [`log::TransactionLog`] - Append-only JSONL file of evaluated transactions

pub mod error;
pub mod log;
pub mod memory;
pub mod port;
pub mod query;
pub mod record;

pub use error::{HistoryError, HistoryResult};
pub use log::TransactionLog;
pub use memory::InMemoryHistory;
pub use port::TransactionHistoryPort;
pub use query::{AmountPredicate, WindowQuery};
pub use record::TransactionRecord;
