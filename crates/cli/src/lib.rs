//! AmlWatch CLI - command orchestration over the risk engine
//!
//! This crate provides the `amlwatch` binary and its commands.

pub mod commands;
pub mod context;

pub use context::AppContext;
