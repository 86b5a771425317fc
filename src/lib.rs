//! Ledgerhawk - stateful transaction anomaly detection.
//!
//! This crate analyzes a continuous record of financial transactions and
//! surfaces suspicious account activity in near real time: each transaction
//! is compared against its account's evolving history (previous location,
//! running mean amount, inter-transaction timing, relative rank) under
//! strictly ordered, per-account processing.
//!
//! # Architecture
//!
//! - **[`domain`]** - Immutable records and value objects: [`domain::Transaction`],
//!   [`domain::Alert`], newtype identifiers.
//! - **[`port`]** - Store traits the engine depends on:
//!   [`port::TransactionStore`], [`port::AlertStore`].
//! - **[`adapter`]** - Store backends: in-memory ([`adapter::MemoryStore`])
//!   and SQLite via Diesel ([`adapter::sqlite`]).
//! - **[`engine`]** - The detection core: sequencing, incremental baseline,
//!   history tracking, rule evaluation, alert emission, reporting.
//! - **[`config`]** - TOML configuration with thresholds, ordering policy,
//!   retry backoff, and logging setup.
//! - **[`error`]** - Error types for the crate.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ledgerhawk::adapter::MemoryStore;
//! use ledgerhawk::config::Config;
//! use ledgerhawk::domain::AccountId;
//! use ledgerhawk::engine::Engine;
//!
//! # async fn run() -> ledgerhawk::error::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let engine = Engine::new(store.clone(), store, &Config::default());
//! let report = engine.process_account(AccountId::new(42)).await?;
//! println!("{} alerts", report.alerts_emitted);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
