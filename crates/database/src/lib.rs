//! # Journal Database Crate
//!
//! This crate is the trade store: the only component that writes journal
//! entries. Everything else reads snapshots through the [`TradeReader`] port.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All SQL lives here. Callers see `TradeEntry` values, never rows.
//! - **Lossless Storage:** Decimals are stored as text and the raw date string is
//!   kept verbatim, so a malformed date reaches the analytics engine (which skips
//!   it) instead of failing the load.
//! - **Asynchronous & Pooled:** Built on a `sqlx` SQLite pool.
//!
//! ## Public API
//!
//! - `connect` / `run_migrations`: open the pool and bring the schema up to date.
//! - `TradeReader`: the read port consumed by the CLI.
//! - `DbRepository`: the SQLite implementation, plus the write operations.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::{DbRepository, TradeReader};
