//! # Journal Analytics Engine
//!
//! This crate turns a snapshot of trading-journal entries into the numbers a
//! trader reviews: equity curve and drawdown, win rate and averages, streaks,
//! setup rankings and per-period performance.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** No I/O and no knowledge of where entries are stored. It
//!   depends only on `core-types`.
//! - **Stateless Calculation:** Every function takes plain data and returns a
//!   fresh value. Inputs are never reordered or mutated; sorting happens on copies.
//! - **Explicit Sentinels:** Undefined ratios come back as `0` or `None` as
//!   documented per function, never as a panic or an error.
//!
//! ## Public API
//!
//! - `AnalyticsEngine` / `PerformanceReport`: one call for the whole dashboard.
//! - `equity`, `setups`, `periods`, `streaks`, `summary`, `stats`, `breakdown`,
//!   `journal`: the individual calculations.
//! - `math`: the shared division-by-zero policy.

// Declare the modules that constitute this crate.
pub mod breakdown;
pub mod engine;
pub mod equity;
pub mod error;
pub mod journal;
pub mod math;
pub mod periods;
pub mod report;
pub mod setups;
pub mod stats;
pub mod streaks;
pub mod summary;

// Re-export the key components to create a clean, public-facing API.
pub use breakdown::{GroupAggregate, breakdown_by, breakdown_by_coin, breakdown_by_mood};
pub use engine::AnalyticsEngine;
pub use equity::{DrawdownStats, EquityPoint, build_equity_curve, max_drawdown};
pub use error::AnalyticsError;
pub use journal::{JournalPage, JournalQuery, SortField, query_journal};
pub use math::safe_divide;
pub use periods::{
    Period, PeriodBucket, PeriodRange, calendar_month, filter_by_period, filter_by_range,
    period_performance,
};
pub use report::{PerformanceReport, ReportOptions};
pub use setups::{SetupAggregate, most_traded_setup, normalize_setup_name, setup_breakdown};
pub use stats::{
    TradeReturn, avg_holding_time, best_trade_by_return, expectancy, sharpe_ratio, volatility,
};
pub use streaks::{Streaks, compute_streaks, compute_streaks_chronological};
pub use summary::{SummaryStats, summary_stats};
