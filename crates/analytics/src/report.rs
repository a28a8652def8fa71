use crate::equity::{DrawdownStats, EquityPoint};
use crate::periods::{Period, PeriodRange};
use crate::setups::SetupAggregate;
use crate::stats::TradeReturn;
use crate::streaks::Streaks;
use crate::summary::SummaryStats;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything the dashboard shows for one selection of trades.
///
/// This struct is the output of the `AnalyticsEngine` and the data transfer
/// object handed to whatever renders it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// The calendar range the trades were filtered to, if any.
    pub range: Option<PeriodRange>,

    // I. Headline numbers
    pub summary: SummaryStats,
    pub streaks: Streaks,

    // II. Equity and drawdown
    pub initial_capital: Decimal,
    pub equity_curve: Vec<EquityPoint>,
    pub drawdown: DrawdownStats,

    // III. Setups
    pub most_traded_setup: Option<SetupAggregate>,

    // IV. Sample statistics. `None` means not enough data.
    pub sharpe_ratio: Option<Decimal>,
    pub expectancy: Option<Decimal>,
    pub volatility: Option<Decimal>,
    #[serde(with = "humantime_serde")]
    pub avg_holding_time: Option<Duration>,
    pub best_trade: Option<TradeReturn>,
}

/// Inputs to a report besides the trades themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOptions {
    pub initial_capital: Decimal,
    pub risk_free_rate: Decimal,
    /// Restrict the report to the period containing the given date.
    pub period: Option<(Period, chrono::NaiveDate)>,
    /// Sort by date before counting streaks instead of trusting stored order.
    pub chronological_streaks: bool,
}
