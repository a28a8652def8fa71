use crate::equity::{build_equity_curve, max_drawdown};
use crate::periods::{PeriodRange, filter_by_range};
use crate::report::{PerformanceReport, ReportOptions};
use crate::setups::most_traded_setup;
use crate::stats::{avg_holding_time, best_trade_by_return, expectancy, sharpe_ratio, volatility};
use crate::streaks::{compute_streaks, compute_streaks_chronological};
use crate::summary::summary_stats;
use core_types::TradeEntry;

/// A stateless calculator for deriving performance metrics from journal entries.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the full dashboard report for a snapshot of the journal.
    ///
    /// # Arguments
    ///
    /// * `trades` - The journal entries, in the order the store returned them.
    /// * `options` - Starting capital, risk-free rate and an optional period filter.
    ///
    /// The slice is only read; any filtering or sorting works on copies.
    pub fn report(&self, trades: &[TradeEntry], options: &ReportOptions) -> PerformanceReport {
        let range = options
            .period
            .map(|(period, date)| PeriodRange::containing(period, date));
        let selected = match range {
            Some(range) => filter_by_range(trades, range),
            None => trades.to_vec(),
        };
        tracing::debug!(
            total = trades.len(),
            selected = selected.len(),
            ?range,
            "Computing performance report."
        );

        let equity_curve = build_equity_curve(&selected, options.initial_capital);
        let drawdown = max_drawdown(&equity_curve);
        let streaks = if options.chronological_streaks {
            compute_streaks_chronological(&selected)
        } else {
            compute_streaks(&selected)
        };

        PerformanceReport {
            range,
            summary: summary_stats(&selected),
            streaks,
            initial_capital: options.initial_capital,
            equity_curve,
            drawdown,
            most_traded_setup: most_traded_setup(&selected),
            sharpe_ratio: sharpe_ratio(&selected, options.risk_free_rate),
            expectancy: expectancy(&selected),
            volatility: volatility(&selected),
            avg_holding_time: avg_holding_time(&selected),
            best_trade: best_trade_by_return(&selected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::periods::Period;
    use chrono::NaiveDate;
    use core_types::Outcome;
    use rust_decimal_macros::dec;

    fn journal() -> Vec<TradeEntry> {
        vec![
            TradeEntry::new("2024-01-01", dec!(100), Outcome::Win).with_setup(["Breakout"]),
            TradeEntry::new("2024-01-02", dec!(-50), Outcome::Loss).with_setup(["Breakout"]),
            TradeEntry::new("2024-02-10", dec!(30), Outcome::Win).with_setup(["Scalp"]),
        ]
    }

    #[test]
    fn full_report() {
        let options = ReportOptions {
            initial_capital: dec!(1000),
            ..ReportOptions::default()
        };
        let report = AnalyticsEngine::new().report(&journal(), &options);

        assert_eq!(report.range, None);
        assert_eq!(report.summary.total_trades, 3);
        assert_eq!(report.summary.total_pnl, dec!(80));
        assert_eq!(report.equity_curve.len(), 3);
        assert_eq!(report.equity_curve[2].equity, dec!(1080));
        assert_eq!(report.drawdown.max_drawdown, dec!(-50));
        assert_eq!(report.streaks.current_streak, 1);
        assert_eq!(report.most_traded_setup.unwrap().count, 2);
        assert!(report.sharpe_ratio.is_some());
        assert!(report.best_trade.is_none());
    }

    #[test]
    fn period_report_only_sees_that_period() {
        let options = ReportOptions {
            initial_capital: dec!(1000),
            period: Some((Period::Month, NaiveDate::from_ymd_opt(2024, 2, 20).unwrap())),
            ..ReportOptions::default()
        };
        let report = AnalyticsEngine::new().report(&journal(), &options);

        assert_eq!(report.summary.total_trades, 1);
        assert_eq!(report.summary.total_pnl, dec!(30));
        assert_eq!(report.most_traded_setup.unwrap().display_name, "Scalp");
        assert_eq!(report.sharpe_ratio, None);
        assert_eq!(report.expectancy, None);
    }

    #[test]
    fn empty_journal_report() {
        let report = AnalyticsEngine::new().report(&[], &ReportOptions::default());
        assert_eq!(report.summary.total_trades, 0);
        assert!(report.equity_curve.is_empty());
        assert_eq!(report.most_traded_setup, None);
        assert_eq!(report.drawdown.max_drawdown_percent, dec!(0));
    }

    #[test]
    fn report_serializes_to_json() {
        let report = AnalyticsEngine::new().report(&journal(), &ReportOptions::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["total_trades"], 3);
        assert!(json["avg_holding_time"].is_null());
    }
}
