use crate::math::percentage;
use crate::periods::chronological;
use chrono::NaiveDate;
use core_types::TradeEntry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account balance after one trade, with the highest balance reached so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: Decimal,
    pub peak: Decimal,
}

/// Worst decline from a running peak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawdownStats {
    /// Always `<= 0`.
    pub max_drawdown: Decimal,
    /// Always `>= 0`.
    pub max_drawdown_percent: Decimal,
    pub peak_equity: Decimal,
}

impl Default for DrawdownStats {
    fn default() -> Self {
        Self {
            max_drawdown: Decimal::ZERO,
            max_drawdown_percent: Decimal::ZERO,
            peak_equity: Decimal::ZERO,
        }
    }
}

/// Builds the equity curve: one point per trade in date order.
///
/// The caller's slice is left untouched; ordering happens on a sorted view where
/// trades sharing a date keep their input order. Trades with an unparsable date
/// cannot be placed on the curve and are left out.
pub fn build_equity_curve(trades: &[TradeEntry], initial_capital: Decimal) -> Vec<EquityPoint> {
    let mut equity = initial_capital;
    let mut peak = initial_capital;

    chronological(trades)
        .into_iter()
        .map(|(date, trade)| {
            equity = equity.saturating_add(trade.pnl);
            peak = peak.max(equity);
            EquityPoint { date, equity, peak }
        })
        .collect()
}

/// Computes the maximum drawdown of a curve.
///
/// The running peak is recomputed from the equity values starting at zero, so the
/// curve's own `peak` field is ignored.
pub fn max_drawdown(curve: &[EquityPoint]) -> DrawdownStats {
    if curve.is_empty() {
        return DrawdownStats::default();
    }

    let mut peak_equity = Decimal::ZERO;
    let mut max_drawdown = Decimal::ZERO;

    for point in curve {
        peak_equity = peak_equity.max(point.equity);
        let drawdown = point.equity.saturating_sub(peak_equity);
        max_drawdown = max_drawdown.min(drawdown);
    }

    DrawdownStats {
        max_drawdown,
        max_drawdown_percent: percentage(max_drawdown.abs(), peak_equity),
        peak_equity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Outcome;
    use rust_decimal_macros::dec;

    #[test]
    fn win_then_loss_from_initial_capital() {
        let trades = vec![
            TradeEntry::new("2024-01-01", dec!(100), Outcome::Win),
            TradeEntry::new("2024-01-02", dec!(-50), Outcome::Loss),
        ];
        let curve = build_equity_curve(&trades, dec!(1000));
        let pairs: Vec<(Decimal, Decimal)> = curve.iter().map(|p| (p.equity, p.peak)).collect();
        assert_eq!(pairs, vec![(dec!(1100), dec!(1100)), (dec!(1050), dec!(1100))]);

        let dd = max_drawdown(&curve);
        assert_eq!(dd.max_drawdown, dec!(-50));
        assert_eq!(dd.peak_equity, dec!(1100));
        assert!((dd.max_drawdown_percent - dec!(4.5454545454)).abs() < dec!(0.0000001));
    }

    #[test]
    fn curve_is_sorted_without_touching_input() {
        let trades = vec![
            TradeEntry::new("2024-01-03", dec!(-30), Outcome::Loss),
            TradeEntry::new("2024-01-01", dec!(10), Outcome::Win),
            TradeEntry::new("2024-01-02", dec!(20), Outcome::Win),
        ];
        let snapshot = trades.clone();
        let curve = build_equity_curve(&trades, dec!(0));

        assert_eq!(trades, snapshot);
        let equities: Vec<Decimal> = curve.iter().map(|p| p.equity).collect();
        assert_eq!(equities, vec![dec!(10), dec!(30), dec!(0)]);
        assert_eq!(curve[2].peak, dec!(30));
    }

    #[test]
    fn peak_starts_at_initial_capital() {
        let trades = vec![TradeEntry::new("2024-01-01", dec!(-200), Outcome::Loss)];
        let curve = build_equity_curve(&trades, dec!(500));
        assert_eq!(curve[0].equity, dec!(300));
        assert_eq!(curve[0].peak, dec!(500));
    }

    #[test]
    fn negative_capital_is_accepted() {
        let trades = vec![TradeEntry::new("2024-01-01", dec!(50), Outcome::Win)];
        let curve = build_equity_curve(&trades, dec!(-100));
        assert_eq!(curve[0].equity, dec!(-50));
        assert_eq!(curve[0].peak, dec!(-50));
    }

    #[test]
    fn equity_clamps_at_decimal_bounds() {
        let trades = vec![
            TradeEntry::new("2024-01-01", dec!(1), Outcome::Win),
            TradeEntry::new("2024-01-02", Decimal::MIN, Outcome::Loss),
        ];
        let curve = build_equity_curve(&trades, Decimal::MAX);
        assert_eq!(curve[0].equity, Decimal::MAX);
        assert_eq!(curve[1].equity, dec!(0));

        let dd = max_drawdown(&[
            EquityPoint { date: curve[0].date, equity: Decimal::MAX, peak: Decimal::MAX },
            EquityPoint { date: curve[1].date, equity: Decimal::MIN, peak: Decimal::MAX },
        ]);
        assert_eq!(dd.max_drawdown, Decimal::MIN);
        assert_eq!(dd.peak_equity, Decimal::MAX);
    }

    #[test]
    fn empty_inputs() {
        assert!(build_equity_curve(&[], dec!(1000)).is_empty());
        assert_eq!(max_drawdown(&[]), DrawdownStats::default());
    }

    #[test]
    fn drawdown_ignores_stored_peak() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let curve = vec![
            EquityPoint { date, equity: dec!(200), peak: dec!(9999) },
            EquityPoint { date, equity: dec!(150), peak: dec!(9999) },
            EquityPoint { date, equity: dec!(250), peak: dec!(9999) },
            EquityPoint { date, equity: dec!(100), peak: dec!(9999) },
        ];
        let dd = max_drawdown(&curve);
        assert_eq!(dd.max_drawdown, dec!(-150));
        assert_eq!(dd.peak_equity, dec!(250));
        assert_eq!(dd.max_drawdown_percent, dec!(60));
    }

    #[test]
    fn all_negative_curve_measures_from_zero() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let curve = vec![
            EquityPoint { date, equity: dec!(-10), peak: dec!(-10) },
            EquityPoint { date, equity: dec!(-40), peak: dec!(-10) },
        ];
        let dd = max_drawdown(&curve);
        assert_eq!(dd.max_drawdown, dec!(-40));
        assert_eq!(dd.peak_equity, dec!(0));
        assert_eq!(dd.max_drawdown_percent, dec!(0));
    }
}
