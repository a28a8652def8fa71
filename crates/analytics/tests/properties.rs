use analytics::{
    build_equity_curve, compute_streaks, max_drawdown, most_traded_setup, normalize_setup_name,
    summary_stats,
};
use chrono::{Days, NaiveDate};
use core_types::{Outcome, TradeEntry};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn arb_trade() -> impl Strategy<Value = TradeEntry> {
    let tags = prop::collection::vec(
        prop::sample::select(vec!["Breakout", "break out", "Scalp", "Pullback", " ", "Range"]),
        0..3,
    );
    (0u64..60, -50_000i64..50_000, any::<bool>(), tags).prop_map(|(day, cents, win, tags)| {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(day))
            .unwrap();
        let outcome = if win { Outcome::Win } else { Outcome::Loss };
        TradeEntry::new(date.format("%Y-%m-%d").to_string(), Decimal::new(cents, 2), outcome)
            .with_setup(tags)
    })
}

fn arb_trades() -> impl Strategy<Value = Vec<TradeEntry>> {
    prop::collection::vec(arb_trade(), 0..40)
}

proptest! {
    #[test]
    fn equity_peak_dominates_and_never_falls(
        trades in arb_trades(),
        capital in -100_000i64..100_000,
    ) {
        let curve = build_equity_curve(&trades, Decimal::new(capital, 2));
        prop_assert_eq!(curve.len(), trades.len());
        for point in &curve {
            prop_assert!(point.peak >= point.equity);
        }
        for window in curve.windows(2) {
            prop_assert!(window[1].peak >= window[0].peak);
        }
    }

    #[test]
    fn drawdown_signs(trades in arb_trades(), capital in 0i64..100_000) {
        let curve = build_equity_curve(&trades, Decimal::new(capital, 2));
        let dd = max_drawdown(&curve);
        prop_assert!(dd.max_drawdown <= Decimal::ZERO);
        prop_assert!(dd.max_drawdown_percent >= Decimal::ZERO);
        if curve.is_empty() {
            prop_assert_eq!(dd.max_drawdown, Decimal::ZERO);
            prop_assert_eq!(dd.max_drawdown_percent, Decimal::ZERO);
        }
    }

    #[test]
    fn win_rate_is_a_percentage(trades in arb_trades()) {
        let stats = summary_stats(&trades);
        prop_assert!(stats.win_rate >= Decimal::ZERO);
        prop_assert!(stats.win_rate <= Decimal::ONE_HUNDRED);
        if trades.is_empty() {
            prop_assert_eq!(stats.win_rate, Decimal::ZERO);
        }
    }

    #[test]
    fn most_traded_setup_is_repeatable(trades in arb_trades()) {
        let snapshot = trades.clone();
        let first = most_traded_setup(&trades);
        let second = most_traded_setup(&trades);
        prop_assert_eq!(first, second);
        prop_assert_eq!(trades, snapshot);
    }

    #[test]
    fn normalization_is_idempotent(raw in "\\PC{0,24}") {
        let once = normalize_setup_name(&raw);
        prop_assert_eq!(normalize_setup_name(&once), once);
    }

    #[test]
    fn longest_streak_bounds_current(trades in arb_trades()) {
        let streaks = compute_streaks(&trades);
        prop_assert!(streaks.longest_streak >= streaks.current_streak);
        prop_assert!(streaks.longest_streak <= trades.len());
    }
}
