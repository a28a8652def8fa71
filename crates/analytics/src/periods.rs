//! Calendar periods: boundaries, filtering and per-period buckets.

use crate::error::AnalyticsError;
use crate::math::percentage;
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeZone};
use core_types::TradeEntry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        };
        f.write_str(name)
    }
}

impl FromStr for Period {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "today" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            _ => Err(AnalyticsError::InvalidPeriod(s.to_string())),
        }
    }
}

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodRange {
    /// The period of the given kind that contains `date`. Weeks start on Monday.
    pub fn containing(period: Period, date: NaiveDate) -> Self {
        match period {
            Period::Day => Self { start: date, end: date },
            Period::Week => {
                let offset = u64::from(date.weekday().num_days_from_monday());
                let start = date.checked_sub_days(Days::new(offset)).unwrap_or(date);
                let end = start.checked_add_days(Days::new(6)).unwrap_or(date);
                Self { start, end }
            }
            Period::Month => {
                let start = date.with_day(1).unwrap_or(date);
                let end = start
                    .checked_add_months(Months::new(1))
                    .and_then(|next| next.pred_opt())
                    .unwrap_or(date);
                Self { start, end }
            }
            Period::Year => {
                let start = date.with_ordinal(1).unwrap_or(date);
                let end = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
                Self { start, end }
            }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Keeps the trades whose date falls inside the `period` containing `now`.
///
/// `now` is interpreted in its own time zone, so "today" is the caller's local day.
/// Trades with an unparsable date never match.
pub fn filter_by_period<Tz: TimeZone>(
    trades: &[TradeEntry],
    period: Period,
    now: &DateTime<Tz>,
) -> Vec<TradeEntry> {
    filter_by_range(trades, PeriodRange::containing(period, now.date_naive()))
}

pub fn filter_by_range(trades: &[TradeEntry], range: PeriodRange) -> Vec<TradeEntry> {
    trades
        .iter()
        .filter(|trade| trade.parsed_date().is_some_and(|date| range.contains(date)))
        .cloned()
        .collect()
}

/// Pairs every trade that has a valid date with that date, stably sorted
/// ascending. Entries sharing a date keep their relative input order.
pub fn chronological(trades: &[TradeEntry]) -> Vec<(NaiveDate, &TradeEntry)> {
    let mut dated: Vec<(NaiveDate, &TradeEntry)> = trades
        .iter()
        .filter_map(|trade| match trade.parsed_date() {
            Some(date) => Some((date, trade)),
            None => {
                tracing::debug!(trade_id = %trade.id, date = %trade.date, "Skipping trade with unparsable date.");
                None
            }
        })
        .collect();
    dated.sort_by_key(|(date, _)| *date);
    dated
}

/// Aggregated performance of the trades inside one calendar period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodBucket {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub trade_count: usize,
    pub wins: usize,
    pub losses: usize,
    pub total_pnl: Decimal,
    pub win_rate: Decimal,
}

impl PeriodBucket {
    fn empty(range: PeriodRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
            trade_count: 0,
            wins: 0,
            losses: 0,
            total_pnl: Decimal::ZERO,
            win_rate: Decimal::ZERO,
        }
    }
}

/// Groups trades into day/week/month/year buckets, ascending by period start.
/// Periods with no trades are not emitted.
pub fn period_performance(trades: &[TradeEntry], period: Period) -> Vec<PeriodBucket> {
    let mut buckets: BTreeMap<NaiveDate, PeriodBucket> = BTreeMap::new();

    for (date, trade) in chronological(trades) {
        let range = PeriodRange::containing(period, date);
        let bucket = buckets
            .entry(range.start)
            .or_insert_with(|| PeriodBucket::empty(range));
        bucket.trade_count += 1;
        bucket.total_pnl = bucket.total_pnl.saturating_add(trade.pnl);
        if trade.is_win() {
            bucket.wins += 1;
        } else {
            bucket.losses += 1;
        }
    }

    buckets
        .into_values()
        .map(|mut bucket| {
            bucket.win_rate = percentage(
                Decimal::from(bucket.wins),
                Decimal::from(bucket.trade_count),
            );
            bucket
        })
        .collect()
}

/// Daily buckets for one calendar month, the data behind the calendar view.
/// An invalid `year`/`month` pair yields no buckets.
pub fn calendar_month(trades: &[TradeEntry], year: i32, month: u32) -> Vec<PeriodBucket> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let in_month = filter_by_range(trades, PeriodRange::containing(Period::Month, first));
    period_performance(&in_month, Period::Day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use core_types::Outcome;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn trade(day: &str, pnl: Decimal) -> TradeEntry {
        let outcome = if pnl.is_sign_negative() { Outcome::Loss } else { Outcome::Win };
        TradeEntry::new(day, pnl, outcome)
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-05-15 is a Wednesday.
        let range = PeriodRange::containing(Period::Week, date(2024, 5, 15));
        assert_eq!(range.start, date(2024, 5, 13));
        assert_eq!(range.end, date(2024, 5, 19));

        // A Sunday belongs to the week that started six days earlier.
        let sunday = PeriodRange::containing(Period::Week, date(2024, 5, 19));
        assert_eq!(sunday.start, date(2024, 5, 13));
    }

    #[test]
    fn month_and_year_boundaries() {
        let feb = PeriodRange::containing(Period::Month, date(2024, 2, 10));
        assert_eq!((feb.start, feb.end), (date(2024, 2, 1), date(2024, 2, 29)));

        let dec = PeriodRange::containing(Period::Month, date(2023, 12, 31));
        assert_eq!((dec.start, dec.end), (date(2023, 12, 1), date(2023, 12, 31)));

        let year = PeriodRange::containing(Period::Year, date(2023, 7, 4));
        assert_eq!((year.start, year.end), (date(2023, 1, 1), date(2023, 12, 31)));
    }

    #[test]
    fn filter_by_day_keeps_only_today() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 18, 30, 0).unwrap();
        let trades = vec![
            trade("2024-05-15", dec!(10)),
            trade("2024-05-14", dec!(20)),
            trade("not a date", dec!(30)),
        ];
        let today = filter_by_period(&trades, Period::Day, &now);
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].pnl, dec!(10));
    }

    #[test]
    fn filter_uses_the_reference_time_zone() {
        // 23:30 UTC on the 14th is already the 15th in UTC+2.
        let now = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 15, 1, 30, 0)
            .unwrap();
        let trades = vec![trade("2024-05-15", dec!(10)), trade("2024-05-14", dec!(20))];
        let today = filter_by_period(&trades, Period::Day, &now);
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].date, "2024-05-15");
    }

    #[test]
    fn filter_by_week_and_month_are_inclusive() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 9, 0, 0).unwrap();
        let trades = vec![
            trade("2024-05-13", dec!(1)),
            trade("2024-05-19", dec!(2)),
            trade("2024-05-20", dec!(3)),
            trade("2024-05-01", dec!(4)),
            trade("2024-04-30", dec!(5)),
        ];
        assert_eq!(filter_by_period(&trades, Period::Week, &now).len(), 2);
        assert_eq!(filter_by_period(&trades, Period::Month, &now).len(), 4);
        assert_eq!(filter_by_period(&trades, Period::Year, &now).len(), 5);
    }

    #[test]
    fn period_parses_from_text() {
        assert_eq!("Week".parse::<Period>(), Ok(Period::Week));
        assert_eq!("today".parse::<Period>(), Ok(Period::Day));
        assert_eq!(
            "quarter".parse::<Period>(),
            Err(AnalyticsError::InvalidPeriod("quarter".to_string()))
        );
    }

    #[test]
    fn chronological_is_stable_and_skips_bad_dates() {
        let trades = vec![
            trade("2024-01-02", dec!(1)),
            trade("2024-01-01", dec!(2)),
            trade("garbage", dec!(3)),
            trade("2024-01-01", dec!(4)),
        ];
        let ordered: Vec<Decimal> = chronological(&trades).iter().map(|(_, t)| t.pnl).collect();
        assert_eq!(ordered, vec![dec!(2), dec!(4), dec!(1)]);
    }

    #[test]
    fn weekly_performance_buckets() {
        let trades = vec![
            trade("2024-05-14", dec!(100)),
            trade("2024-05-06", dec!(-40)),
            trade("2024-05-16", dec!(-20)),
            trade("2024-05-07", dec!(10)),
        ];
        let buckets = period_performance(&trades, Period::Week);
        assert_eq!(buckets.len(), 2);

        assert_eq!(buckets[0].start, date(2024, 5, 6));
        assert_eq!(buckets[0].trade_count, 2);
        assert_eq!(buckets[0].total_pnl, dec!(-30));
        assert_eq!(buckets[0].win_rate, dec!(50));

        assert_eq!(buckets[1].start, date(2024, 5, 13));
        assert_eq!(buckets[1].end, date(2024, 5, 19));
        assert_eq!(buckets[1].total_pnl, dec!(80));
    }

    #[test]
    fn calendar_month_only_covers_that_month() {
        let trades = vec![
            trade("2024-02-01", dec!(5)),
            trade("2024-02-01", dec!(-2)),
            trade("2024-02-29", dec!(7)),
            trade("2024-03-01", dec!(9)),
        ];
        let days = calendar_month(&trades, 2024, 2);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].start, date(2024, 2, 1));
        assert_eq!(days[0].total_pnl, dec!(3));
        assert_eq!(days[0].wins, 1);
        assert_eq!(days[0].losses, 1);
        assert_eq!(days[1].start, date(2024, 2, 29));

        assert!(calendar_month(&trades, 2024, 13).is_empty());
    }
}
