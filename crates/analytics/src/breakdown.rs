use crate::math::percentage;
use crate::setups::SetupAggregate;
use core_types::TradeEntry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-group performance for one value of a free-text trade attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAggregate {
    /// The value as first written in the journal.
    pub key: String,
    pub count: usize,
    pub wins: usize,
    pub losses: usize,
    pub total_pnl: Decimal,
    pub win_rate: Decimal,
}

impl From<&SetupAggregate> for GroupAggregate {
    fn from(setup: &SetupAggregate) -> Self {
        let wins = setup.trades.iter().filter(|t| t.is_win()).count();
        Self {
            key: setup.display_name.clone(),
            count: setup.count,
            wins,
            losses: setup.trades.len() - wins,
            total_pnl: setup.total_pnl,
            win_rate: percentage(Decimal::from(wins), Decimal::from(setup.trades.len())),
        }
    }
}

/// Groups trades by a case-insensitive attribute.
///
/// Trades whose attribute is missing or blank belong to no group. Results are
/// sorted by count, then pnl (both descending), then key.
pub fn breakdown_by<F>(trades: &[TradeEntry], attribute: F) -> Vec<GroupAggregate>
where
    F: Fn(&TradeEntry) -> Option<&str>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<GroupAggregate> = Vec::new();

    for trade in trades {
        let Some(value) = attribute(trade).map(str::trim).filter(|v| !v.is_empty()) else {
            continue;
        };
        let slot = *index.entry(value.to_lowercase()).or_insert_with(|| {
            groups.push(GroupAggregate {
                key: value.to_string(),
                count: 0,
                wins: 0,
                losses: 0,
                total_pnl: Decimal::ZERO,
                win_rate: Decimal::ZERO,
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.count += 1;
        group.total_pnl = group.total_pnl.saturating_add(trade.pnl);
        if trade.is_win() {
            group.wins += 1;
        } else {
            group.losses += 1;
        }
    }

    for group in &mut groups {
        group.win_rate = percentage(Decimal::from(group.wins), Decimal::from(group.count));
    }
    groups.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| b.total_pnl.cmp(&a.total_pnl))
            .then_with(|| a.key.cmp(&b.key))
    });
    groups
}

pub fn breakdown_by_coin(trades: &[TradeEntry]) -> Vec<GroupAggregate> {
    breakdown_by(trades, |t| t.coin.as_deref())
}

pub fn breakdown_by_mood(trades: &[TradeEntry]) -> Vec<GroupAggregate> {
    breakdown_by(trades, |t| t.mood.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Outcome;
    use rust_decimal_macros::dec;

    #[test]
    fn coins_group_case_insensitively() {
        let trades = vec![
            TradeEntry::new("2024-01-01", dec!(10), Outcome::Win).with_coin("BTC"),
            TradeEntry::new("2024-01-02", dec!(-4), Outcome::Loss).with_coin("btc "),
            TradeEntry::new("2024-01-03", dec!(7), Outcome::Win).with_coin("ETH"),
            TradeEntry::new("2024-01-04", dec!(7), Outcome::Win),
        ];
        let groups = breakdown_by_coin(&trades);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "BTC");
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].total_pnl, dec!(6));
        assert_eq!(groups[0].win_rate, dec!(50));
        assert_eq!(groups[1].key, "ETH");
    }

    #[test]
    fn setup_bucket_converts_to_group() {
        let trades = vec![
            TradeEntry::new("2024-01-01", dec!(10), Outcome::Win).with_setup(["Breakout"]),
            TradeEntry::new("2024-01-02", dec!(-4), Outcome::Loss).with_setup(["breakout"]),
        ];
        let setups = crate::setups::setup_breakdown(&trades);
        let group = GroupAggregate::from(&setups[0]);
        assert_eq!(group.key, "breakout");
        assert_eq!(group.count, 2);
        assert_eq!(group.wins, 1);
        assert_eq!(group.win_rate, dec!(50));
    }

    #[test]
    fn moods_tie_break_on_pnl_then_name() {
        let trades = vec![
            TradeEntry::new("2024-01-01", dec!(5), Outcome::Win).with_mood("calm"),
            TradeEntry::new("2024-01-02", dec!(-5), Outcome::Loss).with_mood("FOMO"),
            TradeEntry::new("2024-01-03", dec!(5), Outcome::Win).with_mood("bored"),
            TradeEntry::new("2024-01-04", dec!(1), Outcome::Win).with_mood(""),
        ];
        let keys: Vec<String> = breakdown_by_mood(&trades).into_iter().map(|g| g.key).collect();
        assert_eq!(keys, vec!["bored", "calm", "FOMO"]);
    }
}
