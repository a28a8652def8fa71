//! Setup tag normalization and per-setup aggregation.

use chrono::NaiveDate;
use core_types::TradeEntry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Known spellings of the same setup, keyed by their lower-cased form.
/// No canonical name may appear on the left-hand side.
const SETUP_ALIASES: &[(&str, &str)] = &[
    ("break out", "breakout"),
    ("break-out", "breakout"),
    ("bo", "breakout"),
    ("pull back", "pullback"),
    ("pull-back", "pullback"),
    ("retest", "pullback"),
    ("s/r flip", "sr flip"),
    ("support resistance flip", "sr flip"),
    ("reversal trade", "reversal"),
    ("trend reversal", "reversal"),
    ("trend continuation", "continuation"),
    ("scalping", "scalp"),
];

/// Maps a raw setup tag onto its grouping key.
///
/// Lower-cases and trims, then resolves known aliases. Blank input gives an
/// empty key, which aggregation ignores.
pub fn normalize_setup_name(raw: &str) -> String {
    let key = raw.to_lowercase();
    let key = key.trim();
    SETUP_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or_else(|| key.to_string())
}

/// All trades sharing one normalized setup key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupAggregate {
    pub key: String,
    /// Tag text as written on the most recent contributing trade.
    pub display_name: String,
    pub count: usize,
    pub total_pnl: Decimal,
    pub last_trade_date: Option<NaiveDate>,
    pub trades: Vec<TradeEntry>,
}

impl SetupAggregate {
    /// Bigger buckets first, then higher pnl, then more recent activity.
    fn rank(&self, other: &Self) -> Ordering {
        other
            .count
            .cmp(&self.count)
            .then_with(|| other.total_pnl.cmp(&self.total_pnl))
            .then_with(|| other.last_trade_date.cmp(&self.last_trade_date))
    }
}

/// Aggregates every (trade, tag) pair into per-setup buckets, ranked.
///
/// A trade carrying several tags contributes to each of their buckets. Buckets
/// that tie on every ranking key stay in first-seen order.
pub fn setup_breakdown(trades: &[TradeEntry]) -> Vec<SetupAggregate> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<SetupAggregate> = Vec::new();

    for trade in trades {
        let date = trade.parsed_date();
        for tag in trade.setup_tags() {
            let key = normalize_setup_name(tag);
            if key.is_empty() {
                continue;
            }

            let slot = *index.entry(key.clone()).or_insert_with(|| {
                buckets.push(SetupAggregate {
                    key,
                    display_name: tag.to_string(),
                    count: 0,
                    total_pnl: Decimal::ZERO,
                    last_trade_date: date,
                    trades: Vec::new(),
                });
                buckets.len() - 1
            });

            let bucket = &mut buckets[slot];
            bucket.count += 1;
            bucket.total_pnl = bucket.total_pnl.saturating_add(trade.pnl);
            bucket.trades.push(trade.clone());
            if date > bucket.last_trade_date {
                bucket.last_trade_date = date;
                bucket.display_name = tag.to_string();
            }
        }
    }

    buckets.sort_by(SetupAggregate::rank);
    buckets
}

/// The setup the trader relies on most.
///
/// Buckets used more than once win over one-off setups; within the chosen tier the
/// ranking is count, then pnl, then recency. `None` when no trade carries a tag.
pub fn most_traded_setup(trades: &[TradeEntry]) -> Option<SetupAggregate> {
    let ranked = setup_breakdown(trades);
    let has_dominant = ranked.iter().any(|bucket| bucket.count > 1);

    ranked
        .into_iter()
        .filter(|bucket| !has_dominant || bucket.count > 1)
        .min_by(SetupAggregate::rank)
}
