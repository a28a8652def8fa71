//! Sample statistics over per-trade pnl.
//!
//! Every helper here needs at least [`MIN_SAMPLE`] trades and answers `None`
//! below that, which is distinct from a computed zero.

use crate::math::{mean, population_std_dev, safe_divide, safe_ratio};
use crate::summary::split_by_pnl_sign;
use core_types::TradeEntry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const MIN_SAMPLE: usize = 2;

fn pnls(trades: &[TradeEntry]) -> Option<Vec<Decimal>> {
    if trades.len() < MIN_SAMPLE {
        return None;
    }
    Some(trades.iter().map(|t| t.pnl).collect())
}

/// `(mean - risk_free_rate) / std_dev` of per-trade pnl, not annualized.
///
/// `None` with fewer than two trades or when every pnl is identical.
pub fn sharpe_ratio(trades: &[TradeEntry], risk_free_rate: Decimal) -> Option<Decimal> {
    let values = pnls(trades)?;
    let mean = mean(&values)?;
    let std_dev = population_std_dev(&values)?;
    safe_ratio(mean.checked_sub(risk_free_rate)?, std_dev)
}

/// Expected pnl per trade: `win_rate * avg_win + (1 - win_rate) * avg_loss`.
///
/// `win_rate` is a fraction from the stored outcomes and `avg_loss` keeps its
/// negative sign, unlike the magnitude used by the risk/reward ratio.
pub fn expectancy(trades: &[TradeEntry]) -> Option<Decimal> {
    if trades.len() < MIN_SAMPLE {
        return None;
    }
    let wins = trades.iter().filter(|t| t.is_win()).count();
    let win_rate = safe_divide(Decimal::from(wins), Decimal::from(trades.len()), Decimal::ZERO);

    let (gains, losses) = split_by_pnl_sign(trades);
    let avg_win = mean(&gains).unwrap_or(Decimal::ZERO);
    let avg_loss = mean(&losses).unwrap_or(Decimal::ZERO);

    Some(win_rate * avg_win + (Decimal::ONE - win_rate) * avg_loss)
}

/// Mean holding time over the trades that recorded one.
pub fn avg_holding_time(trades: &[TradeEntry]) -> Option<Duration> {
    if trades.len() < MIN_SAMPLE {
        return None;
    }
    let held: Vec<Duration> = trades.iter().filter_map(|t| t.holding_time).collect();
    let count = u32::try_from(held.len()).ok().filter(|n| *n > 0)?;
    let total: Duration = held.iter().sum();
    Some(total / count)
}

/// Population standard deviation of per-trade pnl.
pub fn volatility(trades: &[TradeEntry]) -> Option<Decimal> {
    population_std_dev(&pnls(trades)?)
}

/// A trade together with its return on position size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeReturn {
    pub trade: TradeEntry,
    /// `pnl / position_size`.
    pub return_ratio: Decimal,
}

impl TradeReturn {
    pub fn return_pct(&self) -> Decimal {
        self.return_ratio * Decimal::ONE_HUNDRED
    }
}

/// The trade with the best `pnl / position_size`.
///
/// Trades without a usable (present, non-zero) position size cannot be ranked and
/// are skipped. The earliest trade in the slice wins a tie.
pub fn best_trade_by_return(trades: &[TradeEntry]) -> Option<TradeReturn> {
    let mut best: Option<(Decimal, &TradeEntry)> = None;
    for trade in trades {
        let Some(ratio) = trade.return_ratio() else {
            continue;
        };
        if best.is_none_or(|(top, _)| ratio > top) {
            best = Some((ratio, trade));
        }
    }
    best.map(|(return_ratio, trade)| TradeReturn {
        trade: trade.clone(),
        return_ratio,
    })
}
