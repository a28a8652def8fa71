use crate::math::{mean, percentage, safe_divide, saturating_sum};
use core_types::TradeEntry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Headline numbers for a set of trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub total_pnl: Decimal,
    /// Percentage in `[0, 100]`, classified by the stored outcome.
    pub win_rate: Decimal,
    pub avg_pnl: Decimal,
    /// Mean pnl of the trades with `pnl > 0`.
    pub avg_win: Decimal,
    /// Mean magnitude of the trades with `pnl < 0`; never negative.
    pub avg_loss: Decimal,
    /// `avg_win / avg_loss`, zero while there are no losses to compare against.
    pub risk_reward_ratio: Decimal,
}

/// Pnl values of the winning (`pnl > 0`) and losing (`pnl < 0`) trades.
pub(crate) fn split_by_pnl_sign(trades: &[TradeEntry]) -> (Vec<Decimal>, Vec<Decimal>) {
    let gains = trades
        .iter()
        .map(|t| t.pnl)
        .filter(|pnl| *pnl > Decimal::ZERO)
        .collect();
    let losses = trades
        .iter()
        .map(|t| t.pnl)
        .filter(|pnl| *pnl < Decimal::ZERO)
        .collect();
    (gains, losses)
}

pub fn summary_stats(trades: &[TradeEntry]) -> SummaryStats {
    let total_trades = trades.len();
    let wins = trades.iter().filter(|t| t.is_win()).count();
    let total_pnl = saturating_sum(trades.iter().map(|t| t.pnl));

    let (gains, losses) = split_by_pnl_sign(trades);
    let avg_win = mean(&gains).unwrap_or(Decimal::ZERO);
    let avg_loss = mean(&losses).map(|l| l.abs()).unwrap_or(Decimal::ZERO);

    SummaryStats {
        total_trades,
        wins,
        losses: total_trades - wins,
        total_pnl,
        win_rate: percentage(Decimal::from(wins), Decimal::from(total_trades)),
        avg_pnl: safe_divide(total_pnl, Decimal::from(total_trades), Decimal::ZERO),
        avg_win,
        avg_loss,
        risk_reward_ratio: safe_divide(avg_win, avg_loss, Decimal::ZERO),
    }
}
