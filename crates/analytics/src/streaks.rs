use crate::periods::chronological;
use core_types::TradeEntry;
use serde::{Deserialize, Serialize};

/// Consecutive-win counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streaks {
    /// Wins since the last loss, at the end of the sequence.
    pub current_streak: usize,
    /// The longest run of wins seen anywhere in the sequence.
    pub longest_streak: usize,
}

impl Streaks {
    fn scan<'a>(trades: impl IntoIterator<Item = &'a TradeEntry>) -> Self {
        trades
            .into_iter()
            .fold(Streaks::default(), |mut streaks, trade| {
                if trade.is_win() {
                    streaks.current_streak += 1;
                    streaks.longest_streak = streaks.longest_streak.max(streaks.current_streak);
                } else {
                    streaks.current_streak = 0;
                }
                streaks
            })
    }
}

/// Counts win streaks in the order the trades are stored.
///
/// The slice order is taken to be the recording order. Use
/// [`compute_streaks_chronological`] when the store does not guarantee it.
pub fn compute_streaks(trades: &[TradeEntry]) -> Streaks {
    Streaks::scan(trades)
}

/// Counts win streaks after a stable sort by trade date.
/// Trades with an unparsable date are left out.
pub fn compute_streaks_chronological(trades: &[TradeEntry]) -> Streaks {
    Streaks::scan(chronological(trades).into_iter().map(|(_, trade)| trade))
}
