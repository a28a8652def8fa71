use crate::enums::Outcome;
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

pub type TradeId = Uuid;

/// The only date layout the journal writes. Anything else is tolerated on read
/// but may fail to parse, in which case the entry drops out of date-based views.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One recorded trade in the journal.
///
/// `date` is kept as the raw text the user stored. Parsing happens on demand via
/// [`TradeEntry::parsed_date`] so that a malformed value excludes the entry from
/// date-based calculations instead of failing the whole load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeEntry {
    pub id: TradeId,
    pub date: String,
    /// Free-text setup tags. A trade may carry any number of them.
    #[serde(default)]
    pub setup: Vec<String>,
    #[serde(default)]
    pub coin: Option<String>,
    pub pnl: Decimal,
    pub outcome: Outcome,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub position_size: Option<Decimal>,
    #[serde(default)]
    pub leverage: Option<Decimal>,
    #[serde(default, with = "humantime_serde")]
    pub holding_time: Option<Duration>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub lessons: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl TradeEntry {
    /// Creates a new entry with a fresh id and every optional field empty.
    pub fn new(date: impl Into<String>, pnl: Decimal, outcome: Outcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: date.into(),
            setup: Vec::new(),
            coin: None,
            pnl,
            outcome,
            mood: None,
            position_size: None,
            leverage: None,
            holding_time: None,
            images: Vec::new(),
            notes: None,
            lessons: None,
            link: None,
        }
    }

    pub fn with_setup<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.setup = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_coin(mut self, coin: impl Into<String>) -> Self {
        self.coin = Some(coin.into());
        self
    }

    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = Some(mood.into());
        self
    }

    pub fn with_position(mut self, position_size: Decimal, leverage: Option<Decimal>) -> Self {
        self.position_size = Some(position_size);
        self.leverage = leverage;
        self
    }

    pub fn with_holding_time(mut self, holding_time: Duration) -> Self {
        self.holding_time = Some(holding_time);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Parses the stored date.
    ///
    /// Accepts a plain `YYYY-MM-DD` date, and as a fallback an RFC 3339 timestamp
    /// (whose calendar date in its own offset is used). Returns `None` otherwise.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let raw = self.date.trim();
        NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
    }

    pub fn is_win(&self) -> bool {
        self.outcome.is_win()
    }

    /// Raw return on the position: `pnl / position_size`.
    ///
    /// `None` when the position size is missing or zero.
    pub fn return_ratio(&self) -> Option<Decimal> {
        let size = self.position_size?;
        self.pnl.checked_div(size)
    }

    /// Percentage return on the margin committed to the trade.
    ///
    /// Margin is `position_size / leverage`; a missing or non-positive leverage counts as 1x.
    pub fn return_on_margin_pct(&self) -> Option<Decimal> {
        let size = self.position_size?;
        let leverage = self
            .leverage
            .filter(|l| l.is_sign_positive() && !l.is_zero())
            .unwrap_or(Decimal::ONE);
        let margin = size.checked_div(leverage)?;
        self.pnl
            .checked_div(margin)
            .map(|ratio| ratio * Decimal::ONE_HUNDRED)
    }

    /// Iterates over the non-blank setup tags, trimmed.
    pub fn setup_tags(&self) -> impl Iterator<Item = &str> {
        self.setup
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
    }
}
