//! Filtering, sorting and paging of the journal table.

use crate::error::AnalyticsError;
use crate::setups::normalize_setup_name;
use chrono::NaiveDate;
use core_types::{Outcome, TradeEntry};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Date,
    Pnl,
    Coin,
    Outcome,
}

impl FromStr for SortField {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(SortField::Date),
            "pnl" => Ok(SortField::Pnl),
            "coin" => Ok(SortField::Coin),
            "outcome" => Ok(SortField::Outcome),
            _ => Err(AnalyticsError::InvalidSortField(s.to_string())),
        }
    }
}

/// Criteria for one page of the journal. All filters must match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalQuery {
    pub outcome: Option<Outcome>,
    /// Matched against each tag after normalization.
    pub setup: Option<String>,
    pub coin: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Case-insensitive substring over coin, notes, lessons and setup tags.
    pub search: Option<String>,
    pub sort_field: SortField,
    pub descending: bool,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for JournalQuery {
    fn default() -> Self {
        Self {
            outcome: None,
            setup: None,
            coin: None,
            from: None,
            to: None,
            search: None,
            sort_field: SortField::Date,
            descending: true,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalPage {
    pub entries: Vec<TradeEntry>,
    /// Matching trades across all pages.
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub page_count: usize,
}

impl JournalQuery {
    fn matches(&self, trade: &TradeEntry) -> bool {
        if self.outcome.is_some_and(|outcome| trade.outcome != outcome) {
            return false;
        }

        if let Some(setup) = &self.setup {
            let wanted = normalize_setup_name(setup);
            if !trade.setup_tags().any(|tag| normalize_setup_name(tag) == wanted) {
                return false;
            }
        }

        if let Some(coin) = &self.coin {
            let wanted = coin.trim();
            if !trade
                .coin
                .as_deref()
                .is_some_and(|c| c.trim().eq_ignore_ascii_case(wanted))
            {
                return false;
            }
        }

        if self.from.is_some() || self.to.is_some() {
            let Some(date) = trade.parsed_date() else {
                return false;
            };
            if self.from.is_some_and(|from| date < from) || self.to.is_some_and(|to| date > to) {
                return false;
            }
        }

        if let Some(needle) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = needle.to_lowercase();
            let hit = |text: &str| text.to_lowercase().contains(&needle);
            let found = trade.coin.as_deref().is_some_and(hit)
                || trade.notes.as_deref().is_some_and(hit)
                || trade.lessons.as_deref().is_some_and(hit)
                || trade.setup.iter().any(|tag| hit(tag));
            if !found {
                return false;
            }
        }

        true
    }

    fn compare(&self, a: &TradeEntry, b: &TradeEntry) -> Ordering {
        let ordering = match self.sort_field {
            SortField::Date => a.parsed_date().cmp(&b.parsed_date()),
            SortField::Pnl => a.pnl.cmp(&b.pnl),
            SortField::Coin => a
                .coin
                .as_deref()
                .map(str::to_lowercase)
                .cmp(&b.coin.as_deref().map(str::to_lowercase)),
            SortField::Outcome => a.outcome.as_str().cmp(b.outcome.as_str()),
        };
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// Applies the query to a snapshot of the journal and returns the requested page.
///
/// Sorting is stable. A page past the end comes back empty with the real totals.
pub fn query_journal(trades: &[TradeEntry], query: &JournalQuery) -> JournalPage {
    let mut matching: Vec<&TradeEntry> = trades.iter().filter(|t| query.matches(t)).collect();
    matching.sort_by(|a, b| query.compare(a, b));

    let page_size = if query.page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        query.page_size
    };
    let page = query.page.max(1);
    let total = matching.len();

    let entries = matching
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .cloned()
        .collect();

    JournalPage {
        entries,
        total,
        page,
        page_size,
        page_count: total.div_ceil(page_size),
    }
}
