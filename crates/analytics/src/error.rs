use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Unknown period '{0}': expected day, week, month or year")]
    InvalidPeriod(String),

    #[error("Unknown sort field '{0}': expected date, pnl, coin or outcome")]
    InvalidSortField(String),
}
