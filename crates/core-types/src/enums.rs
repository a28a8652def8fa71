use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The recorded result of a trade.
///
/// The stored outcome is trusted for win/loss classification; it is not
/// cross-checked against the sign of the trade's pnl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Win)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "win" | "w" => Ok(Outcome::Win),
            "loss" | "l" => Ok(Outcome::Loss),
            other => Err(CoreError::InvalidInput(
                "outcome".to_string(),
                format!("expected 'win' or 'loss', got '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("WIN".parse::<Outcome>().unwrap(), Outcome::Win);
        assert_eq!(" loss ".parse::<Outcome>().unwrap(), Outcome::Loss);
        assert!("breakeven".parse::<Outcome>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Outcome::Loss).unwrap(), "\"loss\"");
    }
}
