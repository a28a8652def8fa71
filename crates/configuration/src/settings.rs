use crate::error::ConfigError;
use rust_decimal::Decimal;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// User preferences that feed the analytics.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Starting point of the equity curve. Zero and negative values are allowed.
    pub initial_capital: Decimal,
    /// Display currency code (e.g. "USD").
    pub currency: String,
    /// `chrono` format string used when printing dates.
    pub date_format: String,
    /// Setup tags offered for new trades in addition to those already used.
    pub custom_tags: Vec<String>,
    /// Instruments offered for new trades in addition to those already used.
    pub custom_coins: Vec<String>,
    /// Subtracted from the mean pnl in the Sharpe ratio.
    pub risk_free_rate: Decimal,
    /// Sort trades by date before counting streaks. Off by default, which
    /// counts them in the order the store returns.
    pub chronological_streaks: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_capital: Decimal::ZERO,
            currency: "USD".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            custom_tags: Vec::new(),
            custom_coins: Vec::new(),
            risk_free_rate: Decimal::ZERO,
            chronological_streaks: false,
        }
    }
}

/// Where the trade store lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://journal.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settings.currency.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "settings.currency must not be empty".to_string(),
            ));
        }
        if self.settings.date_format.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "settings.date_format must not be empty".to_string(),
            ));
        }
        if self.store.database_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "store.database_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::load_config;
    use crate::error::ConfigError;
    use rust_decimal_macros::dec;
    use std::fs;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("journal.toml")).unwrap();
        assert_eq!(config.settings.initial_capital, dec!(0));
        assert_eq!(config.settings.currency, "USD");
        assert_eq!(config.store.database_url, "sqlite://journal.db");
        assert_eq!(config.logging.level, "info");
        assert!(!config.settings.chronological_streaks);
    }

    #[test]
    fn reads_values_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.toml");
        fs::write(
            &path,
            r#"
[settings]
initial_capital = "2500.50"
currency = "EUR"
custom_tags = ["Breakout", "Scalp"]
chronological_streaks = true

[store]
database_url = "sqlite://trades.db"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.settings.initial_capital, dec!(2500.50));
        assert_eq!(config.settings.currency, "EUR");
        assert_eq!(config.settings.custom_tags, vec!["Breakout", "Scalp"]);
        assert!(config.settings.chronological_streaks);
        assert_eq!(config.settings.date_format, "%Y-%m-%d");
        assert_eq!(config.store.database_url, "sqlite://trades.db");
    }

    #[test]
    fn rejects_empty_currency() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.toml");
        fs::write(&path, "[settings]\ncurrency = \"  \"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
