use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{Config, LoggingConfig, Settings, StoreConfig};

/// Prefix of the environment variables that override file values,
/// e.g. `JOURNAL__SETTINGS__INITIAL_CAPITAL=2500`.
pub const ENV_PREFIX: &str = "JOURNAL";

/// Loads the application configuration.
///
/// Sources are layered: built-in defaults, then the TOML file at `path` if it
/// exists, then `JOURNAL__*` environment variables. The result is validated
/// before it is returned.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(path = %path.display(), "Configuration loaded.");
    Ok(config)
}
