//! Command-line interface for the `courier` binary.

pub mod docs;
pub mod executor;
pub mod generate;
pub mod parser;
pub mod validation;

pub use executor::execute_command;
pub use parser::{Cli, Commands};

use crate::config::{ConfigError, ConfigLoader, Settings};
use crate::logger::init_logger;

/// Load settings from `--config` when given, else from the layered sources
pub fn load_settings(cli: &Cli) -> Result<Settings, ConfigError> {
    let loader = match cli.config {
        Some(ref path) => ConfigLoader::from_file(path),
        None => ConfigLoader::new()?,
    };
    loader.load()
}

/// Install the global subscriber, honoring --verbose/--quiet
pub fn init_logger_from_settings(cli: &Cli, settings: &Settings) -> anyhow::Result<()> {
    let mut config = settings.logger.clone().into_logger_config()?;
    if let Some(level) = cli.log_level_override() {
        config = config.with_level(level);
    }
    init_logger(&config)
}
