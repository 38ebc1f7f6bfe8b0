//! Settings validation

use url::Url;

use crate::config::error::ConfigError;
use crate::config::settings::{FileSettings, LoggerSettings, Settings};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl LoggerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.level",
                format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        self.file.validate()
    }
}

impl FileSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.file.format",
                format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            ));
        }

        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "Log file path is required when file output is enabled.",
            ));
        }

        Ok(())
    }
}

impl Settings {
    /// Validate every section.
    ///
    /// Targets only need to parse as URLs here; service-level checks happen
    /// when the router initializes them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logger.validate()?;

        for (index, target) in self.targets.iter().enumerate() {
            Url::parse(target.trim()).map_err(|e| {
                ConfigError::validation(format!("targets[{}]", index), e.to_string())
            })?;
        }

        Ok(())
    }
}
