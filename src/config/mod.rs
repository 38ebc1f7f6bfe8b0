//! Application settings.
//!
//! Settings come from TOML files and `COURIER_*` environment variables; see
//! [`ConfigLoader`] for the layering rules.

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{ConsoleSettings, FileSettings, LoggerSettings, RouterSettings, Settings};
