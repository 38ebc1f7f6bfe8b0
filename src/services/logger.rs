//! Writes notifications to the application log.

use std::sync::LazyLock;

use async_trait::async_trait;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use super::params::Params;
use super::service::{Service, enums_of, fields_of, with_params};
use crate::config_enum;
use crate::error::AppResult;
use crate::format::{
    Configurable, FieldDescriptor, FieldModel, Location, PassThrough, ServiceConfig, decode,
    encode,
};

config_enum! {
    /// Severity of the emitted log event
    pub enum LogLevel {
        Trace = "trace",
        Debug = "debug",
        Info = "info",
        Warn = "warn",
        Error = "error",
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub pass_through: PassThrough,
}

static LOGGER_FIELDS: LazyLock<FieldModel<LoggerConfig>> = LazyLock::new(|| {
    FieldModel::builder()
        .field("level", crate::accessor!(LoggerConfig, level))
        .description("Level of the log event carrying the message")
        .default_value("info")
        .build()
});

impl Configurable for LoggerConfig {
    fn model() -> &'static FieldModel<Self> {
        &LOGGER_FIELDS
    }
}

impl ServiceConfig for LoggerConfig {
    const SCHEME: &'static str = "logger";

    fn location(&self) -> Location {
        Location::default()
    }

    fn set_location(&mut self, _location: &Location) -> AppResult<()> {
        Ok(())
    }

    fn pass_through(&self) -> &PassThrough {
        &self.pass_through
    }

    fn pass_through_mut(&mut self) -> &mut PassThrough {
        &mut self.pass_through
    }
}

/// Logger service
///
/// Emits each message as a `tracing` event under the `courier::notify`
/// target, so it lands wherever the application log goes.
#[derive(Debug, Default)]
pub struct LoggerService {
    config: LoggerConfig,
}

impl LoggerService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Service for LoggerService {
    fn scheme(&self) -> &'static str {
        LoggerConfig::SCHEME
    }

    fn initialize(&mut self, address: &Url) -> AppResult<()> {
        self.config = decode(address)?;
        Ok(())
    }

    async fn send(&self, message: &str, params: &Params) -> AppResult<()> {
        let config = with_params(&self.config, params)?;
        let title = params.title().unwrap_or_default();

        match config.level {
            LogLevel::Trace => trace!(target: "courier::notify", title, "{}", message),
            LogLevel::Debug => debug!(target: "courier::notify", title, "{}", message),
            LogLevel::Info => info!(target: "courier::notify", title, "{}", message),
            LogLevel::Warn => warn!(target: "courier::notify", title, "{}", message),
            LogLevel::Error => error!(target: "courier::notify", title, "{}", message),
        }
        Ok(())
    }

    fn address(&self) -> AppResult<Url> {
        encode(&self.config)
    }

    fn config_fields(&self) -> Vec<&'static FieldDescriptor> {
        fields_of::<LoggerConfig>()
    }

    fn config_enums(&self) -> Vec<&'static FieldDescriptor> {
        enums_of::<LoggerConfig>()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::AppError;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture() -> (Captured, tracing::subscriber::DefaultGuard) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        (captured, tracing::subscriber::set_default(subscriber))
    }

    fn service(address: &str) -> LoggerService {
        let mut service = LoggerService::new();
        service.initialize(&Url::parse(address).unwrap()).unwrap();
        service
    }

    #[tokio::test]
    async fn test_message_is_written_to_log() {
        let (captured, _guard) = capture();
        let service = service("logger://");

        service
            .send("Failed - Requires Toaster Repair Level 10", &Params::new())
            .await
            .unwrap();

        let output = captured.contents();
        assert!(output.contains("Failed - Requires Toaster Repair Level 10"));
        assert!(output.contains("INFO"));
    }

    #[tokio::test]
    async fn test_level_from_address_and_params() {
        let (captured, _guard) = capture();
        let service = service("logger://?level=WARN");
        assert_eq!(service.config.level, LogLevel::Warn);

        let params: Params = [("level", "error")].into_iter().collect();
        service.send("overheating", &params).await.unwrap();

        assert!(captured.contents().contains("ERROR"));
        assert_eq!(params.get("level"), Some("error"));
        assert_eq!(service.config.level, LogLevel::Warn);
    }

    #[tokio::test]
    async fn test_invalid_level_param_fails_send() {
        let service = service("logger://");
        let params: Params = [("level", "loud")].into_iter().collect();
        assert!(matches!(
            service.send("x", &params).await,
            Err(AppError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_address_round_trip() {
        assert_eq!(service("logger://").address().unwrap().as_str(), "logger://");
        assert_eq!(
            service("logger://?level=debug").address().unwrap().as_str(),
            "logger://?level=debug"
        );
    }
}
