//! Bark push notifications.
//!
//! Sends push notifications to iOS devices through a Bark server.
//!
//! Bark API Reference: https://github.com/Finb/Bark

use std::sync::LazyLock;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::params::Params;
use super::service::{Service, enums_of, fields_of, with_params};
use crate::config_enum;
use crate::error::{AppError, AppResult};
use crate::external::{HTTP_CLIENT, check_response};
use crate::format::{
    Configurable, FieldDescriptor, FieldModel, Location, PassThrough, ServiceConfig, decode,
    encode,
};

config_enum! {
    /// Interruption level of the notification
    pub enum BarkLevel {
        Active = "active",
        TimeSensitive = "timeSensitive",
        Passive = "passive",
    }
}

/// Bark configuration
///
/// `bark://:devicekey@host[:port][/path]?...`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarkConfig {
    pub device_key: String,
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
    pub title: String,
    pub badge: i64,
    pub category: String,
    pub copy: String,
    pub group: String,
    pub icon: String,
    pub level: BarkLevel,
    pub scheme: String,
    pub sound: String,
    pub url: String,
    pub pass_through: PassThrough,
}

static BARK_FIELDS: LazyLock<FieldModel<BarkConfig>> = LazyLock::new(|| {
    FieldModel::builder()
        .field("badge", crate::accessor!(BarkConfig, badge))
        .description("The number displayed next to App icon")
        .field("category", crate::accessor!(BarkConfig, category))
        .description("Reserved field, no use yet")
        .field("copy", crate::accessor!(BarkConfig, copy))
        .description("The value to be copied")
        .field("group", crate::accessor!(BarkConfig, group))
        .description("The group of the notification")
        .field("icon", crate::accessor!(BarkConfig, icon))
        .description("An url to the icon, available only on iOS 15 or later")
        .field("level", crate::accessor!(BarkConfig, level))
        .description("Interruption level")
        .default_value("active")
        .field("scheme", crate::accessor!(BarkConfig, scheme))
        .description("Server protocol, http or https")
        .default_value("https")
        .field("sound", crate::accessor!(BarkConfig, sound))
        .description("Value from https://github.com/Finb/Bark/tree/master/Sounds")
        .field("title", crate::accessor!(BarkConfig, title))
        .description("Notification title, optionally set by the sender")
        .field("url", crate::accessor!(BarkConfig, url))
        .description("Url that will jump when click notification")
        .build()
});

impl Configurable for BarkConfig {
    fn model() -> &'static FieldModel<Self> {
        &BARK_FIELDS
    }
}

impl ServiceConfig for BarkConfig {
    const SCHEME: &'static str = "bark";

    fn location(&self) -> Location {
        Location {
            password: Some(self.device_key.clone()),
            host: self.host.clone(),
            port: self.port,
            path: self.path.clone(),
            ..Default::default()
        }
    }

    fn set_location(&mut self, location: &Location) -> AppResult<()> {
        self.device_key = location.password.clone().unwrap_or_default();
        self.host = location.host.clone();
        self.port = location.port;
        self.path = location.path.clone();
        Ok(())
    }

    fn pass_through(&self) -> &PassThrough {
        &self.pass_through
    }

    fn pass_through_mut(&mut self) -> &mut PassThrough {
        &mut self.pass_through
    }

    fn finalize(&mut self) -> AppResult<()> {
        if self.device_key.is_empty() {
            return Err(AppError::MissingRequiredField {
                field: "devicekey".to_string(),
            });
        }
        if self.host.is_empty() {
            return Err(AppError::invalid_address("bark server host is missing"));
        }
        if self.scheme != "http" && self.scheme != "https" {
            return Err(AppError::invalid_value(
                "scheme",
                self.scheme.as_str(),
                "must be http or https",
            ));
        }
        Ok(())
    }
}

impl BarkConfig {
    /// Push endpoint of the configured Bark server
    pub fn api_url(&self) -> String {
        let port = self.port.map(|p| format!(":{}", p)).unwrap_or_default();
        format!(
            "{}://{}{}{}/push",
            self.scheme,
            self.host,
            port,
            self.path.trim_end_matches('/')
        )
    }
}

/// Bark service
#[derive(Debug, Default)]
pub struct BarkService {
    config: BarkConfig,
}

impl BarkService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the request body for the Bark push API
    fn build_request_body(config: &BarkConfig, message: &str) -> serde_json::Value {
        let mut body = json!({
            "body": message,
            "device_key": config.device_key,
            "level": config.level.as_str(),
        });

        // Add optional fields
        let optional = [
            ("title", &config.title),
            ("category", &config.category),
            ("copy", &config.copy),
            ("group", &config.group),
            ("icon", &config.icon),
            ("sound", &config.sound),
            ("url", &config.url),
        ];
        for (key, value) in optional {
            if !value.is_empty() {
                body[key] = json!(value);
            }
        }

        if config.badge > 0 {
            body["badge"] = json!(config.badge);
        }

        body
    }
}

#[async_trait]
impl Service for BarkService {
    fn scheme(&self) -> &'static str {
        BarkConfig::SCHEME
    }

    fn initialize(&mut self, address: &Url) -> AppResult<()> {
        self.config = decode(address)?;
        Ok(())
    }

    async fn send(&self, message: &str, params: &Params) -> AppResult<()> {
        let config = with_params(&self.config, params)?;
        let body = Self::build_request_body(&config, message);
        let api_url = config.api_url();
        debug!(url = %api_url, "Sending bark notification");

        let mut request = HTTP_CLIENT.post(&api_url).json(&body);
        for (key, value) in config.pass_through.headers() {
            request = request.header(key, value);
        }

        let response = request.send().await?;
        check_response("bark", response).await
    }

    fn address(&self) -> AppResult<Url> {
        encode(&self.config)
    }

    fn config_fields(&self) -> Vec<&'static FieldDescriptor> {
        fields_of::<BarkConfig>()
    }

    fn config_enums(&self) -> Vec<&'static FieldDescriptor> {
        enums_of::<BarkConfig>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn parse(address: &str) -> AppResult<BarkConfig> {
        decode(&Url::parse(address).unwrap())
    }

    #[test]
    fn test_api_url() {
        let config = parse("bark://:devicekey@hostname/path/").unwrap();
        assert_eq!(config.api_url(), "https://hostname/path/push");

        let config = parse("bark://:devicekey@hostname:8080?scheme=http").unwrap();
        assert_eq!(config.api_url(), "http://hostname:8080/push");
    }

    #[test]
    fn test_address_round_trip() {
        let address = "bark://:device-key@example.com:2225/?badge=5&category=c&copy=cp&group=g&icon=i&level=timeSensitive&scheme=http&sound=s&title=t&url=u";
        let config = parse(address).unwrap();
        assert_eq!(config.level, BarkLevel::TimeSensitive);
        assert_eq!(config.badge, 5);
        assert_eq!(encode(&config).unwrap().as_str(), address);
    }

    #[test]
    fn test_missing_device_key() {
        assert!(matches!(
            parse("bark://hostname"),
            Err(AppError::MissingRequiredField { .. })
        ));
    }

    #[test]
    fn test_invalid_scheme_and_level() {
        assert!(matches!(
            parse("bark://:key@hostname?scheme=ftp"),
            Err(AppError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse("bark://:key@hostname?level=urgent"),
            Err(AppError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_request_body_skips_empty_fields() {
        let config = parse("bark://:key@hostname?title=Hi&badge=2").unwrap();
        let body = BarkService::build_request_body(&config, "hello");
        assert_eq!(
            body,
            json!({
                "body": "hello",
                "device_key": "key",
                "level": "active",
                "title": "Hi",
                "badge": 2,
            })
        );
    }

    #[tokio::test]
    async fn test_send_posts_to_push_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bark/push"))
            .and(body_json(json!({
                "body": "Message",
                "device_key": "key",
                "level": "active",
                "title": "From params",
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let address = server.uri().replace("http://", "bark://:key@") + "/bark?scheme=http";
        let mut service = BarkService::new();
        service.initialize(&Url::parse(&address).unwrap()).unwrap();

        let mut params = Params::new();
        params.set_title("From params");
        service.send("Message", &params).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_reports_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let address = server.uri().replace("http://", "bark://:key@") + "?scheme=http";
        let mut service = BarkService::new();
        service.initialize(&Url::parse(&address).unwrap()).unwrap();

        assert!(matches!(
            service.send("Message", &Params::new()).await,
            Err(AppError::Transport { .. })
        ));
    }
}
