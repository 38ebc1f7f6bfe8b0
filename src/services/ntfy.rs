//! ntfy push notifications.
//!
//! API Reference: https://docs.ntfy.sh/publish/

use std::sync::LazyLock;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::params::Params;
use super::service::{Service, enums_of, fields_of, with_params};
use crate::config_enum;
use crate::error::{AppError, AppResult};
use crate::external::{HTTP_CLIENT, check_response};
use crate::format::{
    Configurable, FieldDescriptor, FieldModel, Location, PassThrough, ServiceConfig, decode,
    encode, print_bool,
};

/// Host used when the address names none
pub const DEFAULT_HOST: &str = "ntfy.sh";

config_enum! {
    /// Message priority; the wire value is `ordinal + 1`
    pub enum Priority {
        Min = "min",
        Low = "low",
        Default = "default",
        High = "high",
        Max = "max",
    }
}

impl Priority {
    /// Numeric priority sent to the server (1 to 5)
    pub fn level(&self) -> usize {
        self.ordinal() + 1
    }
}

/// `ntfy://[user:password@]host/topic?...`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NtfyConfig {
    pub user: String,
    pub password: Option<String>,
    pub host: String,
    pub port: Option<u16>,
    pub topic: String,
    pub attach: String,
    pub cache: bool,
    pub click: String,
    pub delay: String,
    pub disable_tls: bool,
    pub email: String,
    pub filename: String,
    pub firebase: bool,
    pub icon: String,
    pub priority: Priority,
    pub scheme: String,
    pub tags: Vec<String>,
    pub title: String,
    pub pass_through: PassThrough,
}

static NTFY_FIELDS: LazyLock<FieldModel<NtfyConfig>> = LazyLock::new(|| {
    FieldModel::builder()
        .field("attach", crate::accessor!(NtfyConfig, attach))
        .description("URL of an attachment")
        .field("cache", crate::accessor!(NtfyConfig, cache))
        .description("Cache messages on the server")
        .default_value("yes")
        .field("click", crate::accessor!(NtfyConfig, click))
        .description("URL opened when the notification is clicked")
        .field("delay", crate::accessor!(NtfyConfig, delay))
        .description("Timestamp or duration for delayed delivery")
        .field("disabletls", crate::accessor!(NtfyConfig, disable_tls))
        .description("Same as scheme=http")
        .write_only()
        .field("email", crate::accessor!(NtfyConfig, email))
        .description("E-mail address for e-mail notifications")
        .field("filename", crate::accessor!(NtfyConfig, filename))
        .description("File name of the attachment")
        .field("firebase", crate::accessor!(NtfyConfig, firebase))
        .description("Forward messages through Firebase")
        .default_value("yes")
        .field("icon", crate::accessor!(NtfyConfig, icon))
        .description("URL of the notification icon")
        .field("priority", crate::accessor!(NtfyConfig, priority))
        .description("Message priority")
        .default_value("default")
        .alias("prio")
        .field("scheme", crate::accessor!(NtfyConfig, scheme))
        .description("Server protocol, http or https")
        .default_value("https")
        .field("tags", crate::accessor!(NtfyConfig, tags))
        .description("Tags that may or may not map to emojis")
        .field("title", crate::accessor!(NtfyConfig, title))
        .description("Message title")
        .build()
});

impl Configurable for NtfyConfig {
    fn model() -> &'static FieldModel<Self> {
        &NTFY_FIELDS
    }
}

impl ServiceConfig for NtfyConfig {
    const SCHEME: &'static str = "ntfy";

    fn location(&self) -> Location {
        Location {
            user: self.user.clone(),
            password: self.password.clone(),
            host: self.host.clone(),
            port: self.port,
            path: format!("/{}", self.topic),
        }
    }

    fn set_location(&mut self, location: &Location) -> AppResult<()> {
        self.user = location.user.clone();
        self.password = location.password.clone();
        self.host = if location.host.is_empty() {
            DEFAULT_HOST.to_string()
        } else {
            location.host.clone()
        };
        self.port = location.port;
        self.topic = location.path.trim_matches('/').to_string();
        Ok(())
    }

    fn pass_through(&self) -> &PassThrough {
        &self.pass_through
    }

    fn pass_through_mut(&mut self) -> &mut PassThrough {
        &mut self.pass_through
    }

    fn finalize(&mut self) -> AppResult<()> {
        if self.topic.is_empty() {
            return Err(AppError::MissingRequiredField {
                field: "topic".to_string(),
            });
        }
        if self.disable_tls {
            self.scheme = "http".to_string();
            self.disable_tls = false;
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

impl NtfyConfig {
    pub fn topic_url(&self) -> AppResult<Url> {
        let location = Location {
            user: String::new(),
            password: None,
            ..self.location()
        };
        location.to_url(&self.scheme, "")
    }

    /// Publish headers for the set fields
    fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = Vec::new();
        let text = [
            ("Title", &self.title),
            ("Click", &self.click),
            ("Attach", &self.attach),
            ("Filename", &self.filename),
            ("Delay", &self.delay),
            ("Email", &self.email),
            ("Icon", &self.icon),
        ];
        for (name, value) in text {
            if !value.is_empty() {
                headers.push((name, value.clone()));
            }
        }
        if self.priority != Priority::Default {
            headers.push(("Priority", self.priority.level().to_string()));
        }
        if !self.tags.is_empty() {
            headers.push(("Tags", self.tags.join(",")));
        }
        if !self.cache {
            headers.push(("Cache", print_bool(false).to_lowercase()));
        }
        if !self.firebase {
            headers.push(("Firebase", print_bool(false).to_lowercase()));
        }
        headers
    }
}

/// ntfy service
#[derive(Debug, Default)]
pub struct NtfyService {
    config: NtfyConfig,
}

impl NtfyService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Service for NtfyService {
    fn scheme(&self) -> &'static str {
        NtfyConfig::SCHEME
    }

    fn initialize(&mut self, address: &Url) -> AppResult<()> {
        self.config = decode(address)?;
        Ok(())
    }

    async fn send(&self, message: &str, params: &Params) -> AppResult<()> {
        let config = with_params(&self.config, params)?;
        let url = config.topic_url()?;
        debug!(url = %url, priority = %config.priority, "Publishing ntfy message");

        let mut request = HTTP_CLIENT.post(url).body(message.to_string());
        if !config.user.is_empty() || config.password.is_some() {
            request = request.basic_auth(&config.user, config.password.as_ref());
        }
        for (name, value) in config.headers() {
            request = request.header(name, value);
        }
        for (key, value) in config.pass_through.headers() {
            request = request.header(key, value);
        }

        let response = request.send().await?;
        check_response("ntfy", response).await
    }

    fn address(&self) -> AppResult<Url> {
        encode(&self.config)
    }

    fn config_fields(&self) -> Vec<&'static FieldDescriptor> {
        fields_of::<NtfyConfig>()
    }

    fn config_enums(&self) -> Vec<&'static FieldDescriptor> {
        enums_of::<NtfyConfig>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn parse(address: &str) -> AppResult<NtfyConfig> {
        decode(&Url::parse(address).unwrap())
    }

    #[test]
    fn test_defaults() {
        let config = parse("ntfy://ntfy.sh/alerts").unwrap();
        assert_eq!(config.topic, "alerts");
        assert_eq!(config.priority, Priority::Default);
        assert!(config.cache);
        assert!(config.firebase);
        assert_eq!(config.scheme, "https");
        assert_eq!(config.topic_url().unwrap().as_str(), "https://ntfy.sh/alerts");
    }

    #[test]
    fn test_priority_levels_and_alias() {
        assert_eq!(Priority::Min.level(), 1);
        assert_eq!(Priority::Max.level(), 5);

        let config = parse("ntfy://ntfy.sh/alerts?prio=HIGH").unwrap();
        assert_eq!(config.priority, Priority::High);
        assert_eq!(
            encode(&config).unwrap().as_str(),
            "ntfy://ntfy.sh/alerts?priority=high"
        );
    }

    #[test]
    fn test_explicit_min_priority_survives() {
        let config = parse("ntfy://ntfy.sh/alerts?priority=min&cache=no").unwrap();
        assert_eq!(config.priority, Priority::Min);
        assert!(!config.cache);

        let encoded = encode(&config).unwrap();
        assert_eq!(encoded.query(), Some("cache=No&priority=min"));
        assert_eq!(parse(encoded.as_str()).unwrap(), config);
    }

    #[test]
    fn test_disabletls_is_folded_into_scheme() {
        let config = parse("ntfy://example.com/alerts?disabletls=yes").unwrap();
        assert_eq!(config.scheme, "http");
        assert!(!config.disable_tls);
        assert_eq!(
            encode(&config).unwrap().as_str(),
            "ntfy://example.com/alerts?scheme=http"
        );
    }

    #[test]
    fn test_missing_topic() {
        assert!(matches!(
            parse("ntfy://ntfy.sh"),
            Err(AppError::MissingRequiredField { ref field }) if field == "topic"
        ));
    }

    #[test]
    fn test_tags_list() {
        let config = parse("ntfy://ntfy.sh/alerts?tags=warning,skull").unwrap();
        assert_eq!(config.tags, vec!["warning", "skull"]);
        assert!(config.headers().contains(&("Tags", "warning,skull".to_string())));
    }

    #[tokio::test]
    async fn test_send_publishes_with_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/alerts"))
            .and(header("Title", "Disk full"))
            .and(header("Priority", "5"))
            .and(header("Cache", "no"))
            .and(header_exists("authorization"))
            .and(body_string("Message"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let address = server.uri().replace("http://", "ntfy://user:pass@")
            + "/alerts?scheme=http&priority=max&cache=no";
        let mut service = NtfyService::new();
        service.initialize(&Url::parse(&address).unwrap()).unwrap();

        let params: Params = [("title", "Disk full")].into_iter().collect();
        service.send("Message", &params).await.unwrap();
    }
}
