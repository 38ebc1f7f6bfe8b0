//! Google Chat incoming webhooks.

use std::sync::LazyLock;

use async_trait::async_trait;
use serde_json::json;
use url::Url;

use super::params::Params;
use super::service::{Service, enums_of, fields_of, with_params};
use crate::error::{AppError, AppResult};
use crate::external::{HTTP_CLIENT, check_response};
use crate::format::{
    Configurable, FieldDescriptor, FieldModel, Location, PassThrough, ServiceConfig, decode,
    encode,
};

/// `googlechat://chat.googleapis.com/v1/spaces/SPACE/messages?key=KEY&token=TOKEN`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoogleChatConfig {
    pub host: String,
    pub path: String,
    pub key: String,
    pub token: String,
    pub pass_through: PassThrough,
}

static GOOGLECHAT_FIELDS: LazyLock<FieldModel<GoogleChatConfig>> = LazyLock::new(|| {
    FieldModel::builder()
        .field("key", crate::accessor!(GoogleChatConfig, key))
        .description("Webhook key")
        .required()
        .field("token", crate::accessor!(GoogleChatConfig, token))
        .description("Webhook token")
        .required()
        .build()
});

impl Configurable for GoogleChatConfig {
    fn model() -> &'static FieldModel<Self> {
        &GOOGLECHAT_FIELDS
    }
}

impl ServiceConfig for GoogleChatConfig {
    const SCHEME: &'static str = "googlechat";

    fn location(&self) -> Location {
        Location {
            host: self.host.clone(),
            path: self.path.clone(),
            ..Default::default()
        }
    }

    fn set_location(&mut self, location: &Location) -> AppResult<()> {
        self.host = location.host.clone();
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
        if self.host.is_empty() {
            return Err(AppError::invalid_address("webhook host is missing"));
        }
        Ok(())
    }
}

impl GoogleChatConfig {
    pub fn webhook_url(&self) -> AppResult<Url> {
        let mut url = self.location().to_url("https", "")?;
        url.query_pairs_mut()
            .append_pair("key", &self.key)
            .append_pair("token", &self.token);
        Ok(url)
    }
}

/// Google Chat service, also reachable as `hangouts://`
#[derive(Debug, Default)]
pub struct GoogleChatService {
    config: GoogleChatConfig,
}

impl GoogleChatService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Service for GoogleChatService {
    fn scheme(&self) -> &'static str {
        GoogleChatConfig::SCHEME
    }

    fn initialize(&mut self, address: &Url) -> AppResult<()> {
        self.config = decode(address)?;
        Ok(())
    }

    async fn send(&self, message: &str, params: &Params) -> AppResult<()> {
        let config = with_params(&self.config, params)?;

        let mut request = HTTP_CLIENT
            .post(config.webhook_url()?)
            .json(&json!({ "text": message }));
        for (key, value) in config.pass_through.headers() {
            request = request.header(key, value);
        }

        let response = request.send().await?;
        check_response("googlechat", response).await
    }

    fn address(&self) -> AppResult<Url> {
        encode(&self.config)
    }

    fn config_fields(&self) -> Vec<&'static FieldDescriptor> {
        fields_of::<GoogleChatConfig>()
    }

    fn config_enums(&self) -> Vec<&'static FieldDescriptor> {
        enums_of::<GoogleChatConfig>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "googlechat://chat.googleapis.com/v1/spaces/FOO/messages?key=bar&token=baz";

    #[test]
    fn test_webhook_url() {
        let config: GoogleChatConfig = decode(&Url::parse(ADDRESS).unwrap()).unwrap();
        assert_eq!(
            config.webhook_url().unwrap().as_str(),
            "https://chat.googleapis.com/v1/spaces/FOO/messages?key=bar&token=baz"
        );
    }

    #[test]
    fn test_address_round_trip() {
        let mut service = GoogleChatService::new();
        service.initialize(&Url::parse(ADDRESS).unwrap()).unwrap();
        assert_eq!(service.address().unwrap().as_str(), ADDRESS);
    }

    #[test]
    fn test_hangouts_address_is_accepted() {
        let url = Url::parse("hangouts://chat.googleapis.com/v1/spaces/FOO/messages?key=bar&token=baz").unwrap();
        let config: GoogleChatConfig = decode(&url).unwrap();
        assert_eq!(config.key, "bar");
        assert_eq!(encode(&config).unwrap().as_str(), ADDRESS);
    }

    #[test]
    fn test_missing_token() {
        let url = Url::parse("googlechat://chat.googleapis.com/v1/spaces/FOO/messages?key=bar").unwrap();
        let result: AppResult<GoogleChatConfig> = decode(&url);
        assert!(matches!(
            result,
            Err(AppError::MissingRequiredField { ref field }) if field == "token"
        ));
    }
}
