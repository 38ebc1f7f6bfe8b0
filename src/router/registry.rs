use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::error::{AppError, AppResult};
use crate::services::{
    BarkService, GenericService, GoogleChatService, JoinService, LoggerService, NtfyService,
    Service, SlackService, SmtpService,
};

/// Creates a fresh, uninitialized service
pub type ServiceFactory = fn() -> Box<dyn Service>;

/// Process-wide registry with every built-in service
pub static SERVICE_REGISTRY: LazyLock<Arc<ServiceRegistry>> =
    LazyLock::new(|| Arc::new(ServiceRegistry::builtin()));

/// Registry for mapping address schemes to service factories
///
/// Several schemes may map to the same factory; `hangouts` is kept as a
/// historical name of `googlechat`.
#[derive(Default)]
pub struct ServiceRegistry {
    factories: HashMap<&'static str, ServiceFactory>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with all built-in services
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry
            .register("bark", || Box::new(BarkService::new()))
            .register("generic", || Box::new(GenericService::new()))
            .register("googlechat", || Box::new(GoogleChatService::new()))
            .register("hangouts", || Box::new(GoogleChatService::new()))
            .register("join", || Box::new(JoinService::new()))
            .register("logger", || Box::new(LoggerService::new()))
            .register("ntfy", || Box::new(NtfyService::new()))
            .register("slack", || Box::new(SlackService::new()))
            .register("smtp", || Box::new(SmtpService::new()));
        registry
    }

    /// Register a factory under `scheme`, replacing any previous one
    pub fn register(&mut self, scheme: &'static str, factory: ServiceFactory) -> &mut Self {
        self.factories.insert(scheme, factory);
        self
    }

    pub fn contains(&self, scheme: &str) -> bool {
        self.factories.contains_key(service_scheme(scheme))
    }

    /// Create an uninitialized service for `scheme`
    ///
    /// Custom forms such as `generic+https` resolve the part before `+`.
    pub fn create(&self, scheme: &str) -> AppResult<Box<dyn Service>> {
        let factory = self
            .factories
            .get(service_scheme(scheme))
            .ok_or_else(|| AppError::UnknownService {
                scheme: scheme.to_string(),
            })?;

        Ok(factory())
    }

    /// Registered schemes, sorted
    pub fn schemes(&self) -> Vec<&'static str> {
        let mut schemes: Vec<_> = self.factories.keys().copied().collect();
        schemes.sort_unstable();
        schemes
    }
}

fn service_scheme(scheme: &str) -> &str {
    scheme.split_once('+').map_or(scheme, |(service, _)| service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_builtin_schemes() {
        assert_eq!(
            ServiceRegistry::builtin().schemes(),
            vec![
                "bark",
                "generic",
                "googlechat",
                "hangouts",
                "join",
                "logger",
                "ntfy",
                "slack",
                "smtp"
            ]
        );
    }

    #[test]
    fn test_unknown_scheme() {
        let registry = ServiceRegistry::builtin();
        assert!(!registry.contains("carrierpigeon"));
        match registry.create("carrierpigeon") {
            Err(AppError::UnknownService { scheme }) => assert_eq!(scheme, "carrierpigeon"),
            Err(other) => panic!("Expected UnknownService, got {:?}", other),
            Ok(_) => panic!("Expected UnknownService"),
        }
    }

    #[test]
    fn test_custom_scheme_resolves_service_part() {
        let registry = ServiceRegistry::builtin();
        assert!(registry.contains("generic+https"));
        assert_eq!(registry.create("generic+https").unwrap().scheme(), "generic");
    }

    #[test]
    fn test_aliased_schemes_share_a_service() {
        let registry = ServiceRegistry::builtin();
        let query = "chat.googleapis.com/v1/spaces/FOO/messages?key=bar&token=baz";

        let mut canonical = registry.create("googlechat").unwrap();
        canonical
            .initialize(&Url::parse(&format!("googlechat://{query}")).unwrap())
            .unwrap();
        let mut alias = registry.create("hangouts").unwrap();
        alias
            .initialize(&Url::parse(&format!("hangouts://{query}")).unwrap())
            .unwrap();

        assert_eq!(canonical.scheme(), alias.scheme());
        assert_eq!(canonical.address().unwrap(), alias.address().unwrap());
    }
}
