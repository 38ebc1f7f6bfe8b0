//! Address assembly for the `generate` command

use url::{Url, form_urlencoded};

use crate::error::{AppError, AppResult};
use crate::format::{DATA_PREFIX, EXTENSION_PREFIX, HEADER_PREFIX, Location};
use crate::router::{SERVICE_REGISTRY, ServiceRouter};

/// Builds the canonical address of `scheme` from KEY=VALUE props.
///
/// `host`, `port`, `user`, `password` and `path` fill the authority (the
/// scheme name stands in for a missing host). Prefixed keys pass through
/// unchanged; any other key must name a declared field of the service.
pub fn generate_address(
    router: &ServiceRouter,
    scheme: &str,
    props: &[(String, String)],
) -> AppResult<Url> {
    let fields = SERVICE_REGISTRY.create(scheme)?.config_fields();

    let mut location = Location::default();
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (key, value) in props {
        match key.as_str() {
            "host" => location.host = value.clone(),
            "port" => {
                let port = value
                    .parse()
                    .map_err(|_| AppError::invalid_value("port", value.as_str(), "not a port number"))?;
                location.port = Some(port);
            }
            "user" => location.user = value.clone(),
            "password" => location.password = Some(value.clone()),
            "path" => location.path = value.clone(),
            _ if [HEADER_PREFIX, DATA_PREFIX, EXTENSION_PREFIX]
                .iter()
                .any(|prefix| key.starts_with(*prefix)) =>
            {
                query.append_pair(key, value);
            }
            _ => {
                let field = fields
                    .iter()
                    .find(|field| field.matches(key))
                    .ok_or_else(|| AppError::unknown_key(key.as_str()))?;
                query.append_pair(field.key, value);
            }
        }
    }
    if location.host.is_empty() {
        location.host = scheme.to_string();
    }

    let address = location.to_url(scheme, &query.finish())?;
    router.locate(address.as_str())?.address()
}
