//! Conversion between service configurations and address URLs.

use std::borrow::Cow;
use std::collections::BTreeMap;

use tracing::debug;
use url::{Url, form_urlencoded};

use super::model::Configurable;
use super::passthrough::{PassThrough, QueryKey};
use super::resolver::ConfigResolver;
use crate::error::{AppError, AppResult};

/// Authority and path of an address, with userinfo percent-decoded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub user: String,
    pub password: Option<String>,
    pub host: String,
    pub port: Option<u16>,
    /// Path as it appears in the URL (still percent-encoded)
    pub path: String,
}

impl Location {
    pub fn from_url(url: &Url) -> AppResult<Self> {
        let user = decode_userinfo(url.username())?.into_owned();
        let password = url
            .password()
            .map(|p| decode_userinfo(p).map(Cow::into_owned))
            .transpose()?;

        Ok(Self {
            user,
            password,
            host: url.host_str().unwrap_or_default().to_string(),
            port: url.port(),
            path: url.path().to_string(),
        })
    }

    /// Renders `scheme://[user[:password]@]host[:port][path][?query]`
    pub fn to_url(&self, scheme: &str, query: &str) -> AppResult<Url> {
        let mut url = Url::parse(&format!("{}://{}", scheme, self.host))?;

        // Userinfo is held decoded; the url crate leaves `%` as is, so encode it here
        if !self.user.is_empty() || self.password.is_some() {
            url.set_username(&urlencoding::encode(&self.user))
                .map_err(|_| AppError::invalid_address("address cannot carry a user"))?;
            let password = self.password.as_deref().map(urlencoding::encode);
            url.set_password(password.as_deref())
                .map_err(|_| AppError::invalid_address("address cannot carry a password"))?;
        }
        if self.port.is_some() {
            url.set_port(self.port)
                .map_err(|_| AppError::invalid_address("address cannot carry a port"))?;
        }
        url.set_path(&self.path);
        url.set_query((!query.is_empty()).then_some(query));

        Ok(url)
    }
}

fn decode_userinfo(raw: &str) -> AppResult<Cow<'_, str>> {
    urlencoding::decode(raw)
        .map_err(|e| AppError::invalid_address(format!("userinfo is not valid UTF-8: {}", e)))
}

/// A service configuration that can be decoded from and encoded to an address.
///
/// Declared fields travel in the query and are handled by the field model.
/// Everything in the authority and path is mapped by [`set_location`] and
/// [`location`], which must be inverse to each other.
///
/// [`set_location`]: ServiceConfig::set_location
/// [`location`]: ServiceConfig::location
pub trait ServiceConfig: Configurable + Clone + Send + Sync {
    /// Scheme written by [`encode`]
    const SCHEME: &'static str;

    fn location(&self) -> Location;

    fn set_location(&mut self, location: &Location) -> AppResult<()>;

    fn pass_through(&self) -> &PassThrough;

    fn pass_through_mut(&mut self) -> &mut PassThrough;

    /// Structural check and normalization after all fields are populated
    fn finalize(&mut self) -> AppResult<()> {
        Ok(())
    }
}

/// Builds a configuration from an address.
///
/// Any failure discards the partially populated configuration.
pub fn decode<C: ServiceConfig>(url: &Url) -> AppResult<C> {
    let model = C::model();
    let mut config = C::default();
    config.set_location(&Location::from_url(url)?)?;

    let mut declared: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    let mut pass_through = PassThrough::default();

    for (key, value) in url.query_pairs() {
        match PassThrough::classify(&key) {
            QueryKey::Header(name) => {
                pass_through.insert_header(name, value);
            }
            QueryKey::Data(name) => {
                pass_through.insert_data(name, value);
            }
            QueryKey::Escaped(name) if model.allows_extensions() => {
                pass_through.insert_extension(name, value);
            }
            QueryKey::Escaped(_) => return Err(AppError::unknown_key(&*key)),
            QueryKey::Plain(name) => match model.position(name) {
                Some(index) => declared.entry(index).or_default().push(value.into_owned()),
                None if model.allows_extensions() => {
                    pass_through.insert_extension(name, value);
                }
                None => return Err(AppError::unknown_key(name)),
            },
        }
    }

    {
        let mut resolver = ConfigResolver::new(&mut config);
        for (index, mut values) in declared {
            let descriptor = &model.entry(index).descriptor;
            if !descriptor.importable {
                debug!(key = descriptor.key, "Ignoring read-only field in address");
                continue;
            }
            let raw = if descriptor.is_list() {
                values.join(",")
            } else {
                values.pop().unwrap_or_default()
            };
            resolver.set(descriptor.key, &raw)?;
        }
        resolver.apply_defaults()?;
        resolver.check_required()?;
    }

    *config.pass_through_mut() = pass_through;
    config.finalize()?;
    Ok(config)
}

/// Renders the canonical address of a configuration.
///
/// Fields equal to the value a fresh configuration holds after defaults are
/// omitted unless always exported. Write-only fields are never written.
pub fn encode<C: ServiceConfig>(config: &C) -> AppResult<Url> {
    let model = C::model();
    let mut baseline = C::default();
    ConfigResolver::new(&mut baseline).apply_defaults()?;

    let mut query = form_urlencoded::Serializer::new(String::new());
    for (_, entry) in model.entries() {
        let descriptor = &entry.descriptor;
        if !descriptor.exportable {
            continue;
        }
        if !descriptor.always_export && entry.same(config, &baseline) {
            continue;
        }
        query.append_pair(descriptor.key, &entry.read(config));
    }
    for (key, value) in config
        .pass_through()
        .query_pairs(|key| model.find(key).is_some())
    {
        query.append_pair(&key, value);
    }

    config.location().to_url(C::SCHEME, &query.finish())
}
