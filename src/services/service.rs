//! Core service trait.
//!
//! Every notification back-end implements [`Service`]. The router only ever
//! calls `initialize` and `send`; the remaining methods serve the CLI.

use async_trait::async_trait;
use url::Url;

use super::params::Params;
use crate::error::AppResult;
use crate::format::{ConfigResolver, FieldDescriptor, ServiceConfig};

/// A notification back-end addressed by URL.
///
/// Implementations must be Send + Sync so initialized services can be moved
/// into dispatch tasks.
///
/// # Example Implementation
/// ```ignore
/// #[async_trait]
/// impl Service for LoggerService {
///     fn scheme(&self) -> &'static str {
///         "logger"
///     }
///
///     fn initialize(&mut self, address: &Url) -> AppResult<()> {
///         self.config = decode(address)?;
///         Ok(())
///     }
///
///     async fn send(&self, message: &str, params: &Params) -> AppResult<()> {
///         // Deliver the message
///     }
/// }
/// ```
#[async_trait]
pub trait Service: Send + Sync {
    /// Canonical scheme of the service
    fn scheme(&self) -> &'static str;

    /// Replaces the service configuration with the one decoded from `address`
    fn initialize(&mut self, address: &Url) -> AppResult<()>;

    /// Delivers one message.
    ///
    /// `params` keys naming configuration fields override those fields for
    /// this send only; `params` itself is never modified.
    async fn send(&self, message: &str, params: &Params) -> AppResult<()>;

    /// Canonical address of the current configuration
    fn address(&self) -> AppResult<Url>;

    /// Declared configuration fields, for documentation
    fn config_fields(&self) -> Vec<&'static FieldDescriptor>;

    /// The enum-bearing subset of [`config_fields`](Service::config_fields)
    fn config_enums(&self) -> Vec<&'static FieldDescriptor>;
}

/// Copy of `config` with the per-send overrides in `params` applied
pub(crate) fn with_params<C: ServiceConfig>(config: &C, params: &Params) -> AppResult<C> {
    let mut config = config.clone();
    ConfigResolver::new(&mut config).update_from_params(params)?;
    Ok(config)
}

pub(crate) fn fields_of<C: ServiceConfig>() -> Vec<&'static FieldDescriptor> {
    let mut config = C::default();
    ConfigResolver::new(&mut config).list_fields()
}

pub(crate) fn enums_of<C: ServiceConfig>() -> Vec<&'static FieldDescriptor> {
    let mut config = C::default();
    ConfigResolver::new(&mut config).list_enums()
}
