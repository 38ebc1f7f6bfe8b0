use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::registry::{SERVICE_REGISTRY, ServiceRegistry};
use super::result::{DispatchReport, DispatchResult};
use crate::error::{AppError, AppResult};
use crate::services::{Params, Service};

/// Fans a message out to many service addresses.
///
/// Every address gets its own freshly initialized service and its own
/// dispatch task; a failing address never affects its siblings.
#[derive(Clone)]
pub struct ServiceRouter {
    registry: Arc<ServiceRegistry>,
    timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl Default for ServiceRouter {
    fn default() -> Self {
        Self::new(SERVICE_REGISTRY.clone())
    }
}

impl ServiceRouter {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self {
            registry,
            timeout: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Limit each dispatch to `timeout`; `None` waits indefinitely
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Token that cancels every in-flight dispatch of this router
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Registered schemes, sorted
    pub fn list_services(&self) -> Vec<&'static str> {
        self.registry.schemes()
    }

    /// Creates and initializes the service for one address
    pub fn locate(&self, address: &str) -> AppResult<Box<dyn Service>> {
        let url = Url::parse(address.trim())?;
        let scheme = url.scheme();
        let mut service = self.registry.create(scheme)?;
        service
            .initialize(&url)
            .map_err(|source| AppError::ServiceInit {
                scheme: scheme.to_string(),
                source: Box::new(source),
            })?;
        Ok(service)
    }

    /// Sends `message` to every address concurrently.
    ///
    /// The report holds one result per address in input order. The call
    /// fails only when every address failed; an empty address list yields an
    /// empty report.
    pub async fn send<S: AsRef<str>>(
        &self,
        addresses: &[S],
        message: &str,
        params: &Params,
    ) -> AppResult<DispatchReport> {
        let message: Arc<str> = Arc::from(message);
        let params = Arc::new(params.clone());

        let mut labels = Vec::with_capacity(addresses.len());
        let mut tasks: Vec<BoxFuture<'static, AppResult<()>>> = Vec::with_capacity(addresses.len());

        for (index, address) in addresses.iter().enumerate() {
            let address = address.as_ref();
            labels.push((scheme_of(address), redact(address)));

            match self.locate(address) {
                Ok(service) => {
                    debug!(index, scheme = service.scheme(), "Dispatching to service");
                    let handle = tokio::spawn(dispatch(
                        service,
                        message.clone(),
                        params.clone(),
                        self.timeout,
                        self.cancel.clone(),
                    ));
                    tasks.push(
                        handle
                            .map(|joined| {
                                joined.unwrap_or_else(|e| {
                                    Err(AppError::Internal {
                                        source: anyhow::anyhow!("dispatch task failed: {}", e),
                                    })
                                })
                            })
                            .boxed(),
                    );
                }
                Err(error) => tasks.push(future::ready(Err(error)).boxed()),
            }
        }

        let outcomes = future::join_all(tasks).await;
        let results: Vec<DispatchResult> = outcomes
            .into_iter()
            .zip(labels)
            .enumerate()
            .map(|(index, (outcome, (scheme, address)))| {
                match &outcome {
                    Ok(()) => info!(index, scheme = %scheme, "Notification sent"),
                    Err(error) => {
                        warn!(index, address = %address, error = %error, "Notification failed")
                    }
                }
                DispatchResult {
                    index,
                    scheme,
                    address,
                    outcome,
                }
            })
            .collect();

        DispatchReport::new(results).into_result()
    }
}

async fn dispatch(
    service: Box<dyn Service>,
    message: Arc<str>,
    params: Arc<Params>,
    timeout: Option<Duration>,
    cancel: CancellationToken,
) -> AppResult<()> {
    let scheme = service.scheme();
    let send = async {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, service.send(&message, &params))
                .await
                .unwrap_or_else(|_| {
                    Err(AppError::Timeout {
                        seconds: limit.as_secs(),
                    })
                }),
            None => service.send(&message, &params).await,
        }
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AppError::Canceled),
        result = send => result.map_err(|source| AppError::Dispatch {
            scheme: scheme.to_string(),
            source: Box::new(source),
        }),
    }
}

/// Scheme as written in the address, or empty when it cannot be parsed
fn scheme_of(address: &str) -> String {
    Url::parse(address.trim())
        .map(|url| url.scheme().to_string())
        .unwrap_or_default()
}

/// The address with any password replaced, safe to print.
///
/// Text that does not parse as a URL is reduced to `<invalid address>` since
/// it may still hold a secret.
pub(crate) fn redact(address: &str) -> String {
    let Ok(mut url) = Url::parse(address.trim()) else {
        return INVALID_ADDRESS.to_string();
    };
    if url.password().is_some() {
        let _ = url.set_password(Some(REDACTED));
    }
    url.to_string()
}

const REDACTED: &str = "REDACTED";
const INVALID_ADDRESS: &str = "<invalid address>";
