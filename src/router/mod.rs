//! Multi-target dispatch.
//!
//! The registry maps address schemes to service factories; the router turns
//! a list of addresses into initialized services and sends to all of them
//! concurrently.

mod registry;
#[allow(clippy::module_inception)]
mod router;
mod result;

pub use registry::{SERVICE_REGISTRY, ServiceFactory, ServiceRegistry};
pub use result::{DispatchReport, DispatchResult};
pub use router::ServiceRouter;
