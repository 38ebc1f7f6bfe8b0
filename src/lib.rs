//! Courier
//!
//! Sends one message to many notification services, each configured by a
//! single URL address such as `ntfy://ntfy.sh/alerts?priority=high`.

use shadow_rs::shadow;
shadow!(build);

pub mod cli;
pub mod config;
pub mod error;
pub mod external;
pub mod format;
pub mod logger;
pub mod router;
pub mod services;

pub use error::{AppError, AppResult};
pub use router::ServiceRouter;
pub use services::{Params, Service};
