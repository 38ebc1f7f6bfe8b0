//! Notification services.
//!
//! Each service owns a typed configuration decoded from its address and
//! implements the [`Service`] trait used by the router.

mod bark;
mod generic;
mod googlechat;
mod join;
mod logger;
mod ntfy;
mod params;
mod service;
mod slack;
mod smtp;

pub use bark::{BarkConfig, BarkLevel, BarkService};
pub use generic::{GenericConfig, GenericService};
pub use googlechat::{GoogleChatConfig, GoogleChatService};
pub use join::{JoinConfig, JoinService};
pub use logger::{LogLevel, LoggerConfig, LoggerService};
pub use ntfy::{NtfyConfig, NtfyService, Priority};
pub use params::{MESSAGE_KEY, Params, TITLE_KEY};
pub use service::Service;
pub use slack::{SlackConfig, SlackService, SlackToken};
pub use smtp::{Encryption, SmtpAuth, SmtpConfig, SmtpService};
