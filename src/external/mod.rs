//! Outbound HTTP plumbing shared by web-based services.

pub mod client;

pub use client::{HTTP_CLIENT, check_response};
