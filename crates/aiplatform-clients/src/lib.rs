//! Platform client implementations.
//!
//! This crate provides concrete implementations of the client traits from
//! `aiplatform-abstraction`.
//!
//! # Clients
//!
//! - **Http**: REST client against the platform API (regional or fixed endpoint)
//! - **InMemory**: fixed tables with call recording, for tests and offline use

pub mod config;
pub mod http;
pub mod memory;

use aiplatform_abstraction::{PlatformClients, PlatformResult};
use std::sync::Arc;

pub use config::{ConfigError, ConfigResult, PlatformConfig};
pub use http::HttpPlatformClient;
pub use memory::{CallKind, InMemoryPlatformClient, RecordedCall};

/// Builds HTTP-backed client handles from configuration.
///
/// # Errors
/// Returns a `PlatformError` if the HTTP client cannot be created.
pub fn http_clients(config: &PlatformConfig) -> PlatformResult<PlatformClients> {
    Ok(PlatformClients::from_shared(Arc::new(HttpPlatformClient::from_config(config)?)))
}
