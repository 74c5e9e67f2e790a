//! Client library for the versioned fabraic HTTP API.
//!
//! # Overview
//! `FabraicClient` owns credentials, the base URL and a `Transport`; it turns a
//! path plus `RequestOptions` into an `HttpRequest`, hands it to the transport
//! and decodes the JSON reply. `ServiceClient` is a borrowed view that prefixes
//! paths with `/{service}/{version}` and fills `{name}` placeholders.
//!
//! ```no_run
//! use fabraic_sdk::{ClientConfig, FabraicClient, RequestOptions};
//!
//! # fn main() -> fabraic_sdk::Result<()> {
//! let client = FabraicClient::new(ClientConfig::new().api_key("sk_live_123"))?;
//! let billing = client.service("billing", None)?;
//! let invoice = billing.get("/invoices/{id}", RequestOptions::new().path_param("id", 42))?;
//! println!("{invoice}");
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! - Both clients are immutable after construction; concurrent use is safe
//!   when the transport is.
//! - No retries, pagination or response validation. A failed call fails once.
//! - The `ureq` feature (default) provides the fallback transport.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod options;
pub mod service;
pub mod transport;

#[cfg(test)]
mod testing;

pub use auth::Credential;
pub use client::FabraicClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_SERVICE_VERSION};
pub use error::{Error, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use options::{PathParams, QueryParams, QueryValue, RequestOptions};
pub use service::ServiceClient;
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
