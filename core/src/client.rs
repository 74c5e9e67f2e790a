//! The root client: credentials, base URL and transport.
//!
//! # Design
//! `FabraicClient` is immutable after `new`. Every call is split the same way:
//! `build_request` composes an `HttpRequest` from a path and `RequestOptions`,
//! the transport executes it, and `parse_response` turns the `HttpResponse`
//! into a JSON value or an error. Both halves are public so a caller can run
//! the I/O itself.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::auth::Credential;
use crate::config::{ClientConfig, DEFAULT_BASE_URL};
use crate::error::{Error, Result};
use crate::http::{set_header, HttpRequest, HttpResponse};
use crate::options::RequestOptions;
use crate::service::ServiceClient;
use crate::transport::{default_transport, Transport};

const ACCEPT: &str = "Accept";
const CONTENT_TYPE: &str = "Content-Type";
const APPLICATION_JSON: &str = "application/json";

/// Client for the fabraic HTTP API.
///
/// Cheap to clone; clones share the transport. Safe to use from several
/// threads as long as the transport is.
#[derive(Clone)]
pub struct FabraicClient {
    base_url: String,
    credential: Credential,
    default_headers: Vec<(String, String)>,
    transport: Arc<dyn Transport>,
}

impl FabraicClient {
    /// Validate `config` and build the client.
    ///
    /// Fails with `Error::Configuration` when no credential is given, when the
    /// base URL is not an absolute URL that paths can be appended to, or when
    /// there is no transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_transport_fallback(config, default_transport)
    }

    /// `new` with the fallback used when `config` carries no transport.
    pub(crate) fn with_transport_fallback(
        config: ClientConfig,
        fallback: fn() -> Option<Arc<dyn Transport>>,
    ) -> Result<Self> {
        let credential =
            Credential::resolve(config.api_key.as_deref(), config.access_token.as_deref())?;

        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        check_base_url(&base_url)?;

        let transport = config.transport.or_else(fallback).ok_or_else(|| {
            Error::Configuration(
                "no transport available: inject one or enable the `ureq` feature".to_string(),
            )
        })?;

        let (auth_name, auth_value) = credential.header();
        let default_headers = vec![
            (ACCEPT.to_string(), APPLICATION_JSON.to_string()),
            (auth_name.to_string(), auth_value),
        ];

        Ok(Self {
            base_url,
            credential,
            default_headers,
            transport,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// A view scoped to `/{service_path}/{version}`. `version` falls back to
    /// `v1` when `None` or empty.
    pub fn service(&self, service_path: &str, version: Option<&str>) -> Result<ServiceClient<'_>> {
        ServiceClient::new(self, service_path, version)
    }

    /// Compose the request for `path` without sending it.
    pub fn build_request(&self, path: &str, options: &RequestOptions) -> Result<HttpRequest> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        let raw = format!("{}{path}", self.base_url);
        let mut url = Url::parse(&raw)
            .map_err(|e| Error::Configuration(format!("invalid request url {raw:?}: {e}")))?;
        options.query.append_to(&mut url);

        let mut headers = self.default_headers.clone();
        for (name, value) in &options.headers {
            set_header(&mut headers, name, value);
        }

        let body = match &options.body {
            Some(value) => {
                set_header(&mut headers, CONTENT_TYPE, APPLICATION_JSON);
                Some(serde_json::to_string(value).map_err(|e| Error::Serialization(e.to_string()))?)
            }
            None => None,
        };

        Ok(HttpRequest {
            method: options.method,
            url: url.to_string(),
            headers,
            body,
        })
    }

    /// Map a response to its JSON value.
    ///
    /// Non-2xx becomes `Error::Request` with the body parsed best-effort
    /// (`Value::Null` when it is not JSON). A 2xx with an empty or blank body
    /// is `Value::Null`; any other unparseable 2xx body is `Error::Decoding`.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value> {
        if !response.is_success() {
            let body = serde_json::from_str(&response.body).unwrap_or(Value::Null);
            return Err(Error::Request {
                status: response.status,
                body,
            });
        }
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body).map_err(|e| Error::Decoding(e.to_string()))
    }

    /// Send a request to `path` (relative to the base URL) and decode the reply.
    pub fn request(&self, path: &str, options: RequestOptions) -> Result<Value> {
        let request = self.build_request(path, &options)?;
        debug!(method = %request.method, url = %request.url, "dispatching request");
        let response = self.transport.send(&request)?;
        debug!(status = response.status, bytes = response.body.len(), "received response");
        self.parse_response(response)
    }

    /// Like `request`, then deserialize the value into `T`.
    pub fn request_as<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let value = self.request(path, options)?;
        serde_json::from_value(value).map_err(|e| Error::Decoding(e.to_string()))
    }
}

/// Paths are appended to the base as text, so it must be hierarchical and
/// carry no query or fragment.
fn check_base_url(base_url: &str) -> Result<()> {
    let parsed = Url::parse(base_url)
        .map_err(|e| Error::Configuration(format!("invalid base url {base_url:?}: {e}")))?;
    if parsed.cannot_be_a_base() {
        return Err(Error::Configuration(format!(
            "base url {base_url:?} cannot have paths appended"
        )));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(Error::Configuration(format!(
            "base url {base_url:?} must not contain a query or fragment"
        )));
    }
    Ok(())
}

impl fmt::Debug for FabraicClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FabraicClient")
            .field("base_url", &self.base_url)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}
