//! The seam between request composition and the network.
//!
//! # Design
//! `FabraicClient` never performs I/O itself. It hands a composed
//! `HttpRequest` to a `Transport` and decodes whatever `HttpResponse` comes
//! back. Callers may inject their own implementation; otherwise
//! `default_transport` supplies the ureq-backed one when the `ureq` feature is
//! enabled. With the feature off and nothing injected there is no transport,
//! and client construction fails.

use std::sync::Arc;

use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one HTTP round trip.
///
/// Implementations must return non-2xx responses as `Ok(HttpResponse)` so the
/// client can map them to `Error::Request`. `Err` is reserved for failures
/// where no response exists (DNS, connect, TLS, I/O).
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).send(request)
    }
}

/// The transport used when none is injected.
#[cfg(feature = "ureq")]
pub fn default_transport() -> Option<Arc<dyn Transport>> {
    Some(Arc::new(UreqTransport::new()))
}

/// The transport used when none is injected.
#[cfg(not(feature = "ureq"))]
pub fn default_transport() -> Option<Arc<dyn Transport>> {
    None
}

#[cfg(feature = "ureq")]
pub use self::ureq_transport::UreqTransport;

#[cfg(feature = "ureq")]
mod ureq_transport {
    use ureq::{Agent, RequestBuilder};

    use super::Transport;
    use crate::error::{Error, Result};
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Blocking transport backed by a ureq `Agent`.
    ///
    /// The agent is built with `http_status_as_error(false)` so 4xx/5xx come
    /// back as responses. Timeouts and proxies belong on the agent; pass a
    /// configured one through `from_agent`.
    #[derive(Clone)]
    pub struct UreqTransport {
        agent: Agent,
    }

    impl UreqTransport {
        pub fn new() -> Self {
            let agent = Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Self { agent }
        }

        /// Use a caller-configured agent. It must not treat statuses as errors.
        pub fn from_agent(agent: Agent) -> Self {
            Self { agent }
        }
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    fn with_headers<B>(
        mut builder: RequestBuilder<B>,
        headers: &[(String, String)],
    ) -> RequestBuilder<B> {
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    impl Transport for UreqTransport {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
            let url = request.url.as_str();
            let headers = &request.headers;
            let body = request.body.as_deref();

            let result = match (request.method, body) {
                (HttpMethod::Get, None) => with_headers(self.agent.get(url), headers).call(),
                (HttpMethod::Get, Some(b)) => with_headers(self.agent.get(url), headers)
                    .force_send_body()
                    .send(b.as_bytes()),
                (HttpMethod::Delete, None) => with_headers(self.agent.delete(url), headers).call(),
                (HttpMethod::Delete, Some(b)) => with_headers(self.agent.delete(url), headers)
                    .force_send_body()
                    .send(b.as_bytes()),
                (HttpMethod::Post, None) => {
                    with_headers(self.agent.post(url), headers).send_empty()
                }
                (HttpMethod::Post, Some(b)) => {
                    with_headers(self.agent.post(url), headers).send(b.as_bytes())
                }
                (HttpMethod::Put, None) => with_headers(self.agent.put(url), headers).send_empty(),
                (HttpMethod::Put, Some(b)) => {
                    with_headers(self.agent.put(url), headers).send(b.as_bytes())
                }
                (HttpMethod::Patch, None) => {
                    with_headers(self.agent.patch(url), headers).send_empty()
                }
                (HttpMethod::Patch, Some(b)) => {
                    with_headers(self.agent.patch(url), headers).send(b.as_bytes())
                }
            };
            let mut response = result.map_err(|e| Error::Transport(e.to_string()))?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(k, v)| {
                    v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|e| Error::Transport(e.to_string()))?;

            Ok(HttpResponse { status, headers, body })
        }
    }
}
