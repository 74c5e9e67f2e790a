//! Constructor options for `FabraicClient`.

use std::fmt;
use std::sync::Arc;

use crate::transport::Transport;

pub const DEFAULT_BASE_URL: &str = "https://api.fabraic.co";
pub const DEFAULT_SERVICE_VERSION: &str = "v1";

/// Credentials, base URL and an optional transport.
///
/// Nothing is validated here; `FabraicClient::new` does that.
#[derive(Clone, Default)]
pub struct ClientConfig {
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub base_url: Option<String>,
    pub transport: Option<Arc<dyn Transport>>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("transport", &self.transport.as_ref().map(|_| "<injected>"))
            .finish()
    }
}
