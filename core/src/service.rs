//! Service-scoped view over a `FabraicClient`.
//!
//! A `ServiceClient` borrows its root client and only rewrites paths:
//! `/invoices/{id}` becomes `/{service}/{version}/invoices/42`. Dispatch,
//! auth and decoding stay with the root.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use crate::client::FabraicClient;
use crate::config::DEFAULT_SERVICE_VERSION;
use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest};
use crate::options::{PathParams, RequestOptions};

#[derive(Debug, Clone)]
pub struct ServiceClient<'a> {
    client: &'a FabraicClient,
    service_path: String,
    version: String,
}

impl<'a> ServiceClient<'a> {
    pub(crate) fn new(
        client: &'a FabraicClient,
        service_path: &str,
        version: Option<&str>,
    ) -> Result<Self> {
        let service_path = service_path.trim_matches(|c: char| c == '/' || c.is_whitespace());
        if service_path.is_empty() {
            return Err(Error::Configuration("service path must be non-empty".to_string()));
        }
        let version = version.filter(|v| !v.is_empty()).unwrap_or(DEFAULT_SERVICE_VERSION);

        Ok(Self {
            client,
            service_path: service_path.to_string(),
            version: version.to_string(),
        })
    }

    pub fn service_path(&self) -> &str {
        &self.service_path
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// `/{service}/{version}{path}` with placeholders filled in and runs of
    /// slashes collapsed.
    pub fn build_path(&self, path: &str, params: &PathParams) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        let path = params.apply(&path);
        collapse_slashes(&format!("/{}/{}{path}", self.service_path, self.version))
    }

    /// Compose the full request without sending it.
    pub fn build_request(&self, path: &str, options: &RequestOptions) -> Result<HttpRequest> {
        let full_path = self.build_path(path, &options.path_params);
        self.client.build_request(&full_path, options)
    }

    pub fn request(
        &self,
        method: HttpMethod,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value> {
        let full_path = self.build_path(path, &options.path_params);
        trace!(service = %self.service_path, path = %full_path, "composed service path");
        self.client.request(&full_path, options.method(method))
    }

    pub fn request_as<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let full_path = self.build_path(path, &options.path_params);
        self.client.request_as(&full_path, options.method(method))
    }

    pub fn get(&self, path: &str, options: RequestOptions) -> Result<Value> {
        self.request(HttpMethod::Get, path, options)
    }

    pub fn post(&self, path: &str, options: RequestOptions) -> Result<Value> {
        self.request(HttpMethod::Post, path, options)
    }

    pub fn put(&self, path: &str, options: RequestOptions) -> Result<Value> {
        self.request(HttpMethod::Put, path, options)
    }

    pub fn patch(&self, path: &str, options: RequestOptions) -> Result<Value> {
        self.request(HttpMethod::Patch, path, options)
    }

    pub fn delete(&self, path: &str, options: RequestOptions) -> Result<Value> {
        self.request(HttpMethod::Delete, path, options)
    }
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}
