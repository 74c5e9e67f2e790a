//! Per-request options: method, query, body, headers and path parameters.

use std::fmt::Display;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};
use crate::http::{set_header, HttpMethod};

/// Everything except RFC 3986 unreserved characters gets escaped.
const PATH_PARAM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A query parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// One `key=value` entry.
    Scalar(String),
    /// One `key=item` entry per element, in order.
    List(Vec<String>),
    /// Omitted entirely: neither key nor value is emitted.
    Absent,
}

macro_rules! scalar_from {
    ($($t:ty),*) => {
        $(impl From<$t> for QueryValue {
            fn from(v: $t) -> Self {
                QueryValue::Scalar(v.to_string())
            }
        })*
    };
}

scalar_from!(&str, String, &String, bool, i32, i64, u32, u64, usize, f64);

impl<T: ToString> From<Vec<T>> for QueryValue {
    fn from(items: Vec<T>) -> Self {
        QueryValue::List(items.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString> From<&[T]> for QueryValue {
    fn from(items: &[T]) -> Self {
        QueryValue::List(items.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString, const N: usize> From<[T; N]> for QueryValue {
    fn from(items: [T; N]) -> Self {
        QueryValue::List(items.iter().map(ToString::to_string).collect())
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(QueryValue::Absent, Into::into)
    }
}

/// Query parameters in insertion order. Keys are unique; setting a key again
/// replaces its value where it stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, QueryValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// The `(key, value)` pairs that end up on the wire.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        for (key, value) in &self.entries {
            match value {
                QueryValue::Scalar(v) => out.push((key.as_str(), v.as_str())),
                QueryValue::List(items) => {
                    out.extend(items.iter().map(|v| (key.as_str(), v.as_str())))
                }
                QueryValue::Absent => {}
            }
        }
        out
    }

    /// Append the pairs to `url`, form-urlencoded. Leaves the URL untouched
    /// when nothing would be emitted.
    pub fn append_to(&self, url: &mut Url) {
        let pairs = self.pairs();
        if pairs.is_empty() {
            return;
        }
        let mut serializer = url.query_pairs_mut();
        for (key, value) in pairs {
            serializer.append_pair(key, value);
        }
    }
}

/// Values substituted into `{name}` placeholders of a path template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    entries: Vec<(String, String)>,
}

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Display) {
        let key = key.into();
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Replace every `{key}` with the percent-encoded value. Placeholders with
    /// no matching key stay as written; unused keys are ignored.
    ///
    /// `.` is unreserved, so a value of `.` or `..` survives encoding and is
    /// resolved as a dot segment when the URL is parsed (`/invoices/../refunds`
    /// is sent as `/refunds`). Validate ids taken from untrusted input before
    /// passing them here.
    pub fn apply(&self, template: &str) -> String {
        let mut path = template.to_string();
        for (key, value) in &self.entries {
            let token = format!("{{{key}}}");
            if path.contains(&token) {
                let encoded = utf8_percent_encode(value, PATH_PARAM).to_string();
                path = path.replace(&token, &encoded);
            }
        }
        path
    }
}

/// Options for one request. `Default` is a bare GET.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub query: QueryParams,
    /// `Some(Value::Null)` still sends a `null` body.
    pub body: Option<Value>,
    /// Applied after the default and auth headers; wins on name collision.
    pub headers: Vec<(String, String)>,
    /// Only consulted by `ServiceClient`.
    pub path_params: PathParams,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.set(key, value);
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `body` into the request payload.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value =
            serde_json::to_value(body).map_err(|e| Error::Serialization(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        set_header(&mut self.headers, name, value);
        self
    }

    pub fn path_param(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.path_params.insert(key, value);
        self
    }
}
