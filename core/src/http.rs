//! HTTP request/response types and the request builder.
//!
//! # Design
//! Requests and responses are plain data. [`build_request`] turns a typed
//! operation into an `HttpRequest`; a [`Transport`](crate::transport::Transport)
//! executes it and hands back an `HttpResponse`. Keeping both sides as owned
//! values lets every stage of the pipeline be tested without a network.

use serde::Serialize;
use url::Url;

use crate::error::TransportError;

pub const ACCEPT: &str = "accept";
pub const AUTHORIZATION: &str = "authorization";
pub const CONTENT_TYPE: &str = "content-type";
pub const APPLICATION_JSON: &str = "application/json";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup; returns the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// Transports read the body to the end before constructing this value, so the
/// underlying connection is released by the time the response handler runs.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// A present query-parameter value. Absent parameters are `None` at the call
/// site and never reach the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Str(String),
    Int(i64),
    /// Emitted as one `key=item` pair per element, in order.
    List(Vec<String>),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Str(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Str(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Int(i64::from(value))
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(value: Vec<String>) -> Self {
        QueryValue::List(value)
    }
}

/// Ordered query parameters; `None` values are skipped.
pub type QueryParams = Vec<(&'static str, Option<QueryValue>)>;

/// Assemble a request against `base_url`.
///
/// `base_url` must already be normalized (no trailing slash); `path` is
/// appended verbatim. A body, when given, is serialized to JSON and marks the
/// request with a JSON content type. Every request asks for JSON back.
pub fn build_request<B>(
    base_url: &str,
    method: HttpMethod,
    path: &str,
    query: &[(&str, Option<QueryValue>)],
    body: Option<&B>,
) -> Result<HttpRequest, TransportError>
where
    B: Serialize + ?Sized,
{
    let url = build_url(base_url, path, query)?;
    let mut headers = vec![(ACCEPT.to_string(), APPLICATION_JSON.to_string())];

    let body = match body {
        Some(body) => {
            let json = serde_json::to_string(body)
                .map_err(|e| TransportError::Build(format!("failed to serialize request body: {e}")))?;
            headers.push((CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()));
            Some(json)
        }
        None => None,
    };

    Ok(HttpRequest {
        method,
        url,
        headers,
        body,
    })
}

/// Join `base_url` and `path`, then encode the present query parameters in
/// the order given.
pub fn build_url(
    base_url: &str,
    path: &str,
    query: &[(&str, Option<QueryValue>)],
) -> Result<String, TransportError> {
    let raw = format!("{base_url}{path}");
    let mut url =
        Url::parse(&raw).map_err(|e| TransportError::Build(format!("invalid url {raw}: {e}")))?;

    let mut pairs: Vec<(&str, String)> = Vec::new();
    for (key, value) in query {
        match value {
            None => {}
            Some(QueryValue::Str(s)) => pairs.push((*key, s.clone())),
            Some(QueryValue::Int(n)) => pairs.push((*key, n.to_string())),
            Some(QueryValue::List(items)) => {
                pairs.extend(items.iter().map(|item| (*key, item.clone())));
            }
        }
    }

    if !pairs.is_empty() {
        let mut serializer = url.query_pairs_mut();
        for (key, value) in &pairs {
            serializer.append_pair(key, value);
        }
    }

    Ok(url.into())
}
