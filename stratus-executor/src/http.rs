//! Transport-neutral HTTP request and response types.

use std::collections::BTreeMap;
use std::fmt;

use reqwest::Url;
use serde_json::Value;

use crate::ExecutorError;

/// HTTP verbs used by the token and Resource Manager endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Put,
    Patch,
    Post,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// `application/x-www-form-urlencoded` pairs.
    Form(Vec<(String, String)>),
}

/// An outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self { method, url, headers: Vec::new(), body: RequestBody::Empty }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Value of a request header, compared case-insensitively.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A received response. Header names are stored lower-cased.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self { status, ..Self::default() }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    #[must_use]
    pub fn with_json(mut self, body: &Value) -> Self {
        self.body = body.to_string().into_bytes();
        self.headers
            .insert("content-type".to_owned(), "application/json".to_owned());
        self
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON; an empty body is `None`.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Decode`] if the body is not valid JSON.
    pub fn json(&self) -> Result<Option<Value>, ExecutorError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&self.body)
            .map(Some)
            .map_err(|e| ExecutorError::Decode(e.to_string()))
    }
}

/// Append path segments to a base URL, percent-encoding each one.
///
/// # Errors
/// Returns [`ExecutorError::InvalidUrl`] if `base` is not an absolute,
/// hierarchical URL.
pub fn join_segments<S: AsRef<str>>(base: &str, segments: &[S]) -> Result<Url, ExecutorError> {
    let invalid = |reason: String| ExecutorError::InvalidUrl { url: base.to_owned(), reason };

    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| invalid("URL cannot be a base".to_owned()))?
        .pop_if_empty()
        .extend(segments.iter().map(AsRef::as_ref));
    Ok(url)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn join_segments_encodes_each_segment() {
        let url = match join_segments("https://management.azure.com/", &["subscriptions", "a b", "x/y"]) {
            Ok(u) => u,
            Err(e) => panic!("join failed: {e}"),
        };
        assert_eq!(url.path(), "/subscriptions/a%20b/x%2Fy");
    }

    #[test]
    fn join_segments_rejects_relative_base() {
        assert!(matches!(
            join_segments("not a url", &["x"]),
            Err(ExecutorError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn empty_body_decodes_to_none() {
        let response = HttpResponse::new(204);
        assert!(matches!(response.json(), Ok(None)));
    }

    #[test]
    fn headers_are_case_insensitive() {
        let response = HttpResponse::new(202).with_header("Azure-AsyncOperation", "https://x/op");
        assert_eq!(response.header("azure-asyncoperation"), Some("https://x/op"));
        assert_eq!(response.header("AZURE-ASYNCOPERATION"), Some("https://x/op"));
    }

    #[test]
    fn json_body_round_trips() {
        let body = json!({"value": [1, 2]});
        let response = HttpResponse::new(200).with_json(&body);
        assert!(matches!(response.json(), Ok(Some(ref v)) if *v == body));
    }
}
