use crate::request::HeaderVec;
use bytes::Bytes;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Response body stream with a discoverable size
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body(Bytes);

impl Body {
    /// An empty body
    #[must_use]
    pub fn empty() -> Self {
        Self(Bytes::new())
    }

    /// Size of the body in bytes
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// `true` when the body holds no bytes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw body bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    /// Consume the body and return the underlying buffer
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Self(Bytes::from(s))
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Self(Bytes::from_static(s.as_bytes()))
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        Self(Bytes::from(v))
    }
}

/// Outbound response as built by an action
///
/// Immutable per step: `with_status`, `with_header` and `with_body` consume
/// the response and return a new one layered on the previous value.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResponse {
    status: u16,
    headers: HeaderVec,
    body: Body,
}

impl Default for ActionResponse {
    fn default() -> Self {
        Self::new(200)
    }
}

impl ActionResponse {
    /// Create an empty response with the given status
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            body: Body::empty(),
        }
    }

    /// HTTP status code
    #[inline]
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// `true` for 3xx responses
    #[inline]
    #[must_use]
    pub fn is_redirection(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// Get a header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// `true` if a header with this name is present (case-insensitive)
    #[inline]
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    /// All header lines in insertion order
    #[must_use]
    pub fn headers(&self) -> &HeaderVec {
        &self.headers
    }

    /// Response body
    #[must_use]
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Return a copy with a new status
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Return a copy with the header set, replacing any same-named header
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    /// Return a copy without the named header
    #[must_use]
    pub fn without_header(mut self, name: &str) -> Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self
    }

    /// Return a copy with the body replaced
    #[must_use]
    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// Convert into an `http::Response` for the server layer
    ///
    /// # Errors
    ///
    /// Returns an error if the status code or a header line is not valid HTTP.
    pub fn into_http(self) -> Result<http::Response<Bytes>, http::Error> {
        let mut builder = http::Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_ref(), value.as_str());
        }
        builder.body(self.body.into_bytes())
    }
}

/// Content handed to the response builder
///
/// Textual content replaces the body; a response value replaces the response
/// the builder starts from.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Content {
    /// Keep the current body
    #[default]
    Empty,
    /// Replace the body with this text
    Text(String),
    /// Start from this response instead of the in-progress one
    Response(ActionResponse),
}

impl Content {
    /// Textual content from anything with a canonical string form
    pub fn display(value: &impl fmt::Display) -> Self {
        Content::Text(value.to_string())
    }
}

impl From<()> for Content {
    fn from(_: ()) -> Self {
        Content::Empty
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Text(s.to_string())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Text(s)
    }
}

impl From<ActionResponse> for Content {
    fn from(r: ActionResponse) -> Self {
        Content::Response(r)
    }
}

impl<T: Into<Content>> From<Option<T>> for Content {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// Header lines handed to the response builder
///
/// Values are JSON values so structured data (e.g. an `HX-Trigger` payload)
/// can be passed directly; see [`header_value_string`] for the rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Headers(Vec<(String, Value)>);

impl Headers {
    /// An empty header list
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a header line
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.0.push((name.to_string(), value.into()));
        self
    }

    /// `true` if a header with this name was supplied (case-insensitive)
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Number of supplied header lines
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when no header lines were supplied
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over supplied header lines
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<()> for Headers {
    fn from(_: ()) -> Self {
        Headers::new()
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Headers {
    fn from(lines: [(K, V); N]) -> Self {
        Self(
            lines
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Render a header value as a header line
///
/// Strings are used verbatim, `null` becomes empty and every other value is
/// serialized to compact JSON.
#[must_use]
pub fn header_value_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
