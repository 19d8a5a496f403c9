use crate::request::ActionRequest;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Request header a caller uses to hand in its own identifier
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Rendering-context key the identifier is published under
pub const INVOCATION_ID_KEY: &str = "invocation_id";

/// Identifier of one action invocation, backed by ULID
///
/// Recorded on the `action` tracing span. Templates receive it under
/// [`INVOCATION_ID_KEY`] and actions embedded from that template run under the
/// same identifier, so a page and everything it embeds share one id.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct InvocationId(Ulid);

impl InvocationId {
    /// A fresh identifier
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Identifier carried by the request's `X-Request-Id` header, or a fresh
    /// one when the header is absent or not a ULID
    #[must_use]
    pub fn from_request(request: &ActionRequest) -> Self {
        request
            .header(REQUEST_ID_HEADER)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or_default()
    }

    /// Identifier published in a rendering context, if any
    #[must_use]
    pub fn from_context(context: &Map<String, Value>) -> Option<Self> {
        context
            .get(INVOCATION_ID_KEY)
            .and_then(|value| Self::deserialize(value).ok())
    }

    /// Creation time in milliseconds since the Unix epoch
    #[must_use]
    pub fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for InvocationId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

impl From<InvocationId> for String {
    fn from(id: InvocationId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for InvocationId {
    type Error = ulid::DecodeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
