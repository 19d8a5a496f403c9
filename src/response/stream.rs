use super::core::Body;

/// Turns textual content into a response body stream
pub trait StreamFactory: Send + Sync {
    /// Create a body from `content`
    fn create_stream(&self, content: String) -> Body;
}

/// Default stream factory backed by an in-memory `bytes::Bytes` buffer
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesStreamFactory;

impl StreamFactory for BytesStreamFactory {
    fn create_stream(&self, content: String) -> Body {
        Body::from(content)
    }
}
