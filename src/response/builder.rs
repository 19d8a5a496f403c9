use super::core::{header_value_string, ActionResponse, Content, Headers};
use super::htmx;
use super::sniff::MimeSniffer;
use super::stream::StreamFactory;
use crate::request::ActionRequest;
use tracing::debug;

const CONTENT_TYPE: &str = "Content-Type";
const CONTENT_LENGTH: &str = "Content-Length";

/// Assembles final responses for one invocation
///
/// Borrowed from the action context for the duration of a single `build`
/// call; holds the originating request (for protocol adaptation) and the
/// body collaborators.
pub struct ResponseBuilder<'a> {
    request: &'a ActionRequest,
    streams: &'a dyn StreamFactory,
    sniffer: &'a dyn MimeSniffer,
    fallback_mime: &'a str,
    htmx: bool,
}

impl<'a> ResponseBuilder<'a> {
    /// Create a builder for responses to `request`
    pub fn new(
        request: &'a ActionRequest,
        streams: &'a dyn StreamFactory,
        sniffer: &'a dyn MimeSniffer,
    ) -> Self {
        Self {
            request,
            streams,
            sniffer,
            fallback_mime: super::sniff::DEFAULT_MIME_TYPE,
            htmx: true,
        }
    }

    /// Media type used when sniffing finds nothing
    #[must_use]
    pub fn fallback_mime(mut self, mime: &'a str) -> Self {
        self.fallback_mime = mime;
        self
    }

    /// Enable or disable the HTMX redirect adaptation
    #[must_use]
    pub fn htmx(mut self, enabled: bool) -> Self {
        self.htmx = enabled;
        self
    }

    /// Build a response
    ///
    /// 1. Start from `current`, or from `content` when it is a response.
    /// 2. Apply `headers`, replacing same-named headers; structured values are
    ///    rendered as compact JSON.
    /// 3. Textual content replaces the body; without a supplied `Content-Type`
    ///    the body is sniffed, falling back to the configured media type.
    /// 4. Without a supplied `Content-Length` it is computed from the body.
    /// 5. Apply `status`, then the redirect adaptation.
    #[must_use]
    pub fn build(
        &self,
        current: &ActionResponse,
        status: u16,
        content: Content,
        headers: &Headers,
    ) -> ActionResponse {
        let (mut response, text) = match content {
            Content::Response(replacement) => (replacement, None),
            Content::Text(text) => (current.clone(), Some(text)),
            Content::Empty => (current.clone(), None),
        };

        for (name, value) in headers.iter() {
            response = response.with_header(name, header_value_string(value));
        }

        if let Some(text) = text {
            let body = self.streams.create_stream(text);
            if !headers.contains(CONTENT_TYPE) {
                let mime = self
                    .sniffer
                    .sniff(&body)
                    .unwrap_or_else(|| self.fallback_mime.to_string());
                debug!(content_type = %mime, body_size = body.size(), "Content type sniffed");
                response = response.with_header(CONTENT_TYPE, mime);
            }
            response = response.with_body(body);
        }

        if !headers.contains(CONTENT_LENGTH) {
            let length = response.body().size();
            response = response.with_header(CONTENT_LENGTH, length.to_string());
        }

        let response = response.with_status(status);
        if self.htmx {
            htmx::adapt(self.request, response)
        } else {
            response
        }
    }
}
