use super::core::Body;

/// Media type used when sniffing finds nothing
pub const DEFAULT_MIME_TYPE: &str = "text/plain";

/// Detects the media type of a response body from its bytes
pub trait MimeSniffer: Send + Sync {
    /// Return the detected media type, or `None` when the content is not recognised
    fn sniff(&self, body: &Body) -> Option<String>;
}

/// Signature-based sniffer covering the bodies actions usually emit
///
/// Binary formats are matched on their magic bytes; textual formats on their
/// leading markup after whitespace and a UTF-8 BOM are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentSniffer;

const MAGIC: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"%PDF-", "application/pdf"),
    (b"PK\x03\x04", "application/zip"),
    (b"\x1f\x8b", "application/gzip"),
];

const HTML_PREFIXES: &[&str] = &[
    "<!doctype html",
    "<html",
    "<head",
    "<body",
    "<div",
    "<p>",
    "<p ",
    "<table",
    "<script",
    "<style",
    "<form",
    "<h1",
    "<!--",
];

impl ContentSniffer {
    /// Detect a media type from raw bytes
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Option<&'static str> {
        if let Some((_, mime)) = MAGIC.iter().find(|(sig, _)| bytes.starts_with(sig)) {
            return Some(*mime);
        }

        let text = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
        let start = text.iter().position(|b| !b.is_ascii_whitespace())?;
        let text = &text[start..];

        if starts_with_ignore_case(text, "<?xml") {
            return Some("text/xml");
        }
        if HTML_PREFIXES
            .iter()
            .any(|prefix| starts_with_ignore_case(text, prefix))
        {
            return Some("text/html");
        }
        if matches!(text.first(), Some(b'{') | Some(b'['))
            && serde_json::from_slice::<serde_json::Value>(text).is_ok()
        {
            return Some("application/json");
        }
        None
    }
}

fn starts_with_ignore_case(haystack: &[u8], prefix: &str) -> bool {
    haystack.len() >= prefix.len()
        && haystack[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

impl MimeSniffer for ContentSniffer {
    fn sniff(&self, body: &Body) -> Option<String> {
        Self::detect(body.as_bytes()).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_html() {
        assert_eq!(ContentSniffer::detect(b"<html></html>"), Some("text/html"));
        assert_eq!(
            ContentSniffer::detect(b"\n  <!DOCTYPE html><html>"),
            Some("text/html")
        );
        assert_eq!(ContentSniffer::detect(b"<div class=\"x\">"), Some("text/html"));
    }

    #[test]
    fn test_detect_binary_signatures() {
        assert_eq!(
            ContentSniffer::detect(b"\x89PNG\r\n\x1a\n\0\0"),
            Some("image/png")
        );
        assert_eq!(ContentSniffer::detect(b"%PDF-1.7"), Some("application/pdf"));
    }

    #[test]
    fn test_detect_json_and_xml() {
        assert_eq!(
            ContentSniffer::detect(br#"{"ok":true}"#),
            Some("application/json")
        );
        assert_eq!(ContentSniffer::detect(b"{not json"), None);
        assert_eq!(
            ContentSniffer::detect(b"<?xml version=\"1.0\"?><a/>"),
            Some("text/xml")
        );
    }

    #[test]
    fn test_plain_text_is_unrecognised() {
        assert_eq!(ContentSniffer::detect(b"hello world"), None);
        assert_eq!(ContentSniffer::detect(b""), None);
        assert_eq!(ContentSniffer::detect(b"   "), None);
    }
}
