use super::core::{ActionRequest, HeaderVec};
use bytes::Bytes;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Parse an urlencoded string into a nested key→value mapping
///
/// Handles bracketed keys the way HTML forms produce them:
///
/// - `tag=a&tag=b` → last occurrence wins (`"b"`)
/// - `tag[]=a&tag[]=b` → `["a", "b"]`
/// - `user[name]=ada` → `{"user": {"name": "ada"}}`
///
/// Values are always strings; typed access goes through the resolver's
/// coercion rules.
pub fn parse_urlencoded(input: &str) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in url::form_urlencoded::parse(input.as_bytes()) {
        let segments = split_key(&key);
        if segments.is_empty() {
            continue;
        }
        insert_nested(&mut out, &segments, Value::String(value.into_owned()));
    }
    out
}

/// Parse query string parameters from a URL path
///
/// Extracts everything after the `?` character.
///
/// # Arguments
///
/// * `path` - The full URL path (e.g., `/users?limit=10&offset=20`)
pub fn parse_query_params(path: &str) -> Map<String, Value> {
    match path.split_once('?') {
        Some((_, query)) => parse_urlencoded(query),
        None => Map::new(),
    }
}

/// Deepest bracket nesting accepted in a form key
///
/// A key nested deeper than this is dropped along with its value.
pub const MAX_NESTING_DEPTH: usize = 64;

fn split_key(key: &str) -> Vec<&str> {
    let Some(open) = key.find('[') else {
        return if key.is_empty() { vec![] } else { vec![key] };
    };
    if open == 0 {
        return vec![];
    }
    let mut segments = vec![&key[..open]];
    let mut rest = &key[open..];
    while let Some(stripped) = rest.strip_prefix('[') {
        match stripped.find(']') {
            Some(close) => {
                if segments.len() > MAX_NESTING_DEPTH {
                    debug!(key_len = key.len(), "Form key nested too deeply, dropped");
                    return vec![];
                }
                segments.push(&stripped[..close]);
                rest = &stripped[close + 1..];
            }
            None => break,
        }
    }
    segments
}

fn insert_nested(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    let (head, tail) = match segments.split_first() {
        Some(parts) => parts,
        None => return,
    };
    if tail.is_empty() {
        map.insert((*head).to_string(), value);
        return;
    }
    // `key[]` appends to a list
    if tail.len() == 1 && tail[0].is_empty() {
        let slot = map
            .entry((*head).to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        match slot {
            Value::Array(items) => items.push(value),
            other => *other = Value::Array(vec![value]),
        }
        return;
    }
    let slot = map
        .entry((*head).to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(inner) = slot {
        insert_nested(inner, tail, value);
    }
}

/// Decode a request body according to its content type
///
/// JSON bodies are parsed with `serde_json`, urlencoded form bodies with
/// [`parse_urlencoded`]. Anything else (including multipart, whose files are
/// handed over as [`super::UploadedFile`] descriptors by the server layer)
/// yields `None`.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    let media_type = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if media_type == "application/json" || media_type.ends_with("+json") {
        match serde_json::from_slice::<Value>(body) {
            Ok(json) => {
                debug!(
                    body_fields = json.as_object().map(|o| o.len()),
                    "JSON body parsed"
                );
                Some(json)
            }
            Err(err) => {
                debug!(error = %err, "JSON body parse failed");
                None
            }
        }
    } else if media_type == "application/x-www-form-urlencoded" {
        let text = String::from_utf8_lossy(body);
        Some(Value::Object(parse_urlencoded(&text)))
    } else {
        debug!(content_type = %media_type, "Request body left unparsed");
        None
    }
}

impl ActionRequest {
    /// Build an action request from an `http::Request`
    ///
    /// Header names are stored lowercase and repeated header lines are kept
    /// as separate lines. The query string and the body are decoded, and attributes start empty (routing adds them with
    /// [`ActionRequest::with_attribute`]).
    #[must_use]
    pub fn from_http(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();

        let headers: HeaderVec = parts
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    Arc::from(name.as_str()),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let query_params = parts
            .uri
            .query()
            .map(parse_urlencoded)
            .unwrap_or_default();

        let content_type = parts
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        let parsed_body = parse_body(content_type, &body);

        debug!(
            method = %parts.method,
            path = %parts.uri.path(),
            header_count = headers.len(),
            param_count = query_params.len(),
            has_body = parsed_body.is_some(),
            "HTTP request parsed"
        );

        let mut request = ActionRequest::new(parts.method, parts.uri.path())
            .with_query_params(query_params);
        for (name, value) in &headers {
            request = request.with_appended_header(name, value);
        }
        match parsed_body {
            Some(body) => request.with_parsed_body(body),
            None => request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde_json::json;

    #[test]
    fn test_parse_query_params() {
        let q = parse_query_params("/p?x=1&y=2");
        assert_eq!(q.get("x"), Some(&json!("1")));
        assert_eq!(q.get("y"), Some(&json!("2")));
        assert!(parse_query_params("/p").is_empty());
    }

    #[test]
    fn test_parse_urlencoded_brackets() {
        let q = parse_urlencoded("tag[]=a&tag[]=b&user[name]=ada&user[role]=admin&x=1&x=2");
        assert_eq!(q["tag"], json!(["a", "b"]));
        assert_eq!(q["user"], json!({"name": "ada", "role": "admin"}));
        assert_eq!(q["x"], json!("2"));
    }

    #[test]
    fn test_parse_urlencoded_skips_nameless_keys() {
        let q = parse_urlencoded("[oops]=1&=2&ok=3");
        assert_eq!(q.len(), 1);
        assert_eq!(q["ok"], json!("3"));
    }

    #[test]
    fn test_deeply_nested_keys_are_dropped() {
        let deep = format!("a{}=1&ok=2", "[x]".repeat(100_000));
        let q = parse_urlencoded(&deep);
        assert_eq!(q.len(), 1);
        assert_eq!(q["ok"], json!("2"));

        let limit = format!("b{}=1", "[x]".repeat(MAX_NESTING_DEPTH));
        let q = parse_urlencoded(&limit);
        let mut depth = 0;
        let mut node = &q["b"];
        while let Some(next) = node.get("x") {
            depth += 1;
            node = next;
        }
        assert_eq!(depth, MAX_NESTING_DEPTH);
        assert_eq!(node, &json!("1"));

        let over = format!("c{}=1", "[x]".repeat(MAX_NESTING_DEPTH + 1));
        assert!(parse_urlencoded(&over).is_empty());
    }

    #[test]
    fn test_parse_body_by_content_type() {
        assert_eq!(
            parse_body(Some("application/json; charset=utf-8"), br#"{"a":1}"#),
            Some(json!({"a": 1}))
        );
        assert_eq!(
            parse_body(Some("application/x-www-form-urlencoded"), b"a=1&b=two"),
            Some(json!({"a": "1", "b": "two"}))
        );
        assert_eq!(parse_body(Some("application/json"), b"{broken"), None);
        assert_eq!(parse_body(Some("text/plain"), b"hello"), None);
        assert_eq!(parse_body(Some("application/json"), b""), None);
    }

    #[test]
    fn test_from_http() {
        let req = http::Request::builder()
            .method(Method::POST)
            .uri("/users/7?page=2")
            .header("Content-Type", "application/json")
            .header("HX-Request", "true")
            .body(Bytes::from_static(br#"{"name":"ada"}"#))
            .unwrap();
        let req = ActionRequest::from_http(req);
        assert_eq!(req.method(), &Method::POST);
        assert_eq!(req.path(), "/users/7");
        assert_eq!(req.query_params()["page"], json!("2"));
        assert_eq!(req.parsed_body(), Some(&json!({"name": "ada"})));
        assert_eq!(req.header("hx-request"), Some("true"));
        assert!(req.attributes().is_empty());
    }

    #[test]
    fn test_from_http_keeps_repeated_header_lines() {
        let req = http::Request::builder()
            .uri("/")
            .header("Accept", "text/html")
            .header("Accept", "application/json")
            .header("Cookie", "a=1")
            .body(Bytes::new())
            .unwrap();
        let req = ActionRequest::from_http(req);
        assert_eq!(
            req.header_values("accept").collect::<Vec<_>>(),
            vec!["text/html", "application/json"]
        );
        assert_eq!(req.header("accept"), Some("text/html"));
        assert_eq!(req.headers().len(), 3);
    }
}
