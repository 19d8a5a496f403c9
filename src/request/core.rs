use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::path::PathBuf;
use std::sync::Arc;

/// Maximum inline headers before heap allocation
/// Most requests carry ≤16 headers
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage shared by requests and responses
///
/// Header names use `Arc<str>` because the same names (Content-Type,
/// Location, HX-Request, ...) are repeated on every request and cloning
/// an `Arc` is an atomic increment rather than a string copy.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Descriptor of a file uploaded with the request
///
/// The server layer stores the payload on disk and hands the action this
/// descriptor; the core never reads the file itself. Descriptors join the
/// merged request data as JSON objects keyed by [`UploadedFile::field`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Form field the file was sent under. A trailing `[]` groups several
    /// files under one key.
    pub field: String,
    /// File name reported by the client
    pub client_filename: Option<String>,
    /// Media type reported by the client
    pub client_media_type: Option<String>,
    /// Size in bytes
    pub size: u64,
    /// Server-side location of the stored payload
    pub path: PathBuf,
}

impl UploadedFile {
    /// Create a descriptor for `field` stored at `path`
    pub fn new<P: Into<PathBuf>>(field: &str, path: P, size: u64) -> Self {
        Self {
            field: field.to_string(),
            client_filename: None,
            client_media_type: None,
            size,
            path: path.into(),
        }
    }

    /// Attach the client-reported file name
    #[must_use]
    pub fn with_client_filename(mut self, name: &str) -> Self {
        self.client_filename = Some(name.to_string());
        self
    }

    /// Attach the client-reported media type
    #[must_use]
    pub fn with_client_media_type(mut self, media_type: &str) -> Self {
        self.client_media_type = Some(media_type.to_string());
        self
    }

    fn descriptor(&self) -> Value {
        serde_json::json!({
            "client_filename": self.client_filename,
            "client_media_type": self.client_media_type,
            "size": self.size,
            "path": self.path.to_string_lossy(),
        })
    }
}

/// Inbound request as seen by an action
///
/// The value is immutable: every `with_*` method consumes the request and
/// returns a modified copy, so a request captured earlier in the invocation
/// never changes underneath its holder.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    method: Method,
    path: String,
    headers: HeaderVec,
    query_params: Map<String, Value>,
    parsed_body: Option<Value>,
    uploaded_files: Vec<UploadedFile>,
    attributes: Map<String, Value>,
}

impl ActionRequest {
    /// Create an empty request for `method` and `path`
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: HeaderVec::new(),
            query_params: Map::new(),
            parsed_body: None,
            uploaded_files: Vec::new(),
            attributes: Map::new(),
        }
    }

    /// HTTP method
    #[inline]
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request path without query string
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// `true` for the retrieval-safe methods whose state travels in the query string
    ///
    /// `HEAD` is a body-less `GET` and is treated the same way.
    #[inline]
    #[must_use]
    pub fn is_safe(&self) -> bool {
        self.method == Method::GET || self.method == Method::HEAD
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Values of every header line with this name, in arrival order
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All header lines in arrival order
    #[must_use]
    pub fn headers(&self) -> &HeaderVec {
        &self.headers
    }

    /// Query string parameters
    #[must_use]
    pub fn query_params(&self) -> &Map<String, Value> {
        &self.query_params
    }

    /// Parsed request body, if the body could be decoded
    #[must_use]
    pub fn parsed_body(&self) -> Option<&Value> {
        self.parsed_body.as_ref()
    }

    /// Uploaded file descriptors
    #[must_use]
    pub fn uploaded_files(&self) -> &[UploadedFile] {
        &self.uploaded_files
    }

    /// Route and handler attributes
    #[must_use]
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Get an attribute by name
    #[inline]
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Parsed body as a key→value mapping
    ///
    /// Objects are used as-is, arrays are keyed by their index and scalar
    /// bodies contribute nothing.
    #[must_use]
    pub fn body_params(&self) -> Map<String, Value> {
        match &self.parsed_body {
            Some(Value::Object(map)) => map.clone(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v.clone()))
                .collect(),
            _ => Map::new(),
        }
    }

    /// Uploaded files as a key→descriptor mapping
    ///
    /// Fields named `photos[]` are collected into an array under `photos`;
    /// otherwise the last file for a field wins.
    #[must_use]
    pub fn file_params(&self) -> Map<String, Value> {
        let mut files = Map::new();
        for file in &self.uploaded_files {
            if let Some(base) = file.field.strip_suffix("[]") {
                let slot = files
                    .entry(base.to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                match slot {
                    Value::Array(items) => items.push(file.descriptor()),
                    other => *other = Value::Array(vec![file.descriptor()]),
                }
            } else {
                files.insert(file.field.clone(), file.descriptor());
            }
        }
        files
    }

    /// Return a copy with an added (or replaced) attribute
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// Return a copy with an added header line, replacing any same-named header
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value.to_string()));
        self
    }

    /// Return a copy with an extra header line, keeping same-named lines
    #[must_use]
    pub fn with_appended_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((Arc::from(name), value.to_string()));
        self
    }

    /// Return a copy with an added query parameter
    #[must_use]
    pub fn with_query_param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.query_params.insert(name.to_string(), value.into());
        self
    }

    /// Return a copy with the given query parameters
    #[must_use]
    pub fn with_query_params(mut self, params: Map<String, Value>) -> Self {
        self.query_params = params;
        self
    }

    /// Return a copy with the given parsed body
    #[must_use]
    pub fn with_parsed_body(mut self, body: Value) -> Self {
        self.parsed_body = Some(body);
        self
    }

    /// Return a copy with an added uploaded file
    #[must_use]
    pub fn with_uploaded_file(mut self, file: UploadedFile) -> Self {
        self.uploaded_files.push(file);
        self
    }

    /// Return a copy with the path replaced
    #[must_use]
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Compact view of the request exposed to templates
    #[must_use]
    pub fn template_view(&self) -> Value {
        serde_json::json!({
            "method": self.method.as_str(),
            "path": self.path,
            "query": self.query_params,
            "attributes": self.attributes,
        })
    }
}
