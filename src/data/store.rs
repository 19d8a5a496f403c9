use crate::request::ActionRequest;
use once_cell::unsync::OnceCell;
use serde_json::{Map, Value};
use tracing::debug;

/// Names of the four request data sources, used in log output
const QUERY: &str = "query";
const BODY: &str = "body";
const FILES: &str = "files";
const ATTRIBUTES: &str = "attributes";

/// Ordered key→value store with lazily computed contents
///
/// The contents are computed by the first read that yields a non-empty map
/// and cached for the lifetime of the store. An empty result is not cached:
/// the next read computes again, so data that shows up after an empty read
/// (an attribute added by routing, say) is still picked up.
#[derive(Debug, Default)]
pub struct DataStore {
    view: OnceCell<Map<String, Value>>,
    empty: Map<String, Value>,
}

impl DataStore {
    /// Create an empty, not yet materialized store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once non-empty contents have been computed and cached
    #[must_use]
    pub fn is_materialized(&self) -> bool {
        self.view.get().is_some()
    }

    /// Return the contents, computing them with `load` until they are non-empty
    pub fn get_or_load<F>(&self, load: F) -> &Map<String, Value>
    where
        F: FnOnce() -> Map<String, Value>,
    {
        if let Some(view) = self.view.get() {
            return view;
        }
        let view = load();
        if view.is_empty() {
            return &self.empty;
        }
        self.view.get_or_init(|| view)
    }

    /// Insert one entry, computing the contents with `load` first if needed
    pub fn insert_with<F>(&mut self, name: &str, value: Value, load: F)
    where
        F: FnOnce() -> Map<String, Value>,
    {
        let mut view = self.view.take().unwrap_or_else(load);
        view.insert(name.to_string(), value);
        self.view = OnceCell::from(view);
    }
}

/// Recursively replace entries of `target` with those of `source`
///
/// Objects present on both sides are merged key by key and arrays index by
/// index; any other pairing is replaced by the `source` value.
pub fn replace_recursive(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, incoming) in source {
        match target.get_mut(&key) {
            Some(existing) => replace_value(existing, incoming),
            None => {
                target.insert(key, incoming);
            }
        }
    }
}

fn replace_value(existing: &mut Value, incoming: Value) {
    match (existing, incoming) {
        (Value::Object(current), Value::Object(next)) => replace_recursive(current, next),
        (Value::Array(current), Value::Array(next)) => {
            for (i, item) in next.into_iter().enumerate() {
                match current.get_mut(i) {
                    Some(slot) => replace_value(slot, item),
                    None => current.push(item),
                }
            }
        }
        (slot, next) => *slot = next,
    }
}

/// Merge the request's data sources into one view
///
/// Sources are applied lowest precedence first:
///
/// - safe methods (`GET`, `HEAD`): body, files, query, attributes
/// - all other methods: query, body, files, attributes
///
/// `strict` leaves body and files out entirely. Attributes are always applied
/// last so values set by routing override anything the client sent.
#[must_use]
pub fn merge_sources(request: &ActionRequest, strict: bool) -> Map<String, Value> {
    let query = || request.query_params().clone();
    let body = || {
        if strict {
            Map::new()
        } else {
            request.body_params()
        }
    };
    let files = || {
        if strict {
            Map::new()
        } else {
            request.file_params()
        }
    };

    let layers: [(&str, Map<String, Value>); 4] = if request.is_safe() {
        [
            (BODY, body()),
            (FILES, files()),
            (QUERY, query()),
            (ATTRIBUTES, request.attributes().clone()),
        ]
    } else {
        [
            (QUERY, query()),
            (BODY, body()),
            (FILES, files()),
            (ATTRIBUTES, request.attributes().clone()),
        ]
    };

    let mut view = Map::new();
    let mut order = Vec::with_capacity(layers.len());
    for (name, layer) in layers {
        if !layer.is_empty() {
            order.push(name);
        }
        replace_recursive(&mut view, layer);
    }

    debug!(
        method = %request.method(),
        strict = strict,
        layers = ?order,
        keys = view.len(),
        "Request data merged"
    );

    view
}
