use super::coerce;
use super::store::{merge_sources, DataStore};
use crate::request::ActionRequest;
use serde_json::{Map, Value};

/// Typed, precedence-resolved access to the request's data
///
/// Owns the request for the invocation and materializes the merged data view
/// on first access. Once the view holds data it is fixed: replacing the
/// request (for instance with a copy carrying an extra attribute) does not
/// re-merge, and [`DataResolver::set`] only ever touches the view. While the
/// view is still empty every read merges again.
///
/// # Example
///
/// ```rust
/// use brrtaction::data::DataResolver;
/// use brrtaction::request::ActionRequest;
/// use http::Method;
///
/// let req = ActionRequest::new(Method::GET, "/posts")
///     .with_query_param("page", "3")
///     .with_query_param("tags", "rust");
/// let data = DataResolver::new(req);
///
/// assert_eq!(data.get_int("page", 1), 3);
/// assert_eq!(data.get_list("tags", vec![]), vec![serde_json::json!("rust")]);
/// assert_eq!(data.get_int("limit", 20), 20);
/// ```
#[derive(Debug)]
pub struct DataResolver {
    request: ActionRequest,
    store: DataStore,
    strict: bool,
}

impl DataResolver {
    /// Create a resolver over `request`
    #[must_use]
    pub fn new(request: ActionRequest) -> Self {
        Self {
            request,
            store: DataStore::new(),
            strict: false,
        }
    }

    /// Leave body and uploaded files out of the on-demand merge
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// `true` if the on-demand merge ignores body and files
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// The request data is read from
    #[must_use]
    pub fn request(&self) -> &ActionRequest {
        &self.request
    }

    /// Replace the request
    ///
    /// Has no effect on a view that already holds data.
    pub fn replace_request(&mut self, request: ActionRequest) {
        self.request = request;
    }

    /// Materialize the merged view
    ///
    /// Idempotent once the view holds data: later calls return the cached
    /// view regardless of `strict`. An empty merge is not cached.
    pub fn load(&self, strict: bool) -> &Map<String, Value> {
        self.store
            .get_or_load(|| merge_sources(&self.request, strict))
    }

    fn view(&self) -> &Map<String, Value> {
        self.load(self.strict)
    }

    /// The whole merged view
    #[must_use]
    pub fn all(&self) -> &Map<String, Value> {
        self.view()
    }

    /// Raw stored value, without coercion
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.view().get(name)
    }

    /// Stored value coerced to the JSON type of `default`
    ///
    /// Returns `default` unchanged when `name` is absent. A `null` default
    /// means no coercion.
    #[must_use]
    pub fn get_value(&self, name: &str, default: Value) -> Value {
        match self.get(name) {
            Some(value) => coerce::coerce_like(value.clone(), &default),
            None => default,
        }
    }

    /// Stored value as a string
    #[must_use]
    pub fn get_string(&self, name: &str, default: &str) -> String {
        self.get(name)
            .map(coerce::to_string)
            .unwrap_or_else(|| default.to_string())
    }

    /// Stored value as an integer
    #[must_use]
    pub fn get_int(&self, name: &str, default: i64) -> i64 {
        self.get(name).map(coerce::to_int).unwrap_or(default)
    }

    /// Stored value as a float
    #[must_use]
    pub fn get_float(&self, name: &str, default: f64) -> f64 {
        self.get(name).map(coerce::to_float).unwrap_or(default)
    }

    /// Stored value as a boolean
    #[must_use]
    pub fn get_bool(&self, name: &str, default: bool) -> bool {
        self.get(name).map(coerce::to_bool).unwrap_or(default)
    }

    /// Stored value as a list
    ///
    /// Scalars become a single-element list, falsy values the empty list.
    #[must_use]
    pub fn get_list(&self, name: &str, default: Vec<Value>) -> Vec<Value> {
        match self.get(name) {
            Some(value) => coerce::to_list(value.clone()),
            None => default,
        }
    }

    /// Stored value wrapped into `T`
    ///
    /// The raw value is handed to `T::from`; `default` is returned when the
    /// name is absent.
    #[must_use]
    pub fn get_or_construct<T: From<Value>>(&self, name: &str, default: T) -> T {
        match self.get(name) {
            Some(value) => T::from(value.clone()),
            None => default,
        }
    }

    /// `true` if the merged view holds any entry
    #[must_use]
    pub fn has_any(&self) -> bool {
        !self.view().is_empty()
    }

    /// `true` if `name` is present, whatever its value
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.view().contains_key(name)
    }

    /// Set a value in the merged view
    ///
    /// The request's attributes are not modified.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        let request = &self.request;
        let strict = self.strict;
        self.store
            .insert_with(name, value.into(), || merge_sources(request, strict));
        self
    }
}
