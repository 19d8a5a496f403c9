use crate::capabilities::Capabilities;
use crate::data::DataResolver;
use crate::error::ActionError;
use crate::ids::{InvocationId, INVOCATION_ID_KEY};
use crate::request::ActionRequest;
use crate::response::{ActionResponse, Content, Headers, ResponseBuilder};
use crate::templates::Template;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// State of one action invocation
///
/// Created by the [`Dispatcher`](crate::dispatcher::Dispatcher) and handed to
/// the handler by mutable reference. It owns the request (through its
/// [`DataResolver`]) and the in-progress response, and exposes the response
/// helpers: [`response`](Self::response), [`redirect`](Self::redirect),
/// [`json`](Self::json), [`template`](Self::template) and
/// [`flash`](Self::flash).
///
/// Helpers never modify the in-progress response; they return a new
/// [`ActionResponse`] which the handler returns to end the request. Only
/// [`init`](Self::init) replaces the in-progress response.
#[derive(Debug)]
pub struct ActionContext {
    action: String,
    invocation_id: InvocationId,
    data: DataResolver,
    response: ActionResponse,
    capabilities: Capabilities,
}

impl ActionContext {
    /// Create the context for one invocation of `action`
    #[must_use]
    pub fn new(
        action: &str,
        request: ActionRequest,
        response: ActionResponse,
        capabilities: Capabilities,
    ) -> Self {
        let strict = capabilities.config().strict;
        Self {
            action: action.to_string(),
            invocation_id: InvocationId::new(),
            data: DataResolver::new(request).strict(strict),
            response,
            capabilities,
        }
    }

    /// Use a caller-supplied invocation id
    #[must_use]
    pub fn with_invocation_id(mut self, id: InvocationId) -> Self {
        self.invocation_id = id;
        self
    }

    /// Override the strictness of the request data merge
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.data = self.data.strict(strict);
        self
    }

    /// Name of the running action
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    #[must_use]
    pub fn invocation_id(&self) -> InvocationId {
        self.invocation_id
    }

    /// The request being handled
    #[must_use]
    pub fn request(&self) -> &ActionRequest {
        self.data.request()
    }

    /// Replace the request with a copy carrying an extra attribute
    ///
    /// The merged data view is not rebuilt once it holds data.
    pub fn with_attribute(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        let request = self.data.request().clone().with_attribute(name, value);
        self.data.replace_request(request);
        self
    }

    /// The in-progress response
    #[must_use]
    pub fn current_response(&self) -> &ActionResponse {
        &self.response
    }

    /// Shared collaborators and settings
    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Request data resolver
    #[must_use]
    pub fn data(&self) -> &DataResolver {
        &self.data
    }

    /// Request data resolver, for `set`
    pub fn data_mut(&mut self) -> &mut DataResolver {
        &mut self.data
    }

    /// Raw value from the merged view
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// `true` if `name` is present in the merged view
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.data.has(name)
    }

    /// Set a value in the merged view
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.data.set(name, value);
        self
    }

    /// Reset the in-progress response to an empty one with `status`
    ///
    /// Used to switch an action into an error page while still rendering
    /// normally.
    pub fn init(&mut self, status: u16) -> &mut Self {
        debug!(action = %self.action, status, "Response re-initialised");
        self.response = ActionResponse::new(status);
        self
    }

    /// Build a response from the in-progress one
    ///
    /// See [`ResponseBuilder::build`] for the exact steps. The in-progress
    /// response itself is left untouched.
    pub fn response(
        &self,
        status: u16,
        content: impl Into<Content>,
        headers: impl Into<Headers>,
    ) -> ActionResponse {
        let config = self.capabilities.config();
        let headers: Headers = headers.into();
        ResponseBuilder::new(
            self.data.request(),
            self.capabilities.stream_factory(),
            self.capabilities.sniffer(),
        )
        .fallback_mime(&config.fallback_mime_type)
        .htmx(config.htmx)
        .build(&self.response, status, content.into(), &headers)
    }

    /// Build a redirect to the URL generated for `location`
    ///
    /// A 3xx status already set on the in-progress response is kept, any
    /// other becomes `303 See Other`.
    ///
    /// # Errors
    ///
    /// [`ActionError::MissingCapability`] without a URL generator,
    /// [`ActionError::UrlGeneration`] when the generator fails.
    pub fn redirect(
        &self,
        location: &str,
        params: Map<String, Value>,
    ) -> Result<ActionResponse, ActionError> {
        let urls = self
            .capabilities
            .url_generator()
            .ok_or_else(|| ActionError::missing("UrlGenerator", "redirect"))?;
        let target = urls
            .generate(location, &params)
            .map_err(|source| ActionError::UrlGeneration {
                location: location.to_string(),
                source,
            })?;

        let status = if self.response.is_redirection() {
            self.response.status()
        } else {
            303
        };
        debug!(action = %self.action, location = %target, status, "Redirecting");
        Ok(self.response(status, Content::Empty, [("Location", target)]))
    }

    /// Build a JSON response from any serializable value
    ///
    /// # Errors
    ///
    /// Returns the serializer error if `data` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(
        &self,
        status: u16,
        data: &T,
    ) -> Result<ActionResponse, serde_json::Error> {
        let body = serde_json::to_string(data)?;
        Ok(self.response(status, body, [("Content-Type", "application/json")]))
    }

    /// Load a template bound to `data`
    ///
    /// Unless `data` already has them, a `request` entry describing the
    /// request (method, path, query, attributes) and an `invocation_id` entry
    /// are added. Actions embedded while rendering pick the id up again.
    ///
    /// # Errors
    ///
    /// [`ActionError::MissingCapability`] without a template manager,
    /// [`ActionError::Template`] when the template cannot be loaded.
    pub fn template(&self, path: &str, mut data: Map<String, Value>) -> Result<Template, ActionError> {
        let templates = self
            .capabilities
            .templates()
            .ok_or_else(|| ActionError::missing("TemplateManager", "template"))?;
        if !data.contains_key("request") {
            data.insert("request".to_string(), self.data.request().template_view());
        }
        if !data.contains_key(INVOCATION_ID_KEY) {
            let id = serde_json::to_value(self.invocation_id).map_err(|err| ActionError::Template {
                path: path.to_string(),
                reason: err.to_string(),
            })?;
            data.insert(INVOCATION_ID_KEY.to_string(), id);
        }
        templates
            .load(path, data)
            .map_err(|err| ActionError::Template {
                path: path.to_string(),
                reason: format!("{:#}", err),
            })
    }

    /// Queue a one-shot message for the next request
    ///
    /// # Errors
    ///
    /// [`ActionError::MissingCapability`] without a flash store.
    pub fn flash(&self, category: &str, message: &str) -> Result<(), ActionError> {
        let store = self
            .capabilities
            .flash_store()
            .ok_or_else(|| ActionError::missing("FlashStore", "flash"))?;
        store.flash(category, message);
        Ok(())
    }
}
