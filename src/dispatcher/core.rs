use super::action::{filter_parameters, Action, DispatchOutcome, FnAction};
use crate::capabilities::Capabilities;
use crate::context::ActionContext;
use crate::error::ActionError;
use crate::ids::InvocationId;
use crate::request::ActionRequest;
use crate::response::ActionResponse;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn};

/// Registry of actions and the entry point for invoking them
pub struct Dispatcher {
    actions: HashMap<String, Arc<dyn Action>>,
    capabilities: Capabilities,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Capabilities::default())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.actions.keys().collect();
        names.sort();
        f.debug_struct("Dispatcher")
            .field("actions", &names)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// Normalize an action name
///
/// `:` is accepted as a namespace separator (handy inside templates) and
/// rewritten to `::`; surrounding whitespace and leading separators are
/// ignored.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for segment in name.trim().split(':').filter(|s| !s.is_empty()) {
        if !out.is_empty() {
            out.push_str("::");
        }
        out.push_str(segment.trim());
    }
    out
}

impl Dispatcher {
    /// Create an empty dispatcher sharing `capabilities` with every action
    #[must_use]
    pub fn new(capabilities: Capabilities) -> Self {
        Dispatcher {
            actions: HashMap::new(),
            capabilities,
        }
    }

    /// Shared collaborators and settings
    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Register `action` under `name`
    ///
    /// If an action with the same name already exists, it is replaced.
    pub fn register<A: Action + 'static>(&mut self, name: &str, action: A) -> &mut Self {
        self.register_arc(name, Arc::new(action))
    }

    /// Register an already shared action
    pub fn register_arc(&mut self, name: &str, action: Arc<dyn Action>) -> &mut Self {
        let action_name = normalize_name(name);

        if self.actions.remove(&action_name).is_some() {
            warn!(
                action = %action_name,
                total_actions = self.actions.len(),
                "Replaced existing action"
            );
        }

        info!(
            action = %action_name,
            parameters = ?action.parameters(),
            total_actions = self.actions.len() + 1,
            "Action registered"
        );

        self.actions.insert(action_name, action);
        self
    }

    /// Register a closure accepting `parameters`
    pub fn register_fn<F>(
        &mut self,
        name: &str,
        parameters: &'static [&'static str],
        handler: F,
    ) -> &mut Self
    where
        F: Fn(
                &mut ActionContext,
                Map<String, Value>,
            ) -> anyhow::Result<super::action::ActionResult>
            + Send
            + Sync
            + 'static,
    {
        self.register(name, FnAction::new(parameters, handler))
    }

    /// `true` if an action is registered under `name`
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(&normalize_name(name))
    }

    /// Registered action names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Invoke the action registered under `name`
    ///
    /// `params` is filtered to the names the action declares; unknown names
    /// are dropped silently. A response returned by the action comes back as
    /// [`DispatchOutcome::Redirected`] and must be used as the final response.
    ///
    /// # Errors
    ///
    /// [`ActionError::NotCallable`] when nothing is registered under `name`,
    /// [`ActionError::Handler`] when the action fails. An [`ActionError`]
    /// returned by the action itself (a missing parameter, a helper without
    /// its capability) is passed through unchanged.
    pub fn call(
        &self,
        name: &str,
        request: ActionRequest,
        response: ActionResponse,
        params: Map<String, Value>,
    ) -> Result<DispatchOutcome, ActionError> {
        let action_name = normalize_name(name);
        let action = self
            .actions
            .get(&action_name)
            .ok_or_else(|| ActionError::NotCallable {
                action: action_name.clone(),
            })?;
        self.invoke(&action_name, action.as_ref(), request, response, params)
    }

    /// Invoke an action that is not (or not necessarily) registered
    ///
    /// # Errors
    ///
    /// [`ActionError::Handler`] when the action fails.
    pub fn invoke(
        &self,
        name: &str,
        action: &dyn Action,
        request: ActionRequest,
        response: ActionResponse,
        params: Map<String, Value>,
    ) -> Result<DispatchOutcome, ActionError> {
        let invocation_id = InvocationId::from_request(&request);
        self.run(name, action, request, response, params, invocation_id)
    }

    fn run(
        &self,
        name: &str,
        action: &dyn Action,
        request: ActionRequest,
        response: ActionResponse,
        params: Map<String, Value>,
        invocation_id: InvocationId,
    ) -> Result<DispatchOutcome, ActionError> {
        let span = info_span!(
            "action",
            action = %name,
            invocation_id = %invocation_id,
            method = %request.method(),
            path = %request.path()
        );
        let _enter = span.enter();

        let (params, dropped) = filter_parameters(params, action.parameters());
        if !dropped.is_empty() {
            debug!(dropped = ?dropped, "Undeclared parameters dropped");
        }

        let mut cx = ActionContext::new(name, request, response, self.capabilities.clone())
            .with_invocation_id(invocation_id);
        if let Some(strict) = action.strict() {
            cx = cx.strict(strict);
        }

        // Helper and parameter errors raised inside the body surface as themselves
        let result = action
            .invoke(&mut cx, params)
            .map_err(|source| match source.downcast::<ActionError>() {
                Ok(err) => err,
                Err(source) => ActionError::Handler {
                    action: name.to_string(),
                    source,
                },
            })?;

        let outcome = DispatchOutcome::from(result);
        match &outcome {
            DispatchOutcome::Completed(data) => {
                debug!(keys = data.len(), "Action completed");
            }
            DispatchOutcome::Redirected(response) => {
                debug!(
                    status = response.status(),
                    location = response.header("Location").unwrap_or_default(),
                    "Action returned a response, short-circuiting"
                );
            }
        }
        Ok(outcome)
    }

    /// Run an action from inside a rendering context
    ///
    /// Explicit `params` are completed with the context's `parameters` entry
    /// (explicit values win). The action's data is merged into `context`,
    /// replacing existing keys. The action sees a fresh response and runs
    /// under the context's invocation id when it carries one.
    ///
    /// Returns `Some(response)` when the action short-circuited; the caller
    /// must stop rendering and use it.
    ///
    /// In debug mode an unregistered action yields no data instead of
    /// failing, so pages can be built before their actions exist.
    ///
    /// # Errors
    ///
    /// Same as [`Dispatcher::call`].
    pub fn embed(
        &self,
        context: &mut Map<String, Value>,
        name: &str,
        request: &ActionRequest,
        params: Map<String, Value>,
    ) -> Result<Option<ActionResponse>, ActionError> {
        let action_name = normalize_name(name);
        let Some(action) = self.actions.get(&action_name) else {
            if self.capabilities.config().debug {
                warn!(action = %action_name, "Action not registered, mocking empty result");
                return Ok(None);
            }
            return Err(ActionError::NotCallable {
                action: action_name,
            });
        };

        let mut combined = match context.get("parameters") {
            Some(Value::Object(inherited)) => inherited.clone(),
            _ => Map::new(),
        };
        for (key, value) in params {
            combined.insert(key, value);
        }

        let invocation_id =
            InvocationId::from_context(context).unwrap_or_else(|| InvocationId::from_request(request));
        match self.run(
            &action_name,
            action.as_ref(),
            request.clone(),
            ActionResponse::default(),
            combined,
            invocation_id,
        )? {
            DispatchOutcome::Completed(data) => {
                for (key, value) in data {
                    context.insert(key, value);
                }
                Ok(None)
            }
            DispatchOutcome::Redirected(response) => Ok(Some(response)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("blog:posts:Index"), "blog::posts::Index");
        assert_eq!(normalize_name("blog::posts::Index"), "blog::posts::Index");
        assert_eq!(normalize_name(" :Home "), "Home");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_replacing_registration() {
        let mut dispatcher = Dispatcher::default();
        dispatcher
            .register_fn("home", &[], |_, _| Ok(().into()))
            .register_fn("home", &["page"], |_, _| Ok(().into()));
        assert_eq!(dispatcher.names(), vec!["home"]);
        assert!(dispatcher.contains("home"));
    }
}
