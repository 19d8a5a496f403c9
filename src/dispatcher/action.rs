use crate::context::ActionContext;
use crate::error::ActionError;
use crate::response::ActionResponse;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;

/// Callable entry point of an action
///
/// Usually generated by the [`#[action]`](crate::action) attribute, which
/// derives [`Action::parameters`] from the function signature. Implement it
/// by hand for actions that need state.
pub trait Action: Send + Sync {
    /// Names of the parameters the entry point accepts
    ///
    /// Any other caller-supplied parameter is dropped before invocation.
    fn parameters(&self) -> &'static [&'static str];

    /// Run the action with the filtered parameters
    ///
    /// # Errors
    ///
    /// Any error is reported to the caller as
    /// [`ActionError::Handler`](crate::ActionError::Handler).
    fn invoke(&self, cx: &mut ActionContext, params: Map<String, Value>)
        -> anyhow::Result<ActionResult>;

    /// Per-action override of the strict data merge; `None` uses the
    /// configured default
    fn strict(&self) -> Option<bool> {
        None
    }
}

/// What an action body produced
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    /// Plain data for the caller (usually a template context)
    Data(Map<String, Value>),
    /// A finished response that ends request processing
    Response(ActionResponse),
}

impl From<Map<String, Value>> for ActionResult {
    fn from(data: Map<String, Value>) -> Self {
        ActionResult::Data(data)
    }
}

impl From<ActionResponse> for ActionResult {
    fn from(response: ActionResponse) -> Self {
        ActionResult::Response(response)
    }
}

impl From<()> for ActionResult {
    fn from(_: ()) -> Self {
        ActionResult::Data(Map::new())
    }
}

/// Interpreted result of a dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The action returned data
    Completed(Map<String, Value>),
    /// The action returned a response; the caller must adopt it as final
    Redirected(ActionResponse),
}

impl DispatchOutcome {
    /// Data of a completed dispatch
    #[must_use]
    pub fn data(&self) -> Option<&Map<String, Value>> {
        match self {
            DispatchOutcome::Completed(data) => Some(data),
            DispatchOutcome::Redirected(_) => None,
        }
    }

    /// Response of a short-circuited dispatch
    #[must_use]
    pub fn response(&self) -> Option<&ActionResponse> {
        match self {
            DispatchOutcome::Completed(_) => None,
            DispatchOutcome::Redirected(response) => Some(response),
        }
    }

    #[must_use]
    pub fn into_response(self) -> Option<ActionResponse> {
        match self {
            DispatchOutcome::Completed(_) => None,
            DispatchOutcome::Redirected(response) => Some(response),
        }
    }
}

impl From<ActionResult> for DispatchOutcome {
    fn from(result: ActionResult) -> Self {
        match result {
            ActionResult::Data(data) => DispatchOutcome::Completed(data),
            ActionResult::Response(response) => DispatchOutcome::Redirected(response),
        }
    }
}

type ActionFn =
    dyn Fn(&mut ActionContext, Map<String, Value>) -> anyhow::Result<ActionResult> + Send + Sync;

/// [`Action`] built from a closure and an explicit parameter list
pub struct FnAction {
    parameters: &'static [&'static str],
    handler: Box<ActionFn>,
    strict: Option<bool>,
}

impl FnAction {
    pub fn new<F>(parameters: &'static [&'static str], handler: F) -> Self
    where
        F: Fn(&mut ActionContext, Map<String, Value>) -> anyhow::Result<ActionResult>
            + Send
            + Sync
            + 'static,
    {
        Self {
            parameters,
            handler: Box::new(handler),
            strict: None,
        }
    }

    /// Force the strict data merge on or off for this action
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }
}

impl fmt::Debug for FnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction")
            .field("parameters", &self.parameters)
            .field("strict", &self.strict)
            .finish()
    }
}

impl Action for FnAction {
    fn parameters(&self) -> &'static [&'static str] {
        self.parameters
    }

    fn invoke(
        &self,
        cx: &mut ActionContext,
        params: Map<String, Value>,
    ) -> anyhow::Result<ActionResult> {
        (self.handler)(cx, params)
    }

    fn strict(&self) -> Option<bool> {
        self.strict
    }
}

/// Keep only the parameters named in `accepted`
///
/// Returns the kept parameters, in the caller's order, and the names of the
/// dropped ones.
#[must_use]
pub fn filter_parameters(
    params: Map<String, Value>,
    accepted: &[&str],
) -> (Map<String, Value>, Vec<String>) {
    let mut kept = Map::new();
    let mut dropped = Vec::new();
    for (name, value) in params {
        if accepted.contains(&name.as_str()) {
            kept.insert(name, value);
        } else {
            dropped.push(name);
        }
    }
    (kept, dropped)
}

fn convert(value: &str) -> Value {
    if let Ok(v) = value.parse::<i64>() {
        Value::from(v)
    } else if let Ok(v) = value.parse::<f64>() {
        Value::from(v)
    } else if let Ok(v) = value.parse::<bool>() {
        Value::from(v)
    } else {
        Value::String(value.to_string())
    }
}

/// Take parameter `name` out of `params` and deserialize it
///
/// Used by code generated with `#[action]`. String values that do not
/// deserialize as-is are retried as number or boolean, since route and query
/// parameters arrive as text. A missing `optional` parameter deserializes
/// from `null`.
///
/// # Errors
///
/// [`ActionError::Parameter`] when a required parameter is missing or the
/// value has the wrong shape.
pub fn extract_parameter<T: DeserializeOwned>(
    action: &str,
    params: &mut Map<String, Value>,
    name: &str,
    optional: bool,
) -> Result<T, ActionError> {
    let parameter_error = |reason: String| ActionError::Parameter {
        action: action.to_string(),
        name: name.to_string(),
        reason,
    };
    let value = match params.remove(name) {
        Some(value) => value,
        None if optional => Value::Null,
        None => return Err(parameter_error("missing".to_string())),
    };
    match serde_json::from_value::<T>(value.clone()) {
        Ok(parsed) => Ok(parsed),
        Err(err) => match value {
            Value::String(text) => serde_json::from_value(convert(&text))
                .map_err(|_| parameter_error(err.to_string())),
            _ => Err(parameter_error(err.to_string())),
        },
    }
}
