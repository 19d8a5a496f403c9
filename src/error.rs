use std::fmt;

/// Error raised while dispatching an action or using one of its helpers
///
/// Every variant except [`ActionError::Handler`] describes a configuration
/// problem: the action or the application wiring is wrong, and retrying the
/// invocation will not help. A handler returning a response is *not* an error;
/// see [`crate::dispatcher::DispatchOutcome::Redirected`].
#[derive(Debug)]
pub enum ActionError {
    /// No callable entry point is registered under the requested name
    NotCallable {
        /// Normalized action name
        action: String,
    },
    /// A helper needs a collaborator that was never supplied
    ///
    /// Raised by `redirect()`, `template()` and `flash()` when the
    /// corresponding capability is absent.
    MissingCapability {
        /// Name of the missing collaborator (e.g. `UrlGenerator`)
        capability: &'static str,
        /// Helper that required it (e.g. `redirect`)
        helper: &'static str,
    },
    /// A declared handler parameter could not be built from the filtered parameters
    Parameter {
        /// Action being invoked
        action: String,
        /// Parameter name
        name: String,
        /// Human readable reason
        reason: String,
    },
    /// The handler body returned an error
    Handler {
        /// Action being invoked
        action: String,
        /// Underlying handler error
        source: anyhow::Error,
    },
    /// The template manager could not load a template
    Template {
        /// Template path requested by the action
        path: String,
        /// Human readable reason
        reason: String,
    },
    /// The URL generator failed to produce a location
    UrlGeneration {
        /// Location token handed to the generator
        location: String,
        /// Underlying generator error
        source: anyhow::Error,
    },
}

impl ActionError {
    /// Shorthand for [`ActionError::MissingCapability`]
    #[must_use]
    pub fn missing(capability: &'static str, helper: &'static str) -> Self {
        ActionError::MissingCapability { capability, helper }
    }

    /// `true` for errors caused by wiring or handler authoring mistakes
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ActionError::NotCallable { .. } | ActionError::MissingCapability { .. }
        )
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::NotCallable { action } => {
                write!(
                    f,
                    "Unable to execute call on action '{}': no callable entry point is registered",
                    action
                )
            }
            ActionError::MissingCapability { capability, helper } => {
                write!(
                    f,
                    "{}() is not supported: no implementation for '{}' is registered",
                    helper, capability
                )
            }
            ActionError::Parameter {
                action,
                name,
                reason,
            } => {
                write!(
                    f,
                    "Action '{}' cannot bind parameter '{}': {}",
                    action, name, reason
                )
            }
            ActionError::Handler { action, source } => {
                write!(f, "Action '{}' failed: {}", action, source)
            }
            ActionError::Template { path, reason } => {
                write!(f, "Unable to load template '{}': {}", path, reason)
            }
            ActionError::UrlGeneration { location, source } => {
                write!(f, "Unable to generate URL for '{}': {}", location, source)
            }
        }
    }
}

impl std::error::Error for ActionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ActionError::Handler { source, .. } | ActionError::UrlGeneration { source, .. } => {
                Some(&**source)
            }
            _ => None,
        }
    }
}
