//! # brrtaction
//!
//! **brrtaction** is the request-handling core for controller-style "actions": small named
//! units of work that read request data, decide what to do, and either hand data back to a
//! renderer or end the request with a response of their own.
//!
//! ## Overview
//!
//! An action is invoked by name with a parameter map (typically route parameters). The crate
//! takes care of everything around the action body:
//!
//! - **[`dispatcher`]** - Action registry, parameter filtering, invocation and interpretation
//!   of the result (data vs. short-circuit response)
//! - **[`data`]** - The merged request data view with method-dependent precedence and typed,
//!   coercing accessors
//! - **[`response`]** - Immutable responses, body sniffing, `Content-Length`, and the HTMX
//!   redirect adaptation
//! - **[`context`]** - The per-invocation [`ActionContext`] handed to the body, with the
//!   `response`, `redirect`, `json`, `template` and `flash` helpers
//! - **[`capabilities`]** - Collaborators wired once at startup (URL generator, templates,
//!   flash store, body stream factory, MIME sniffer)
//! - **[`request`]** - The inbound [`ActionRequest`] and conversion from `http::Request`
//!
//! ### Invocation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller
//!     participant D as Dispatcher
//!     participant A as Action
//!     participant R as DataResolver
//!     participant B as ResponseBuilder
//!
//!     Caller->>D: call(name, request, response, params)
//!     D->>D: filter params to Action::parameters()
//!     D->>A: invoke(cx, params)
//!     A->>R: cx.data().get_int("page", 1)
//!     R->>R: merge sources (first read only)
//!     R-->>A: 2
//!     alt returns data
//!         A-->>D: ActionResult::Data
//!         D-->>Caller: DispatchOutcome::Completed
//!     else returns a response
//!         A->>B: cx.redirect("/posts", params)
//!         B-->>A: 303 + Location
//!         A-->>D: ActionResult::Response
//!         D-->>Caller: DispatchOutcome::Redirected
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use brrtaction::{action, ActionContext, ActionResult, Capabilities, DispatchOutcome, Dispatcher};
//! use brrtaction::request::ActionRequest;
//! use brrtaction::response::ActionResponse;
//! use http::Method;
//! use serde_json::{json, Map, Value};
//!
//! #[action]
//! fn archive_post(cx: &mut ActionContext, id: i64) -> anyhow::Result<ActionResult> {
//!     if cx.data().get_bool("confirm", false) {
//!         let mut params = Map::new();
//!         params.insert("id".into(), json!(id));
//!         return Ok(cx.redirect("/posts", params)?.into());
//!     }
//!     let mut data = Map::new();
//!     data.insert("id".into(), json!(id));
//!     Ok(data.into())
//! }
//!
//! let caps = Capabilities::builder()
//!     .url_generator(|location: &str, params: &Map<String, Value>| {
//!         Ok::<_, anyhow::Error>(format!("{}?archived={}", location, params["id"]))
//!     })
//!     .build();
//! let mut dispatcher = Dispatcher::new(caps);
//! dispatcher.register("posts:Archive", ArchivePost);
//!
//! let request = ActionRequest::new(Method::POST, "/posts/9/archive")
//!     .with_parsed_body(json!({"confirm": "1"}));
//! let mut params = Map::new();
//! params.insert("id".into(), json!("9"));
//!
//! let outcome = dispatcher
//!     .call("posts::Archive", request, ActionResponse::default(), params)
//!     .unwrap();
//! match outcome {
//!     DispatchOutcome::Redirected(res) => {
//!         assert_eq!(res.status(), 303);
//!         assert_eq!(res.header("Location"), Some("/posts?archived=9"));
//!     }
//!     DispatchOutcome::Completed(_) => unreachable!(),
//! }
//! ```
//!
//! ## Configuration
//!
//! Runtime settings live in [`config::ActionConfig`] (environment variables `BRRTA_*` or a
//! YAML file). Logging is set up with [`logging::init_logging_with_config`]; every
//! invocation runs inside an `action` tracing span.
//!
//! ## Runtime Considerations
//!
//! Everything here is synchronous and request-scoped. One [`ActionContext`] exists per
//! invocation and is never shared; collaborators are shared read-only through `Arc`.

extern crate self as brrtaction;

pub mod capabilities;
pub mod config;
pub mod context;
pub mod data;
pub mod dispatcher;
pub mod error;
pub mod flash;
pub mod ids;
pub mod logging;
pub mod request;
pub mod response;
pub mod templates;

pub use brrtaction_macros::action;
pub use capabilities::{Capabilities, CapabilitiesBuilder, FlashStore, TemplateManager, UrlGenerator};
pub use context::ActionContext;
pub use dispatcher::{Action, ActionResult, DispatchOutcome, Dispatcher};
pub use error::ActionError;
pub use request::ActionRequest;
pub use response::ActionResponse;

#[doc(hidden)]
pub mod __private {
    pub use anyhow;
    pub use serde_json;
}
