//! # Dispatcher Module
//!
//! Turns a named invocation into a validated handler call and interprets its
//! result.
//!
//! ## Overview
//!
//! - Actions are registered by name; `:` in a name is a namespace separator
//!   and is normalized to `::`
//! - Caller-supplied parameters are filtered to the names the action declares
//!   ([`Action::parameters`]); anything else is dropped without error
//! - The handler receives an [`ActionContext`](crate::context::ActionContext)
//!   holding the request, the in-progress response and the shared
//!   [`Capabilities`](crate::capabilities::Capabilities)
//! - Returned data becomes [`DispatchOutcome::Completed`]; a returned response
//!   becomes [`DispatchOutcome::Redirected`], a short-circuit the caller must
//!   adopt as the final response
//!
//! ## Registration
//!
//! ```rust
//! use brrtaction::dispatcher::{DispatchOutcome, Dispatcher};
//! use brrtaction::request::ActionRequest;
//! use brrtaction::response::ActionResponse;
//! use http::Method;
//! use serde_json::{json, Map};
//!
//! let mut dispatcher = Dispatcher::default();
//! dispatcher.register_fn("posts:Show", &["id"], |cx, params| {
//!     let mut data = Map::new();
//!     data.insert("id".into(), params["id"].clone());
//!     data.insert("page".into(), json!(cx.data().get_int("page", 1)));
//!     Ok(data.into())
//! });
//!
//! let mut params = Map::new();
//! params.insert("id".into(), json!(7));
//! params.insert("ignored".into(), json!(true));
//!
//! let request = ActionRequest::new(Method::GET, "/posts/7").with_query_param("page", "2");
//! let outcome = dispatcher
//!     .call("posts::Show", request, ActionResponse::default(), params)
//!     .unwrap();
//! assert_eq!(
//!     outcome,
//!     DispatchOutcome::Completed(
//!         json!({"id": 7, "page": 2}).as_object().cloned().unwrap()
//!     )
//! );
//! ```
//!
//! ## Logging
//!
//! Every invocation runs inside an `action` span carrying the action name
//! and an [`InvocationId`](crate::ids::InvocationId). Registration is logged
//! at `info`, dropped parameters and short-circuits at `debug`.

mod action;
mod core;

pub use action::{
    extract_parameter, filter_parameters, Action, ActionResult, DispatchOutcome, FnAction,
};
pub use core::{normalize_name, Dispatcher};
