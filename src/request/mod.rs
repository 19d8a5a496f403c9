//! # Request Module
//!
//! The inbound side of an action invocation. [`ActionRequest`] exposes the four
//! layered data sources an action reads from (query parameters, parsed body,
//! uploaded files and attributes) together with the method and header lines.
//!
//! Requests are immutable values: adding an attribute or header returns a new
//! request, so the copy held by the data resolver never changes once the
//! merged view has been materialized.
//!
//! ## Building requests
//!
//! ```rust
//! use brrtaction::request::ActionRequest;
//! use http::Method;
//!
//! let req = ActionRequest::new(Method::GET, "/users/7")
//!     .with_query_param("tab", "posts")
//!     .with_attribute("id", 7);
//!
//! assert_eq!(req.attribute("id"), Some(&serde_json::json!(7)));
//! ```
//!
//! Server integrations usually go through [`ActionRequest::from_http`], which
//! decodes the query string and JSON or urlencoded bodies.

mod core;
mod parse;

pub use core::{ActionRequest, HeaderVec, UploadedFile, MAX_INLINE_HEADERS};
pub use parse::{parse_body, parse_query_params, parse_urlencoded};
