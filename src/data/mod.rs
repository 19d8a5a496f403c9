//! # Data Module
//!
//! Request data resolution for actions.
//!
//! An action reads its input from one merged view assembled from four
//! sources of the request. The view is built on first access and cached for
//! the rest of the invocation.
//!
//! ## Precedence
//!
//! | method            | lowest → highest                      |
//! |-------------------|---------------------------------------|
//! | `GET`, `HEAD`     | body, files, query, attributes        |
//! | everything else   | query, body, files, attributes        |
//!
//! Safe requests carry their state in the query string, mutating requests in
//! the body. Attributes (route parameters and values set by the handler) are
//! always applied last. In strict mode body and files are skipped entirely.
//!
//! ## Typed access
//!
//! [`DataResolver`] exposes one accessor per target type (`get_int`,
//! `get_string`, `get_list`, ...). Each coerces the stored value with the
//! rules in [`coerce`] and returns the caller's default when the key is
//! absent.

pub mod coerce;
mod resolver;
mod store;

pub use resolver::DataResolver;
pub use store::{merge_sources, replace_recursive, DataStore};
