//! # Response Module
//!
//! The outbound side of an action invocation.
//!
//! - [`ActionResponse`] is the immutable response value; every change returns
//!   a new value layered on the previous one.
//! - [`ResponseBuilder`] assembles the final response: header application,
//!   body replacement through a [`StreamFactory`], MIME sniffing through a
//!   [`MimeSniffer`], `Content-Length` computation and the [`htmx`] redirect
//!   adaptation.
//!
//! ## Build order
//!
//! ```text
//! base (current or supplied response)
//!   → headers (case-insensitive replace, JSON for structured values)
//!   → body + sniffed Content-Type (textual content only)
//!   → Content-Length
//!   → status
//!   → HTMX adaptation (HX-Location / 202 → 303)
//! ```

mod builder;
mod core;
pub mod htmx;
mod sniff;
mod stream;

pub use builder::ResponseBuilder;
pub use core::{header_value_string, ActionResponse, Body, Content, Headers};
pub use sniff::{ContentSniffer, MimeSniffer, DEFAULT_MIME_TYPE};
pub use stream::{BytesStreamFactory, StreamFactory};
