//! Tests for response building through the action context
//!
//! # Test Coverage
//!
//! - Body sniffing and `Content-Length`
//! - Caller-supplied headers and structured header values
//! - Redirect status selection
//! - HTMX adaptation and the `202 → 303` rewrite
//! - Conversion to `http::Response`

mod common;

use brrtaction::capabilities::Capabilities;
use brrtaction::config::ActionConfig;
use brrtaction::response::{ActionResponse, Body, Content, Headers, MimeSniffer};
use brrtaction::{ActionContext, ActionRequest};
use common::{capabilities, map};
use http::Method;
use serde_json::{json, Map, Value};
use std::sync::Arc;

fn context(request: ActionRequest, response: ActionResponse) -> ActionContext {
    ActionContext::new("test", request, response, capabilities())
}

fn htmx_request() -> ActionRequest {
    ActionRequest::new(Method::POST, "/users").with_header("HX-Request", "true")
}

#[test]
fn test_markup_body_is_sniffed_and_measured() {
    let cx = context(ActionRequest::new(Method::GET, "/"), ActionResponse::default());
    let res = cx.response(200, "<html></html>", ());

    assert_eq!(res.status(), 200);
    assert_eq!(res.header("Content-Type"), Some("text/html"));
    assert_eq!(res.header("Content-Length"), Some("13"));
}

#[test]
fn test_length_counts_bytes_not_chars() {
    let cx = context(ActionRequest::new(Method::GET, "/"), ActionResponse::default());
    let res = cx.response(200, "héllo", ());
    assert_eq!(res.header("Content-Length"), Some("6"));
    assert_eq!(res.header("Content-Type"), Some("text/plain"));
}

#[test]
fn test_in_progress_response_is_not_modified() {
    let cx = context(
        ActionRequest::new(Method::GET, "/"),
        ActionResponse::new(200).with_header("X-Frame-Options", "DENY"),
    );
    let res = cx.response(404, "gone", [("X-Reason", "deleted")]);

    assert_eq!(res.header("X-Frame-Options"), Some("DENY"));
    assert_eq!(res.header("X-Reason"), Some("deleted"));
    assert_eq!(cx.current_response().status(), 200);
    assert!(!cx.current_response().has_header("X-Reason"));
    assert!(cx.current_response().body().is_empty());
}

#[test]
fn test_structured_header_values_are_json() {
    let cx = context(ActionRequest::new(Method::GET, "/"), ActionResponse::default());
    let headers = Headers::new()
        .with("HX-Trigger", json!({"showMessage": "Saved"}))
        .with("X-Count", 3)
        .with("X-Flag", true);
    let res = cx.response(200, Content::Empty, headers);

    assert_eq!(res.header("HX-Trigger"), Some(r#"{"showMessage":"Saved"}"#));
    assert_eq!(res.header("X-Count"), Some("3"));
    assert_eq!(res.header("X-Flag"), Some("true"));
}

struct AlwaysCsv;

impl MimeSniffer for AlwaysCsv {
    fn sniff(&self, _body: &Body) -> Option<String> {
        Some("text/csv".to_string())
    }
}

#[test]
fn test_custom_sniffer_and_fallback() {
    let caps = Capabilities::builder().sniffer(Arc::new(AlwaysCsv)).build();
    let cx = ActionContext::new("csv", ActionRequest::new(Method::GET, "/"), ActionResponse::default(), caps);
    assert_eq!(cx.response(200, "a,b\n1,2", ()).header("Content-Type"), Some("text/csv"));

    let caps = Capabilities::builder()
        .config(ActionConfig {
            fallback_mime_type: "application/octet-stream".to_string(),
            ..ActionConfig::default()
        })
        .build();
    let cx = ActionContext::new("raw", ActionRequest::new(Method::GET, "/"), ActionResponse::default(), caps);
    assert_eq!(
        cx.response(200, "abc", ()).header("Content-Type"),
        Some("application/octet-stream")
    );
}

#[test]
fn test_redirect_status_selection() {
    let cx = context(ActionRequest::new(Method::POST, "/"), ActionResponse::new(418));
    let res = cx.redirect("/x", Map::new()).unwrap();
    assert_eq!(res.status(), 303);
    assert_eq!(res.header("Location"), Some("/x"));

    for status in [301, 302, 307, 308] {
        let cx = context(ActionRequest::new(Method::GET, "/"), ActionResponse::new(status));
        assert_eq!(cx.redirect("/x", Map::new()).unwrap().status(), status);
    }
}

#[test]
fn test_redirect_forwards_parameters_to_generator() {
    let cx = context(ActionRequest::new(Method::POST, "/"), ActionResponse::default());
    let res = cx
        .redirect("/users/{id}/posts/{post}", map(json!({"id": 4, "post": "intro"})))
        .unwrap();
    assert_eq!(res.header("Location"), Some("/users/4/posts/intro"));

    let err = cx.redirect("/users/{id}", Map::new()).unwrap_err();
    assert!(err.to_string().contains("/users/{id}"));
}

#[test]
fn test_htmx_redirect_becomes_client_navigation() {
    let cx = context(htmx_request(), ActionResponse::default());
    let res = cx
        .response(
            303,
            Content::Empty,
            [
                ("Location", "/users/9"),
                ("HX-Retarget", "#content"),
                ("HX-Reselect", ".user"),
                ("HX-Reswap", "innerHTML"),
            ],
        );

    assert_eq!(res.status(), 200);
    assert!(!(300..400).contains(&res.status()));
    assert!(!res.has_header("Location"));
    assert!(!res.has_header("HX-Retarget"));
    assert_eq!(res.header("Vary"), Some("HX-Request"));

    let location: Value = serde_json::from_str(res.header("HX-Location").unwrap()).unwrap();
    assert_eq!(
        location,
        json!({"path": "/users/9", "select": ".user", "target": "#content", "swap": "innerHTML"})
    );
}

#[test]
fn test_htmx_adaptation_can_be_disabled() {
    let caps = Capabilities::builder()
        .url_generator(common::generate_url)
        .config(ActionConfig {
            htmx: false,
            ..ActionConfig::default()
        })
        .build();
    let cx = ActionContext::new("plain", htmx_request(), ActionResponse::default(), caps);
    let res = cx.redirect("/users", Map::new()).unwrap();
    assert_eq!(res.status(), 303);
    assert_eq!(res.header("Location"), Some("/users"));
    assert!(!res.has_header("HX-Location"));
}

#[test]
fn test_accepted_without_location_becomes_see_other() {
    let cx = context(ActionRequest::new(Method::POST, "/jobs"), ActionResponse::default());
    assert_eq!(cx.response(202, Content::Empty, ()).status(), 303);

    let res = cx.response(202, Content::Empty, [("Location", "/jobs/1")]);
    assert_eq!(res.status(), 202);
}

#[test]
fn test_into_http() {
    let cx = context(ActionRequest::new(Method::GET, "/"), ActionResponse::default());
    let res = cx.json(200, &json!({"ok": true})).unwrap().into_http().unwrap();

    assert_eq!(res.status(), http::StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.headers()["content-length"], "11");
    assert_eq!(res.body().as_ref(), br#"{"ok":true}"#);
}
