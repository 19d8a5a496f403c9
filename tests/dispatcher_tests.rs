//! Tests for action registration, parameter filtering and result interpretation
//!
//! # Test Coverage
//!
//! - Parameters are filtered to the declared names
//! - Returned data completes the dispatch, a returned response short-circuits it
//! - Unknown actions are configuration errors
//! - Handler errors carry the action name; helper errors pass through
//! - Embedding merges results into a rendering context, with debug mocking

mod common;

use brrtaction::dispatcher::{Action, ActionResult, DispatchOutcome, Dispatcher, FnAction};
use brrtaction::{ActionContext, ActionError, ActionRequest, ActionResponse};
use brrtaction::ids::{InvocationId, INVOCATION_ID_KEY};
use common::{capabilities, debug_capabilities, map};
use http::Method;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn echo(_cx: &mut ActionContext, params: Map<String, Value>) -> anyhow::Result<ActionResult> {
    Ok(params.into())
}

fn get(path: &str) -> ActionRequest {
    ActionRequest::new(Method::GET, path)
}

#[test]
fn test_parameters_are_filtered_to_declared_names() {
    let mut dispatcher = Dispatcher::new(capabilities());
    dispatcher.register_fn("Echo", &["a"], echo);

    let outcome = dispatcher
        .call("Echo", get("/"), ActionResponse::default(), map(json!({"a": 1, "b": 2})))
        .unwrap();
    assert_eq!(outcome, DispatchOutcome::Completed(map(json!({"a": 1}))));
}

#[test]
fn test_missing_declared_parameters_are_absent() {
    let mut dispatcher = Dispatcher::new(capabilities());
    dispatcher.register_fn("Echo", &["a", "b"], echo);

    let outcome = dispatcher
        .call("Echo", get("/"), ActionResponse::default(), map(json!({"b": "x"})))
        .unwrap();
    assert_eq!(outcome.data(), Some(&map(json!({"b": "x"}))));
}

#[test]
fn test_returned_response_short_circuits() {
    let mut dispatcher = Dispatcher::new(capabilities());
    dispatcher.register_fn("posts::Save", &["id"], |cx, params| {
        Ok(cx.redirect("/posts/{id}", params)?.into())
    });

    let outcome = dispatcher
        .call(
            "posts::Save",
            ActionRequest::new(Method::POST, "/posts/3"),
            ActionResponse::default(),
            map(json!({"id": 3})),
        )
        .unwrap();

    let response = outcome.into_response().expect("short-circuit response");
    assert_eq!(response.status(), 303);
    assert_eq!(response.header("Location"), Some("/posts/3"));
}

#[test]
fn test_bound_response_reaches_the_action() {
    let mut dispatcher = Dispatcher::new(capabilities());
    dispatcher.register_fn("Moved", &[], |cx, _| {
        Ok(cx.redirect("/new", Map::new())?.into())
    });

    let outcome = dispatcher
        .call("Moved", get("/old"), ActionResponse::new(301), Map::new())
        .unwrap();
    assert_eq!(outcome.response().map(ActionResponse::status), Some(301));
}

#[test]
fn test_unknown_action_is_not_callable() {
    let dispatcher = Dispatcher::new(capabilities());
    let err = dispatcher
        .call("missing:Thing", get("/"), ActionResponse::default(), Map::new())
        .unwrap_err();

    assert!(err.is_configuration());
    match err {
        ActionError::NotCallable { action } => assert_eq!(action, "missing::Thing"),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_handler_error_is_wrapped() {
    let mut dispatcher = Dispatcher::new(capabilities());
    dispatcher.register_fn("Broken", &[], |_, _| anyhow::bail!("database unavailable"));

    let err = dispatcher
        .call("Broken", get("/"), ActionResponse::default(), Map::new())
        .unwrap_err();
    assert!(matches!(err, ActionError::Handler { ref action, .. } if action == "Broken"));
    assert!(err.to_string().contains("Broken"));
}

#[test]
fn test_helper_error_passes_through() {
    let mut dispatcher = Dispatcher::default();
    dispatcher.register_fn("NoUrls", &[], |cx, _| {
        Ok(cx.redirect("/x", Map::new())?.into())
    });

    let err = dispatcher
        .call("NoUrls", get("/"), ActionResponse::default(), Map::new())
        .unwrap_err();
    assert!(matches!(
        err,
        ActionError::MissingCapability {
            capability: "UrlGenerator",
            helper: "redirect"
        }
    ));
}

#[test]
fn test_strict_action_ignores_body() {
    let mut dispatcher = Dispatcher::new(capabilities());
    dispatcher.register(
        "Search",
        FnAction::new(&[], |cx, _| {
            let mut data = Map::new();
            data.insert("q".into(), json!(cx.data().get_string("q", "")));
            data.insert("has_token".into(), json!(cx.has("token")));
            Ok(data.into())
        })
        .strict(true),
    );

    let request = ActionRequest::new(Method::POST, "/search")
        .with_query_param("q", "rust")
        .with_parsed_body(json!({"q": "ignored", "token": "abc"}));
    let outcome = dispatcher
        .call("Search", request, ActionResponse::default(), Map::new())
        .unwrap();
    assert_eq!(
        outcome.data(),
        Some(&map(json!({"q": "rust", "has_token": false})))
    );
}

struct Counter {
    calls: AtomicUsize,
}

impl Action for Counter {
    fn parameters(&self) -> &'static [&'static str] {
        &[]
    }

    fn invoke(&self, _cx: &mut ActionContext, _params: Map<String, Value>) -> anyhow::Result<ActionResult> {
        let calls = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(map(json!({ "calls": calls })).into())
    }
}

#[test]
fn test_shared_action_instance() {
    let counter = Arc::new(Counter {
        calls: AtomicUsize::new(0),
    });
    let mut dispatcher = Dispatcher::new(capabilities());
    dispatcher.register_arc("Counter", Arc::clone(&counter) as Arc<dyn Action>);

    for _ in 0..3 {
        dispatcher
            .call("Counter", get("/"), ActionResponse::default(), Map::new())
            .unwrap();
    }
    assert_eq!(counter.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_embed_merges_into_context() {
    let mut dispatcher = Dispatcher::new(capabilities());
    dispatcher.register_fn("widgets::Latest", &["limit", "tag"], echo);

    let mut context = map(json!({
        "title": "Home",
        "limit": 1,
        "parameters": {"limit": 5, "tag": "news"}
    }));
    let redirected = dispatcher
        .embed(&mut context, "widgets:Latest", &get("/"), map(json!({"limit": 10})))
        .unwrap();

    assert!(redirected.is_none());
    assert_eq!(context["title"], json!("Home"));
    assert_eq!(context["limit"], json!(10));
    assert_eq!(context["tag"], json!("news"));
}

#[test]
fn test_embed_propagates_short_circuit() {
    let mut dispatcher = Dispatcher::new(capabilities());
    dispatcher.register_fn("Guard", &[], |cx, _| {
        Ok(cx.redirect("/login", Map::new())?.into())
    });

    let mut context = Map::new();
    let redirected = dispatcher
        .embed(&mut context, "Guard", &get("/admin"), Map::new())
        .unwrap()
        .expect("redirect");
    assert_eq!(redirected.header("Location"), Some("/login"));
    assert!(context.is_empty());
}

#[test]
fn test_embed_mocks_unknown_action_only_in_debug() {
    let mut context = map(json!({"title": "Draft"}));

    let debug = Dispatcher::new(debug_capabilities());
    assert!(debug
        .embed(&mut context, "not:Yet", &get("/"), Map::new())
        .unwrap()
        .is_none());
    assert_eq!(context, map(json!({"title": "Draft"})));

    let production = Dispatcher::new(capabilities());
    let err = production
        .embed(&mut context, "not:Yet", &get("/"), Map::new())
        .unwrap_err();
    assert!(matches!(err, ActionError::NotCallable { .. }));
}

#[test]
fn test_embedded_action_shares_page_invocation_id() {
    let mut dispatcher = Dispatcher::new(capabilities());
    dispatcher.register_fn("widgets::Latest", &[], |cx, _| {
        Ok(map(json!({"widget_id": cx.invocation_id().to_string()})).into())
    });

    let page = InvocationId::new();
    let mut context = Map::new();
    context.insert(INVOCATION_ID_KEY.to_string(), serde_json::to_value(page).unwrap());
    dispatcher
        .embed(&mut context, "widgets:Latest", &get("/"), Map::new())
        .unwrap();
    assert_eq!(context["widget_id"], json!(page.to_string()));

    let supplied = InvocationId::new();
    let request = get("/").with_header("X-Request-Id", &supplied.to_string());
    let mut context = Map::new();
    dispatcher
        .embed(&mut context, "widgets:Latest", &request, Map::new())
        .unwrap();
    assert_eq!(context["widget_id"], json!(supplied.to_string()));
}
