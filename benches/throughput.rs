use brrtaction::data::DataResolver;
use brrtaction::dispatcher::Dispatcher;
use brrtaction::request::ActionRequest;
use brrtaction::response::{ActionResponse, Headers};
use brrtaction::ActionContext;
use brrtaction::Capabilities;
use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use serde_json::{json, Map, Value};
use std::hint::black_box;

fn example_request(method: Method) -> ActionRequest {
    ActionRequest::new(method, "/zoo/animals/123")
        .with_query_param("page", "3")
        .with_query_param("sort", "name")
        .with_query_param("filter", json!({"species": "cat", "tags": ["a", "b"]}))
        .with_parsed_body(json!({
            "name": "Tom",
            "age": "7",
            "filter": {"species": "dog"},
            "habitat": {"zone": 4, "sections": [1, 2, 3]}
        }))
        .with_attribute("id", 123)
}

fn bench_resolver(c: &mut Criterion) {
    let request = example_request(Method::POST);
    c.bench_function("resolver_merge_and_get", |b| {
        b.iter(|| {
            let data = DataResolver::new(request.clone());
            black_box(data.get_int("id", 0));
            black_box(data.get_int("age", 0));
            black_box(data.get_string("sort", ""));
            black_box(data.get_list("tags", vec![]));
        })
    });
}

fn bench_response_build(c: &mut Criterion) {
    let cx = ActionContext::new(
        "bench",
        example_request(Method::GET).with_header("HX-Request", "true"),
        ActionResponse::default(),
        Capabilities::default(),
    );
    let body = format!("<html><body>{}</body></html>", "x".repeat(2048));
    c.bench_function("response_build", |b| {
        b.iter(|| {
            let res = cx.response(
                200,
                body.as_str(),
                Headers::new().with("HX-Trigger", json!({"saved": true})),
            );
            black_box(res);
        })
    });
    c.bench_function("response_htmx_redirect", |b| {
        b.iter(|| {
            let res = cx.response(303, (), [("Location", "/zoo"), ("HX-Retarget", "#main")]);
            black_box(res);
        })
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let mut dispatcher = Dispatcher::default();
    dispatcher.register_fn("zoo:Show", &["id"], |cx, mut params| {
        params.insert("name".into(), Value::String(cx.data().get_string("name", "")));
        Ok(params.into())
    });
    let request = example_request(Method::POST);
    let params: Map<String, Value> = json!({"id": 123, "unused": true, "other": "x"})
        .as_object()
        .cloned()
        .unwrap_or_default();
    c.bench_function("dispatch_call", |b| {
        b.iter(|| {
            let outcome = dispatcher.call(
                "zoo::Show",
                request.clone(),
                ActionResponse::default(),
                params.clone(),
            );
            black_box(&outcome);
        })
    });
}

criterion_group!(benches, bench_resolver, bench_response_build, bench_dispatch);
criterion_main!(benches);
