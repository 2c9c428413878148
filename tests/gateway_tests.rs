//! Registration-surface tests: route naming, normalization, replacement,
//! and the route dumps exposed for diagnostics.

use fnwire::{
    DispatchOutcome, Envelope, Gateway, HttpMethod, InboundRequest, IntoReply, Procedure, Signature,
};
use serde_json::json;

fn constant(name: &str, value: i64) -> Procedure {
    Procedure::new(name, Signature::empty(), move |_| value.into_reply())
}

fn dispatch_post(gateway: Gateway, path: &str) -> Envelope {
    let dispatcher = gateway.into_dispatcher();
    match dispatcher.dispatch(InboundRequest::json("POST", path, &json!({}))) {
        DispatchOutcome::Envelope(envelope) => envelope,
        DispatchOutcome::File(file) => panic!("unexpected file reply: {file:?}"),
    }
}

#[test]
fn test_register_uses_name_as_post_route() {
    let mut gateway = Gateway::new();
    gateway.register(constant("answer", 42));
    let env = dispatch_post(gateway, "/answer");
    assert_eq!(env.status_code, 200);
    assert_eq!(env.result, json!(42));
}

#[test]
fn test_register_at_normalizes_route_spelling() {
    // All spellings collapse to the same key at registration time, while
    // request paths stay literal.
    for spelling in ["reports", "/reports", "reports/", "/reports//"] {
        let mut gateway = Gateway::new();
        gateway.register_at(constant("reports", 1), spelling, HttpMethod::Post);
        assert!(
            gateway.router().lookup(HttpMethod::Post, "/reports").is_some(),
            "spelling: {spelling:?}"
        );
        let env = dispatch_post(gateway, "/reports/");
        assert_eq!(env.status_code, 404, "spelling: {spelling:?}");
    }
}

#[test]
fn test_reregistration_replaces_previous_procedure() {
    let mut gateway = Gateway::new();
    gateway.register_at(constant("first", 1), "calc", HttpMethod::Post);
    gateway.register_at(constant("second", 2), "/calc/", HttpMethod::Post);
    assert_eq!(gateway.router().len(), 1);
    let env = dispatch_post(gateway, "/calc");
    assert_eq!(env.result, json!(2));
}

#[test]
fn test_root_route_is_registerable() {
    let mut gateway = Gateway::new();
    gateway.register_at(constant("root", 7), "/", HttpMethod::Get);
    let dispatcher = gateway.into_dispatcher();
    match dispatcher.dispatch(InboundRequest::get("/", None)) {
        DispatchOutcome::Envelope(env) => assert_eq!(env.result, json!(7)),
        DispatchOutcome::File(file) => panic!("unexpected file reply: {file:?}"),
    }
}

#[test]
fn test_routes_json_exposes_descriptor_metadata() {
    let sig = Signature::builder()
        .param("a")
        .param_with_default("b", json!(2))
        .build()
        .unwrap();
    let add = Procedure::new("add", sig, |_| ().into_reply()).with_module("calculator::ops");

    let mut gateway = Gateway::new();
    gateway.register(add);
    gateway.register_at(constant("search", 0), "search", HttpMethod::Get);

    let dump = gateway.routes_json();
    assert_eq!(dump["POST"]["/add"]["name"], "add");
    assert_eq!(dump["POST"]["/add"]["module"], "calculator::ops");
    assert_eq!(dump["POST"]["/add"]["parameters"]["all"], json!(["a", "b"]));
    assert_eq!(
        dump["POST"]["/add"]["parameters"]["required"],
        json!(["a"])
    );
    assert_eq!(dump["POST"]["/add"]["default_values"]["b"], json!(2));
    assert_eq!(dump["GET"]["/search"]["name"], "search");
    // Methods with no routes are omitted entirely
    assert!(dump.get("PUT").is_none());
}

#[test]
fn test_procedure_source_location_points_at_registration_site() {
    let proc = constant("origin", 0);
    assert!(proc.source().contains("gateway_tests.rs"));
}
