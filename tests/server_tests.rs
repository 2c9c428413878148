//! End-to-end tests over a real socket: raw HTTP in, envelope or
//! attachment out.
//!
//! Each test binds an ephemeral port, serves a small gateway on the
//! coroutine runtime, and talks to it with hand-written HTTP/1.1 requests
//! so that status lines and headers can be asserted verbatim.

mod common;

use common::http::{header, parse_response, send_request};
use fnwire::{
    FileReply, Gateway, HandlerError, HttpMethod, IntoReply, Procedure, ServerHandle, Signature,
};
use serde_json::{json, Value};
use std::net::{SocketAddr, TcpListener};

fn start_gateway(gateway: Gateway) -> (ServerHandle, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let handle = gateway.serve(addr).unwrap();
    handle.wait_ready().unwrap();
    (handle, addr)
}

fn calculator_gateway() -> Gateway {
    let mut gateway = Gateway::new();

    let sig = Signature::builder()
        .param("a")
        .param_with_default("b", json!(2))
        .build()
        .unwrap();
    gateway.register(Procedure::new("add", sig, |args| {
        let a = args[0].as_i64().unwrap_or(0);
        let b = args[1].as_i64().unwrap_or(0);
        (a + b).into_reply()
    }));

    let sig = Signature::builder().param("q").build().unwrap();
    gateway.register_at(
        Procedure::new("search", sig, |args| args[0].clone().into_reply()),
        "search",
        HttpMethod::Get,
    );

    gateway.register(Procedure::new("flaky", Signature::empty(), |_| {
        Err(HandlerError::failure("backend unavailable"))
    }));

    gateway
}

fn post_json(addr: &SocketAddr, path: &str, body: &str) -> String {
    let req = format!(
        "POST {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    send_request(addr, &req)
}

#[test]
fn test_post_json_roundtrip() {
    let (handle, addr) = start_gateway(calculator_gateway());
    let resp = post_json(&addr, "/add", r#"{"a": 1}"#);
    handle.stop();

    let (status, headers, body) = parse_response(&resp);
    assert_eq!(status, 200);
    assert_eq!(header(&headers, "content-type"), Some("application/json"));
    let envelope: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(envelope["exit_code"], 0);
    assert_eq!(envelope["status_code"], 200);
    assert_eq!(envelope["result"], 3);
    assert_eq!(envelope["error"], "");
}

#[test]
fn test_status_line_carries_correct_reason_phrase() {
    let (handle, addr) = start_gateway(calculator_gateway());
    let resp = send_request(
        &addr,
        "DELETE /add HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\n\r\n",
    );
    handle.stop();

    assert!(
        resp.starts_with("HTTP/1.1 405 Method Not Allowed"),
        "status line: {:?}",
        resp.lines().next()
    );
    let (_, _, body) = parse_response(&resp);
    let envelope: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(envelope["status_code"], 405);
    assert_eq!(envelope["error"], "Method Not Allowed");
}

#[test]
fn test_missing_content_type_is_415_over_http() {
    let (handle, addr) = start_gateway(calculator_gateway());
    let body = r#"{"a": 1}"#;
    let req = format!(
        "POST /add HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    let resp = send_request(&addr, &req);
    handle.stop();

    assert!(
        resp.starts_with("HTTP/1.1 415 Unsupported Media Type"),
        "status line: {:?}",
        resp.lines().next()
    );
}

#[test]
fn test_get_binds_query_fields() {
    let (handle, addr) = start_gateway(calculator_gateway());
    let resp = send_request(
        &addr,
        "GET /search?q=hello%20world HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    handle.stop();

    let (status, _, body) = parse_response(&resp);
    assert_eq!(status, 200);
    let envelope: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(envelope["result"], "hello world");
}

#[test]
fn test_unknown_route_is_404_envelope() {
    let (handle, addr) = start_gateway(calculator_gateway());
    let resp = send_request(&addr, "GET /nope HTTP/1.1\r\nHost: localhost\r\n\r\n");
    handle.stop();

    let (status, _, body) = parse_response(&resp);
    assert_eq!(status, 404);
    let envelope: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(envelope["exit_code"], 1);
    assert_eq!(envelope["error"], "Not Found");
}

#[test]
fn test_handler_failure_is_500_and_server_survives() {
    let (handle, addr) = start_gateway(calculator_gateway());

    let resp = post_json(&addr, "/flaky", "{}");
    let (status, _, body) = parse_response(&resp);
    assert_eq!(status, 500);
    let envelope: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(envelope["error"], "backend unavailable");

    // A fresh connection still gets served.
    let resp = post_json(&addr, "/add", r#"{"a": 2, "b": 3}"#);
    handle.stop();
    let (status, _, body) = parse_response(&resp);
    assert_eq!(status, 200);
    let envelope: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(envelope["result"], 5);
}

#[test]
fn test_file_reply_is_served_as_attachment() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.csv");
    std::fs::write(&path, b"name,value\npi,3.14\n").unwrap();

    let mut gateway = Gateway::new();
    let source = path.clone();
    gateway.register_at(
        Procedure::new("report", Signature::empty(), move |_| {
            FileReply::open(&source)
                .map_err(HandlerError::failure)
                .into_reply()
        }),
        "report",
        HttpMethod::Get,
    );

    let (handle, addr) = start_gateway(gateway);
    let resp = send_request(&addr, "GET /report HTTP/1.1\r\nHost: localhost\r\n\r\n");
    handle.stop();

    let (status, headers, body) = parse_response(&resp);
    assert_eq!(status, 200);
    assert_eq!(
        header(&headers, "content-disposition"),
        Some("attachment; filename=report.csv")
    );
    assert_eq!(
        header(&headers, "content-type"),
        Some("application/octet-stream")
    );
    // No envelope: the body is the file, byte for byte.
    assert_eq!(body, "name,value\npi,3.14\n");
}
