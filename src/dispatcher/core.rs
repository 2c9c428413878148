//! Dispatcher core module - hot path for request dispatch.

use crate::binder::bind;
use crate::ids::RequestId;
use crate::method::HttpMethod;
use crate::procedure::{FileReply, HandlerError, Procedure, Reply};
use crate::router::Router;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

/// One inbound request, reduced to what dispatch needs.
///
/// The server adapter fills this from the wire; tests build it directly.
/// `body` holds the raw bytes so that JSON decoding (and its 400 on
/// failure) stays a dispatcher concern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundRequest {
    /// Raw method string from the request line (e.g. `"POST"`).
    pub method: String,
    /// Request path with the query string already split off.
    pub path: String,
    /// Raw query string, when one was present.
    pub query: Option<String>,
    /// Declared `Content-Type`, when the header was present.
    pub content_type: Option<String>,
    /// Unparsed request body bytes; empty when absent.
    pub body: Vec<u8>,
}

impl InboundRequest {
    /// Convenience constructor for a JSON invocation, used heavily in tests.
    #[must_use]
    pub fn json(method: &str, path: &str, body: &Value) -> Self {
        InboundRequest {
            method: method.to_string(),
            path: path.to_string(),
            query: None,
            content_type: Some("application/json".to_string()),
            body: serde_json::to_vec(body).unwrap_or_default(),
        }
    }

    /// Convenience constructor for a GET invocation with a query string.
    #[must_use]
    pub fn get(path: &str, query: Option<&str>) -> Self {
        InboundRequest {
            method: "GET".to_string(),
            path: path.to_string(),
            query: query.map(str::to_string),
            content_type: None,
            body: Vec::new(),
        }
    }
}

/// The uniform JSON response wrapper.
///
/// Every non-file response carries this shape, success or failure, so
/// clients check `exit_code`, then `status_code`, then read `result` or
/// `error`. `result` is `""` when the handler produced nothing and `error`
/// is `""` on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub exit_code: u8,
    pub status_code: u16,
    pub result: Value,
    pub error: String,
}

impl Envelope {
    /// Successful envelope; an absent (`null`) result collapses to `""`.
    #[must_use]
    pub fn success(result: Value) -> Self {
        let result = match result {
            Value::Null => Value::String(String::new()),
            other => other,
        };
        Envelope {
            exit_code: 0,
            status_code: 200,
            result,
            error: String::new(),
        }
    }

    /// Failure envelope with an empty result.
    #[must_use]
    pub fn failure(status_code: u16, error: impl Into<String>) -> Self {
        Envelope {
            exit_code: 1,
            status_code,
            result: Value::String(String::new()),
            error: error.into(),
        }
    }
}

/// Terminal outcome of dispatching one request.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// JSON envelope; the HTTP status line mirrors `envelope.status_code`.
    Envelope(Envelope),
    /// File attachment streamed without an envelope, always `200 OK`.
    File(FileReply),
}

impl DispatchOutcome {
    /// HTTP status code this outcome is written with.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            DispatchOutcome::Envelope(envelope) => envelope.status_code,
            DispatchOutcome::File(_) => 200,
        }
    }
}

/// Parse a query string into a flat name-to-string-value field map.
///
/// Standard form-urlencoded decoding; repeated names keep the last value.
/// Values always arrive as JSON strings, never parsed into numbers.
#[must_use]
pub fn query_fields(query: &str) -> Map<String, Value> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Runs the per-request pipeline against a routing table.
///
/// The pipeline is a fixed sequence of checks, each terminal on failure:
/// method, content type, route lookup, field extraction, binding,
/// invocation, response shaping. The dispatcher holds the router behind an
/// `Arc` and never mutates it, so one dispatcher serves any number of
/// concurrent request workers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(router: Arc<Router>) -> Self {
        Dispatcher { router }
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Handle one request to completion.
    ///
    /// Every failure mode is converted into an envelope here; nothing
    /// escapes to the server adapter as a fault, handler panics included.
    #[must_use]
    pub fn dispatch(&self, request: InboundRequest) -> DispatchOutcome {
        let request_id = RequestId::new();
        let outcome = self.run(&request, request_id);
        debug!(
            request_id = %request_id,
            method = %request.method,
            path = %request.path,
            status = outcome.status(),
            "Request dispatched"
        );
        outcome
    }

    fn run(&self, request: &InboundRequest, request_id: RequestId) -> DispatchOutcome {
        // Method check: anything outside the supported set is terminal,
        // before routing is attempted.
        let Ok(method) = request.method.parse::<HttpMethod>() else {
            return DispatchOutcome::Envelope(Envelope::failure(405, "Method Not Allowed"));
        };

        // Content-type check for body-bearing methods. The comparison is
        // exact: `application/json; charset=utf-8` does not qualify, and a
        // missing header counts as unsupported. GET skips this entirely.
        if method.has_body() && request.content_type.as_deref() != Some("application/json") {
            return DispatchOutcome::Envelope(Envelope::failure(415, "Unsupported Media Type"));
        }

        // Route lookup: exact match against the normalized table.
        let Some(procedure) = self.router.lookup(method, &request.path) else {
            return DispatchOutcome::Envelope(Envelope::failure(404, "Not Found"));
        };

        // Field extraction: query string for GET, JSON body otherwise.
        let fields = if method.has_body() {
            match parse_body_fields(&request.body) {
                Ok(fields) => fields,
                Err(()) => {
                    return DispatchOutcome::Envelope(Envelope::failure(
                        400,
                        "Failed to decode JSON",
                    ));
                }
            }
        } else {
            request
                .query
                .as_deref()
                .map(query_fields)
                .unwrap_or_default()
        };

        // Binding: positional arguments in declaration order, or the first
        // missing required parameter.
        let args = match bind(&fields, procedure.signature()) {
            Ok(args) => args,
            Err(e) => {
                return DispatchOutcome::Envelope(Envelope::failure(400, e.to_string()));
            }
        };

        self.invoke(procedure, args, request_id)
    }

    /// Invocation and response shaping.
    ///
    /// The handler runs as a direct blocking call on the request worker; if
    /// it blocks, that worker blocks. Panics are contained here so a faulty
    /// handler degrades to a 500 instead of taking the process down.
    fn invoke(
        &self,
        procedure: &Procedure,
        args: Vec<Value>,
        request_id: RequestId,
    ) -> DispatchOutcome {
        let invocation = panic::catch_unwind(AssertUnwindSafe(|| procedure.invoke(args)));

        match invocation {
            Ok(Ok(Reply::Value(result))) => DispatchOutcome::Envelope(Envelope::success(result)),
            Ok(Ok(Reply::File(file))) => {
                debug!(
                    request_id = %request_id,
                    handler = procedure.name(),
                    filename = file.filename(),
                    "Handler returned file reply"
                );
                DispatchOutcome::File(file)
            }
            Ok(Err(HandlerError::NotFound(reason))) => {
                DispatchOutcome::Envelope(Envelope::failure(404, reason))
            }
            Ok(Err(HandlerError::Failure(e))) => {
                debug!(
                    request_id = %request_id,
                    handler = procedure.name(),
                    error = %e,
                    "Handler failed"
                );
                DispatchOutcome::Envelope(Envelope::failure(500, e.to_string()))
            }
            Err(payload) => {
                let message = panic_message(payload);
                let backtrace = std::backtrace::Backtrace::capture();
                error!(
                    request_id = %request_id,
                    handler = procedure.name(),
                    panic_message = %message,
                    backtrace = %backtrace,
                    "Handler panicked"
                );
                DispatchOutcome::Envelope(Envelope::failure(
                    500,
                    format!("handler panicked: {message}"),
                ))
            }
        }
    }
}

/// Decode body bytes into a field map.
///
/// An empty or absent body is the empty object. Anything that fails to
/// parse, or parses to a non-object (array, string, number...), is a
/// decode failure answered with 400.
fn parse_body_fields(body: &[u8]) -> Result<Map<String, Value>, ()> {
    if body.is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) | Err(_) => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_fields_decodes_pairs() {
        let fields = query_fields("q=foo&limit=10");
        assert_eq!(fields.get("q"), Some(&Value::String("foo".to_string())));
        // Query values stay strings even when they look numeric
        assert_eq!(fields.get("limit"), Some(&Value::String("10".to_string())));
    }

    #[test]
    fn test_query_fields_url_decoding_and_last_wins() {
        let fields = query_fields("name=a%20b&name=c+d");
        assert_eq!(fields.get("name"), Some(&Value::String("c d".to_string())));
    }

    #[test]
    fn test_query_fields_degrades_to_empty() {
        assert!(query_fields("").is_empty());
    }

    #[test]
    fn test_body_fields_empty_body_is_empty_object() {
        assert_eq!(parse_body_fields(b"").unwrap(), Map::new());
    }

    #[test]
    fn test_body_fields_rejects_invalid_json() {
        assert!(parse_body_fields(b"{not json").is_err());
    }

    #[test]
    fn test_body_fields_rejects_non_objects() {
        assert!(parse_body_fields(b"[1, 2]").is_err());
        assert!(parse_body_fields(b"\"text\"").is_err());
        assert!(parse_body_fields(b"42").is_err());
    }

    #[test]
    fn test_envelope_success_collapses_null_result() {
        let envelope = Envelope::success(Value::Null);
        assert_eq!(envelope.result, Value::String(String::new()));
        assert_eq!(envelope.exit_code, 0);
        assert_eq!(envelope.status_code, 200);
    }

    #[test]
    fn test_envelope_serializes_in_field_order() {
        let envelope = Envelope::failure(404, "Not Found");
        let text = serde_json::to_string(&envelope).unwrap();
        assert_eq!(
            text,
            r#"{"exit_code":1,"status_code":404,"result":"","error":"Not Found"}"#
        );
    }
}
