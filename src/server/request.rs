use crate::dispatcher::InboundRequest;
use may_minihttp::Request;
use std::io::Read;
use tracing::debug;

/// Extract what dispatch needs from a `may_minihttp::Request`.
///
/// Splits the query string off the path, scans the headers for the declared
/// content type, and drains the body into raw bytes. JSON decoding is left
/// to the dispatcher so that a malformed body is answered there, not here.
pub fn parse_request(req: Request) -> InboundRequest {
    let method = req.method().to_string();
    let raw_path = req.path().to_string();
    let (path, query) = match raw_path.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (raw_path, None),
    };

    let content_type = req
        .headers()
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case("content-type"))
        .map(|h| String::from_utf8_lossy(h.value).trim().to_string());

    let mut body = Vec::new();
    if let Err(e) = req.body().read_to_end(&mut body) {
        // Treat a half-read body as absent; the client has likely gone away.
        debug!(error = %e, method = %method, path = %path, "Request body read failed");
        body.clear();
    }

    debug!(
        method = %method,
        path = %path,
        has_query = query.is_some(),
        content_type = content_type.as_deref().unwrap_or(""),
        body_bytes = body.len(),
        "HTTP request parsed"
    );

    InboundRequest {
        method,
        path,
        query,
        content_type,
        body,
    }
}
