use crate::dispatcher::Envelope;
use crate::procedure::FileReply;
use may_minihttp::Response;
use tracing::error;

/// Reason phrase for the status line, correct per code.
pub(crate) fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        405 => "Method Not Allowed",
        415 => "Unsupported Media Type",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

/// Serialize an envelope as the whole HTTP response.
///
/// The status line mirrors `envelope.status_code`; the body is the envelope
/// itself as `application/json`.
pub fn write_envelope(res: &mut Response, envelope: &Envelope) {
    let status = envelope.status_code;
    res.status_code(status as usize, status_reason(status));
    res.header("Content-Type: application/json");
    res.body_vec(serde_json::to_vec(envelope).unwrap_or_default());
}

/// Write a file reply as a `200 OK` attachment.
///
/// The whole file is read before any byte of the response goes out, since
/// `may_minihttp` takes a complete body vector. The handle closes when the
/// reply is consumed; a failed read falls back to a 500 envelope, which is
/// still possible at this point because nothing has been written yet.
pub fn write_file_reply(res: &mut Response, reply: FileReply) {
    let filename = reply.filename().to_string();
    match reply.into_bytes() {
        Ok((filename, bytes)) => {
            res.status_code(200, "OK");
            let disposition =
                format!("Content-Disposition: attachment; filename={filename}").into_boxed_str();
            res.header(Box::leak(disposition));
            res.header("Content-Type: application/octet-stream");
            res.body_vec(bytes);
        }
        Err(e) => {
            error!(filename = %filename, error = %e, "File reply read failed");
            write_envelope(
                res,
                &Envelope::failure(500, format!("failed to read file: {e}")),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(404), "Not Found");
        assert_eq!(status_reason(405), "Method Not Allowed");
        assert_eq!(status_reason(415), "Unsupported Media Type");
        assert_eq!(status_reason(500), "Internal Server Error");
    }
}
