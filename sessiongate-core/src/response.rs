//! Response body type and JSON message helpers shared by all handlers.

use bytes::Bytes;
use http_body_util::{BodyExt, Full, combinators::UnsyncBoxBody};
use hyper::{Response, StatusCode, header};

/// Boxed error carried by response bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Body type of every gateway response.
///
/// Gateway-authored responses are small in-memory JSON bodies, proxied
/// responses are upstream byte streams; both are erased into this one type.
pub type GatewayBody = UnsyncBoxBody<Bytes, BoxError>;

/// Wraps in-memory bytes into a [`GatewayBody`].
pub fn full(bytes: impl Into<Bytes>) -> GatewayBody {
    Full::new(bytes.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Builds a JSON `{"message": ...}` response with the given status.
///
/// Falls back to a bare 500 if the builder rejects its input, which cannot
/// happen with a valid [`StatusCode`] and a static header.
///
/// # Example
///
/// ```
/// use sessiongate_core::response::json_message;
/// use hyper::StatusCode;
///
/// let response = json_message(StatusCode::BAD_REQUEST, "Missing targetPath");
/// assert_eq!(response.status(), StatusCode::BAD_REQUEST);
/// ```
pub fn json_message(status: StatusCode, message: &str) -> Response<GatewayBody> {
    json_message_builder(status)
        .body(full(message_body(message)))
        .unwrap_or_else(|_| {
            let mut response = Response::new(full(message_body("Internal server error")));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        })
}

/// Returns a response builder preset for a JSON message response.
///
/// Handlers that need extra headers (for instance `Set-Cookie`) start from
/// this builder and finish with [`message_body`].
pub fn json_message_builder(status: StatusCode) -> hyper::http::response::Builder {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
}

/// Serializes `{"message": message}`.
pub fn message_body(message: &str) -> String {
    serde_json::json!({ "message": message }).to_string()
}
