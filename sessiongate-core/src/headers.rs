//! HTTP header names and the header sanitizer.
//!
//! Inbound headers lose everything that only means something to the edge
//! transport (host, hop-by-hop, routing metadata) before they reach the
//! upstream. Upstream response headers lose the transport encodings the
//! gateway's own output will not reproduce byte for byte.

use hyper::HeaderMap;
use hyper::header::HeaderName;

/// Host header.
pub const HOST: &str = "host";

/// Content-Length header.
pub const CONTENT_LENGTH: &str = "content-length";

/// Content-Encoding header.
pub const CONTENT_ENCODING: &str = "content-encoding";

/// Accept-Encoding header.
pub const ACCEPT_ENCODING: &str = "accept-encoding";

/// Content-Type header.
pub const CONTENT_TYPE: &str = "content-type";

/// Cookie header.
pub const COOKIE: &str = "cookie";

/// Set-Cookie header.
pub const SET_COOKIE: &str = "set-cookie";

/// Connection header (hop-by-hop).
pub const CONNECTION: &str = "connection";

/// Keep-Alive header (hop-by-hop).
pub const KEEP_ALIVE: &str = "keep-alive";

/// Proxy-Authenticate header (hop-by-hop).
pub const PROXY_AUTHENTICATE: &str = "proxy-authenticate";

/// Proxy-Authorization header (hop-by-hop).
pub const PROXY_AUTHORIZATION: &str = "proxy-authorization";

/// TE header (hop-by-hop).
pub const TE: &str = "te";

/// Trailer header (hop-by-hop, RFC 7230 spelling).
pub const TRAILER: &str = "trailer";

/// Trailers header (hop-by-hop, legacy spelling).
pub const TRAILERS: &str = "trailers";

/// Transfer-Encoding header (hop-by-hop).
pub const TRANSFER_ENCODING: &str = "transfer-encoding";

/// Upgrade header (hop-by-hop).
pub const UPGRADE: &str = "upgrade";

/// Forwarded header (RFC 7239).
pub const FORWARDED: &str = "forwarded";

/// X-Real-IP header.
pub const X_REAL_IP: &str = "x-real-ip";

/// List of all hop-by-hop headers that should not be forwarded.
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    CONNECTION,
    KEEP_ALIVE,
    PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION,
    TE,
    TRAILER,
    TRAILERS,
    TRANSFER_ENCODING,
    UPGRADE,
];

/// Edge routing metadata that must not leak to the upstream.
pub const ROUTING_HEADERS: &[&str] = &[FORWARDED, X_REAL_IP];

/// Prefixes of edge runtime/routing headers that must not leak upstream.
pub const ROUTING_HEADER_PREFIXES: &[&str] =
    &["x-forwarded-", "x-middleware-", "x-invoke-", "x-vercel-"];

/// Check if a header is a hop-by-hop header that shouldn't be forwarded.
///
/// # Example
///
/// ```
/// use sessiongate_core::headers::is_hop_by_hop;
///
/// assert!(is_hop_by_hop("connection"));
/// assert!(is_hop_by_hop("transfer-encoding"));
/// assert!(!is_hop_by_hop("content-type"));
/// ```
pub fn is_hop_by_hop(header_name: &str) -> bool {
    HOP_BY_HOP_HEADERS.contains(&header_name)
}

/// Check if a header carries edge routing or runtime metadata.
pub fn is_routing_metadata(header_name: &str) -> bool {
    ROUTING_HEADERS.contains(&header_name)
        || ROUTING_HEADER_PREFIXES
            .iter()
            .any(|prefix| header_name.starts_with(prefix))
}

/// Header names listed in the `Connection` header are hop-by-hop for this
/// message only (RFC 7230 section 6.1).
fn connection_listed(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

fn retain(headers: &HeaderMap, keep: impl Fn(&HeaderName) -> bool) -> HeaderMap {
    let mut sanitized = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        if keep(name) {
            sanitized.append(name.clone(), value.clone());
        }
    }
    sanitized
}

/// Strips edge-only headers from an inbound request before forwarding.
///
/// Removes `host`, `content-length`, every hop-by-hop header, headers named
/// by `Connection`, and routing metadata. `accept-encoding` is dropped as
/// well: the upstream client negotiates only encodings it can decode, which
/// keeps the stripped `content-encoding` on the way back truthful. Cookies
/// and authorization are kept so the session token replays to the upstream.
///
/// # Example
///
/// ```
/// use hyper::HeaderMap;
/// use sessiongate_core::headers::sanitize_request_headers;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("host", "gateway.example.test".parse().unwrap());
/// headers.insert("accept", "application/json".parse().unwrap());
///
/// let sanitized = sanitize_request_headers(&headers);
/// assert!(sanitized.get("host").is_none());
/// assert_eq!(sanitized.get("accept").unwrap(), "application/json");
/// ```
pub fn sanitize_request_headers(headers: &HeaderMap) -> HeaderMap {
    let listed = connection_listed(headers);
    retain(headers, |name| {
        let name = name.as_str();
        name != HOST
            && name != CONTENT_LENGTH
            && name != ACCEPT_ENCODING
            && !is_hop_by_hop(name)
            && !is_routing_metadata(name)
            && !listed.iter().any(|l| l == name)
    })
}

/// Strips transport encodings from upstream response headers.
///
/// The response body is re-framed by the gateway, so `content-encoding`,
/// `transfer-encoding`, `connection` and the other hop-by-hop headers are
/// never relayed.
pub fn sanitize_response_headers(headers: &HeaderMap) -> HeaderMap {
    let listed = connection_listed(headers);
    retain(headers, |name| {
        let name = name.as_str();
        name != CONTENT_ENCODING && !is_hop_by_hop(name) && !listed.iter().any(|l| l == name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn test_hop_by_hop_headers() {
        assert!(is_hop_by_hop(CONNECTION));
        assert!(is_hop_by_hop(KEEP_ALIVE));
        assert!(is_hop_by_hop(PROXY_AUTHENTICATE));
        assert!(is_hop_by_hop(PROXY_AUTHORIZATION));
        assert!(is_hop_by_hop(TE));
        assert!(is_hop_by_hop(TRAILER));
        assert!(is_hop_by_hop(TRANSFER_ENCODING));
        assert!(is_hop_by_hop(UPGRADE));
    }

    #[test]
    fn test_not_hop_by_hop_headers() {
        assert!(!is_hop_by_hop(CONTENT_TYPE));
        assert!(!is_hop_by_hop(HOST));
        assert!(!is_hop_by_hop(COOKIE));
        assert!(!is_hop_by_hop("authorization"));
        assert!(!is_hop_by_hop("accept"));
    }

    #[test]
    fn test_routing_metadata() {
        assert!(is_routing_metadata("x-forwarded-for"));
        assert!(is_routing_metadata("x-forwarded-host"));
        assert!(is_routing_metadata("x-middleware-rewrite"));
        assert!(is_routing_metadata("x-invoke-path"));
        assert!(is_routing_metadata("x-vercel-id"));
        assert!(is_routing_metadata(FORWARDED));
        assert!(is_routing_metadata(X_REAL_IP));
        assert!(!is_routing_metadata("x-request-id"));
        assert!(!is_routing_metadata("authorization"));
    }

    #[test]
    fn test_sanitize_request_strips_edge_headers() {
        let inbound = headers(&[
            ("host", "gateway.example.test"),
            ("connection", "keep-alive"),
            ("content-length", "0"),
            ("x-forwarded-for", "203.0.113.9"),
            ("x-middleware-prefetch", "1"),
            ("accept-encoding", "gzip, br, zstd"),
            ("accept", "application/json"),
            ("cookie", "token=abc"),
            ("authorization", "Bearer abc"),
        ]);

        let sanitized = sanitize_request_headers(&inbound);

        assert!(sanitized.get("host").is_none());
        assert!(sanitized.get("connection").is_none());
        assert!(sanitized.get("content-length").is_none());
        assert!(sanitized.get("x-forwarded-for").is_none());
        assert!(sanitized.get("x-middleware-prefetch").is_none());
        assert!(sanitized.get("accept-encoding").is_none());
        assert_eq!(sanitized.get("accept").unwrap(), "application/json");
        assert_eq!(sanitized.get("cookie").unwrap(), "token=abc");
        assert_eq!(sanitized.get("authorization").unwrap(), "Bearer abc");
    }

    #[test]
    fn test_sanitize_request_drops_connection_listed() {
        let inbound = headers(&[
            ("connection", "close, x-session-hint"),
            ("x-session-hint", "stale"),
            ("x-request-id", "r-1"),
        ]);

        let sanitized = sanitize_request_headers(&inbound);

        assert!(sanitized.get("x-session-hint").is_none());
        assert_eq!(sanitized.get("x-request-id").unwrap(), "r-1");
    }

    #[test]
    fn test_sanitize_response_strips_encodings() {
        let upstream = headers(&[
            ("content-encoding", "gzip"),
            ("transfer-encoding", "chunked"),
            ("connection", "keep-alive"),
            ("content-type", "application/json"),
            ("cache-control", "no-store"),
        ]);

        let sanitized = sanitize_response_headers(&upstream);

        assert!(sanitized.get("content-encoding").is_none());
        assert!(sanitized.get("transfer-encoding").is_none());
        assert!(sanitized.get("connection").is_none());
        assert_eq!(sanitized.get("content-type").unwrap(), "application/json");
        assert_eq!(sanitized.get("cache-control").unwrap(), "no-store");
    }

    #[test]
    fn test_sanitize_response_keeps_every_set_cookie() {
        let upstream = headers(&[("set-cookie", "a=1"), ("set-cookie", "b=2")]);

        let sanitized = sanitize_response_headers(&upstream);

        let cookies: Vec<_> = sanitized.get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);
    }

    #[test]
    fn test_sanitize_empty_is_empty() {
        assert!(sanitize_request_headers(&HeaderMap::new()).is_empty());
        assert!(sanitize_response_headers(&HeaderMap::new()).is_empty());
    }

    #[test]
    fn test_header_constants_lowercase() {
        for name in HOP_BY_HOP_HEADERS.iter().chain(ROUTING_HEADERS) {
            assert_eq!(*name, name.to_lowercase());
        }
    }
}
