//! Proxy request descriptor.
//!
//! A proxied GET arrives as `/api/proxy?targetPath=/orders&status=open`.
//! [`ProxyRequest`] pulls `targetPath` out of the query string and keeps
//! every other pair as its raw encoded segment, so the upstream sees the
//! remaining query exactly as the browser sent it: same order, duplicates
//! kept, no re-encoding.

use hyper::{HeaderMap, Method, Uri};
use url::form_urlencoded;

use crate::defaults::TARGET_PATH_PARAM;
use crate::error::{GatewayError, Result};
use crate::headers::sanitize_request_headers;

/// A GET to be replayed against the upstream.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    target_path: String,
    query: Vec<String>,
    headers: HeaderMap,
}

impl ProxyRequest {
    /// Builds the descriptor from an inbound request URI and headers.
    ///
    /// Headers are sanitized on the way in. Fails with
    /// [`GatewayError::MissingParameter`] when `targetPath` is absent or
    /// empty.
    pub fn from_parts(uri: &Uri, headers: &HeaderMap) -> Result<Self> {
        let mut request = Self::from_query(uri.query())?;
        request.headers = sanitize_request_headers(headers);
        Ok(request)
    }

    /// Builds the descriptor from a raw query string.
    ///
    /// Every `targetPath` pair is removed; the first one names the target.
    ///
    /// # Example
    ///
    /// ```
    /// use sessiongate_core::proxy_request::ProxyRequest;
    ///
    /// let request = ProxyRequest::from_query(Some("targetPath=/orders&status=open&status=closed")).unwrap();
    /// assert_eq!(request.target_path(), "/orders");
    /// assert_eq!(request.query_string(), "status=open&status=closed");
    /// ```
    pub fn from_query(query: Option<&str>) -> Result<Self> {
        let mut target_path = None;
        let mut forwarded = Vec::new();

        for segment in query.unwrap_or("").split('&').filter(|s| !s.is_empty()) {
            let (key, value) = decode_pair(segment);
            if key == TARGET_PATH_PARAM {
                target_path.get_or_insert(value);
            } else {
                forwarded.push(segment.to_string());
            }
        }

        match target_path {
            Some(target_path) if !target_path.is_empty() => Ok(Self {
                target_path,
                query: forwarded,
                headers: HeaderMap::new(),
            }),
            _ => Err(GatewayError::MissingParameter(TARGET_PATH_PARAM.to_string())),
        }
    }

    /// Decoded upstream path.
    pub fn target_path(&self) -> &str {
        &self.target_path
    }

    /// Proxied requests are always GETs.
    pub fn method(&self) -> Method {
        Method::GET
    }

    /// Sanitized headers to forward.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Consumes the descriptor, returning its headers.
    pub fn into_headers(self) -> HeaderMap {
        self.headers
    }

    /// Remaining query, raw, joined with `&`. Empty when nothing remains.
    pub fn query_string(&self) -> String {
        self.query.join("&")
    }

    /// Remaining query pairs, decoded, in original order.
    pub fn params(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.query.iter().map(|segment| decode_pair(segment))
    }

    /// Full upstream URL: `base + targetPath ('?' + query)`.
    ///
    /// # Example
    ///
    /// ```
    /// use sessiongate_core::proxy_request::ProxyRequest;
    ///
    /// let request = ProxyRequest::from_query(Some("targetPath=/orders&status=open&status=closed")).unwrap();
    /// assert_eq!(
    ///     request.upstream_url("https://api.example.test/"),
    ///     "https://api.example.test/orders?status=open&status=closed"
    /// );
    /// ```
    pub fn upstream_url(&self, base: &str) -> String {
        let url = join_url(base, &self.target_path);
        if self.query.is_empty() {
            url
        } else {
            format!("{url}?{}", self.query_string())
        }
    }
}

/// Joins a base URL and a path with exactly one `/` between them.
///
/// The path always lands below the base, so a target such as
/// `@other.host/x` cannot turn into a userinfo/host component.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

/// Splits one raw `key=value` segment and form-decodes both halves.
fn decode_pair(segment: &str) -> (String, String) {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .unwrap_or_default()
}
