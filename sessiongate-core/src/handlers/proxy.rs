//! Generic GET proxy: `GET /api/proxy?targetPath=...`.
//!
//! Resolves `base + targetPath + remaining query`, forwards with sanitized
//! headers and streams the upstream response back unmodified apart from
//! transport headers.
//!
//! Any `targetPath` is forwarded unless an allow-list is configured: the
//! upstream is expected to be reachable only through this gateway, and that
//! network isolation is the security boundary.

use hyper::{Request, Response};
use tracing::{debug, warn};

use crate::error::{GatewayError, Result};
use crate::proxy_request::ProxyRequest;
use crate::response::GatewayBody;
use crate::types::ConfigProvider;
use crate::upstream::{UpstreamClient, UpstreamResponse};

/// Handles a proxied GET. Always produces a well-formed response.
pub async fn proxy_get<B, C>(
    req: Request<B>,
    config: &C,
    client: &UpstreamClient,
) -> Response<GatewayBody>
where
    C: ConfigProvider + ?Sized,
{
    match forward(req, config, client).await {
        Ok(response) => response,
        Err(err) => {
            if err.is_server_error() {
                warn!(error = %err, "Proxy request failed");
            } else {
                debug!(error = %err, "Proxy request rejected");
            }
            err.into_response()
        }
    }
}

async fn forward<B, C>(
    req: Request<B>,
    config: &C,
    client: &UpstreamClient,
) -> Result<Response<GatewayBody>>
where
    C: ConfigProvider + ?Sized,
{
    let base = config.require_upstream_base()?;
    let descriptor = ProxyRequest::from_parts(req.uri(), req.headers())?;

    if !config
        .proxy_config()
        .is_path_allowed(base, descriptor.target_path())
    {
        return Err(GatewayError::PathNotAllowed(
            descriptor.target_path().to_string(),
        ));
    }

    let url = descriptor.upstream_url(base);
    let method = descriptor.method();
    let upstream = client
        .forward(method, &url, descriptor.into_headers(), None)
        .await?;

    Ok(relay(upstream))
}

/// Relays status, sanitized headers and the streamed body.
pub fn relay(upstream: UpstreamResponse) -> Response<GatewayBody> {
    let status = upstream.status();
    let headers = upstream.sanitized_headers();

    let mut response = Response::new(upstream.into_body());
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
