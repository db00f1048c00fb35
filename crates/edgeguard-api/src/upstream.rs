//! Forwarding of unmatched routes to the configured upstream.

use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, HeaderName, Request, header};
use axum::response::Response;
use tracing::debug;

use edgeguard_core::config::UpstreamConfig;
use edgeguard_core::error::AppError;

/// Largest request body buffered for forwarding.
const MAX_FORWARD_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Connection-scoped headers that must not cross the edge.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// HTTP client bound to one upstream base URL.
#[derive(Debug, Clone)]
pub struct UpstreamForwarder {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamForwarder {
    /// Build a forwarder if `upstream.base_url` is set.
    pub fn from_config(config: &UpstreamConfig) -> Result<Option<Self>, AppError> {
        let Some(base_url) = config.base_url.as_deref().filter(|url| !url.is_empty()) else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build upstream client: {e}")))?;

        Ok(Some(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }))
    }

    /// Upstream base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send the request upstream and relay the answer.
    ///
    /// Method, path, query, headers (identity and trace id included) and
    /// body are kept.
    pub async fn forward(&self, request: Request<Body>) -> Result<Response, AppError> {
        let (parts, body) = request.into_parts();
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let url = format!("{}{}", self.base_url, path_and_query);

        let body = to_bytes(body, MAX_FORWARD_BODY_BYTES)
            .await
            .map_err(|e| AppError::validation(format!("Unreadable request body: {e}")))?;

        let mut headers = strip_hop_by_hop(parts.headers);
        headers.remove(header::HOST);
        headers.remove(header::CONTENT_LENGTH);

        debug!(method = %parts.method, url = %url, "Forwarding upstream");

        let upstream = self
            .client
            .request(parts.method, &url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::upstream_unavailable(format!("Upstream request failed: {e}")))?;

        let status = upstream.status();
        let headers = strip_hop_by_hop(upstream.headers().clone());
        let bytes = upstream
            .bytes()
            .await
            .map_err(|e| AppError::upstream_unavailable(format!("Upstream body failed: {e}")))?;

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response.headers_mut().remove(header::CONTENT_LENGTH);
        Ok(response)
    }
}

fn strip_hop_by_hop(mut headers: HeaderMap) -> HeaderMap {
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }
    headers
}
