use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware as axum_middleware,
    response::Response,
    Router,
};

use crate::config::KeymasterConfig;
use crate::error::KeymasterResult;
use crate::keymaster::{keymaster_middleware, Keymaster};

/// Object server the host forwards every request to.
#[derive(Clone)]
pub struct Upstream {
    client: reqwest::Client,
    base_url: String,
    body_limit: usize,
}

impl Upstream {
    pub fn new(config: &KeymasterConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.upstream_url.trim_end_matches('/').to_string(),
            body_limit: config.body_limit(),
        }
    }
}

/// Wrap `service` with the keymaster middleware.
///
/// Routes and fallback must already be registered on `service`.
pub fn build_router(keymaster: Keymaster, service: Router) -> Router {
    service.layer(axum_middleware::from_fn_with_state(
        keymaster,
        keymaster_middleware,
    ))
}

pub fn proxy_router(upstream: Upstream) -> Router {
    Router::new().fallback(proxy_request).with_state(upstream)
}

pub async fn start_server(config: KeymasterConfig) -> KeymasterResult<()> {
    if config.uses_default_secret() {
        log::warn!("Using the placeholder root secret; derived keys are not secret");
    }

    let keymaster = Keymaster::from_config(&config);
    let app = build_router(keymaster, proxy_router(Upstream::new(&config)));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    log::info!(
        "Keymaster listening on {} upstream={}",
        config.listen_addr,
        config.upstream_url
    );
    axum::serve(listener, app).await?;

    Ok(())
}

/// Forward the request as-is to the upstream object server and relay its
/// response.
pub async fn proxy_request(
    State(upstream): State<Upstream>,
    req: Request,
) -> Result<Response, StatusCode> {
    let (parts, body) = req.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!("{}{}", upstream.base_url, path_and_query);

    let body = to_bytes(body, upstream.body_limit)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;

    let mut headers = parts.headers;
    strip_hop_headers(&mut headers);
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);

    let response = upstream
        .client
        .request(parts.method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| {
            log::warn!("Upstream request failed url={} error={}", url, e);
            StatusCode::BAD_GATEWAY
        })?;

    let status = response.status();
    let mut headers = response.headers().clone();
    strip_hop_headers(&mut headers);
    let bytes = response.bytes().await.map_err(|_| StatusCode::BAD_GATEWAY)?;

    let mut resp = Response::new(Body::from(bytes));
    *resp.status_mut() = status;
    *resp.headers_mut() = headers;
    Ok(resp)
}

fn strip_hop_headers(headers: &mut HeaderMap) {
    headers.remove(header::CONNECTION);
    headers.remove(header::TRANSFER_ENCODING);
}
