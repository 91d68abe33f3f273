//! HTTP handlers.
//!
//! Handlers only translate between HTTP and the domain: multipart in,
//! `PublishRequest` out; `UpstreamResponse` / `ProxiedResponse` back to axum
//! responses.

use crate::domain::about::about_document;
use crate::domain::error::{DiscoveryError, PublishError};
use crate::publish::PublishRequest;
use crate::service::AppState;
use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::header::{CONTENT_TYPE, HOST};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use pr_03_upload_relay::{ProxiedResponse, UploadFileSet, UpstreamResponse, ENTITY_ID_FIELD};
use shared_types::EntityId;
use tracing::{debug, warn};

/// Hint to the edge proxy in front of the relay to wait for slow uploads.
pub const EDGE_TIMEOUT_HEADER: &str = "x-extend-cf-timeout";
const EDGE_TIMEOUT_VALUE: &str = "10";

// =============================================================================
// HEALTH
// =============================================================================

pub async fn health_ready() -> &'static str {
    "ready"
}

pub async fn health_startup() -> &'static str {
    "[server] ok"
}

pub async fn health_live() -> &'static str {
    "alive"
}

// =============================================================================
// ABOUT
// =============================================================================

pub async fn about(State(state): State<AppState>, headers: HeaderMap) -> Json<serde_json::Value> {
    let host = headers.get(HOST).and_then(|v| v.to_str().ok());
    Json(about_document(&state.about, host))
}

// =============================================================================
// DISCOVERY
// =============================================================================

/// `GET /content/*`: forward path and query verbatim.
pub async fn discovery(State(state): State<AppState>, uri: Uri) -> Result<Response, DiscoveryError> {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    match state.discovery.forward(path_and_query).await {
        Ok(proxied) => Ok(proxied_into_response(proxied)),
        Err(e) => {
            warn!(path = %uri.path(), error = %e, "Discovery read failed");
            Err(DiscoveryError(e))
        }
    }
}

fn proxied_into_response(proxied: ProxiedResponse) -> Response {
    let mut response = Response::new(Body::from(proxied.body));
    *response.status_mut() = StatusCode::from_u16(proxied.status).unwrap_or(StatusCode::BAD_GATEWAY);

    let headers = response.headers_mut();
    for (name, value) in proxied.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => debug!(header = %name, "Dropping unrepresentable upstream header"),
        }
    }
    response
}

// =============================================================================
// PUBLISH
// =============================================================================

/// `POST /content/entities`.
///
/// Responses that involved the upstream (success or upstream failure) carry
/// the edge timeout hint; early rejections do not.
pub async fn publish(State(state): State<AppState>, multipart: Multipart) -> Response {
    let result = match receive_publish(multipart).await {
        Ok(request) => state.pipeline.publish(&request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(upstream) => with_edge_timeout(upstream_into_response(upstream)),
        Err(e) if e.reached_upstream() => with_edge_timeout(e.into_response()),
        Err(e) => e.into_response(),
    }
}

/// Drain the multipart body: text fields into memory, file parts streamed to
/// the request's staging directory.
async fn receive_publish(mut multipart: Multipart) -> Result<PublishRequest, PublishError> {
    let mut fields: Vec<(String, String)> = Vec::new();
    let mut files = UploadFileSet::new()?;

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if field.file_name().is_none() {
            let value = field.text().await?;
            fields.push((name, value));
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let mut writer = files.open(name, file_name, content_type).await?;
        while let Some(chunk) = field.chunk().await? {
            writer.write(&chunk).await?;
        }
        files.push(writer.finish().await?);
    }

    let entity_id = fields
        .iter()
        .find(|(name, _)| name == ENTITY_ID_FIELD)
        .map(|(_, value)| EntityId::new(value.trim()))
        .filter(|id| !id.as_str().is_empty())
        .ok_or_else(|| PublishError::MalformedUpload(format!("missing {ENTITY_ID_FIELD} field")))?;

    debug!(
        entity = %entity_id,
        fields = fields.len(),
        files = files.len(),
        bytes = files.total_bytes(),
        "Publish request received"
    );

    Ok(PublishRequest {
        entity_id,
        fields,
        files,
    })
}

fn upstream_into_response(upstream: UpstreamResponse) -> Response {
    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::OK);
    if let Some(value) = upstream
        .content_type
        .and_then(|ct| HeaderValue::from_str(&ct).ok())
    {
        response.headers_mut().insert(CONTENT_TYPE, value);
    }
    response
}

fn with_edge_timeout(mut response: Response) -> Response {
    response.headers_mut().insert(
        HeaderName::from_static(EDGE_TIMEOUT_HEADER),
        HeaderValue::from_static(EDGE_TIMEOUT_VALUE),
    );
    response
}
