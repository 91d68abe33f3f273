//! Upstream content store over HTTP(S).

use crate::domain::errors::RelayError;
use crate::domain::outbound::{OutboundUpload, ENTITY_ID_FIELD};
use crate::domain::proxy::ProxiedResponse;
use crate::domain::upstream::UpstreamResponse;
use crate::ports::outbound::ContentStore;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::debug;

/// Header identifying the relay to the upstream.
pub const UPLOAD_ORIGIN_HEADER: &str = "x-upload-origin";

/// Path of the upstream publish endpoint.
const ENTITIES_PATH: &str = "/content/entities";

#[derive(Debug, Clone)]
pub struct HttpContentStore {
    base_url: String,
    upload_origin: String,
    upload_timeout: Duration,
    discovery_timeout: Duration,
    client: reqwest::Client,
}

impl HttpContentStore {
    /// `base_url` is the upstream origin, e.g. `https://peer.example.org`.
    pub fn new(
        base_url: impl Into<String>,
        upload_origin: impl Into<String>,
        upload_timeout: Duration,
        discovery_timeout: Duration,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .user_agent(concat!("parcel-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            base_url,
            upload_origin: upload_origin.into(),
            upload_timeout,
            discovery_timeout,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Read every staged file once and assemble the multipart form.
    async fn build_form(upload: OutboundUpload) -> Result<Form, RelayError> {
        let mut form = Form::new().text(ENTITY_ID_FIELD, upload.entity_id.as_str().to_string());
        for (name, value) in upload.chain_fields {
            form = form.text(name, value);
        }
        for file in upload.files {
            let bytes = tokio::fs::read(&file.path).await?;
            let part = Part::bytes(bytes).file_name(file.field_name.clone());
            let part = match file.content_type.as_deref() {
                Some(mime) => part.mime_str(mime).map_err(|e| {
                    RelayError::MalformedUpload(format!("bad content type {mime:?}: {e}"))
                })?,
                None => part,
            };
            form = form.part(file.field_name, part);
        }
        Ok(form)
    }
}

fn unavailable(e: reqwest::Error, timeout: Duration) -> RelayError {
    if e.is_timeout() {
        RelayError::UpstreamUnavailable(format!("timed out after {timeout:?}"))
    } else {
        RelayError::UpstreamUnavailable(e.to_string())
    }
}

#[async_trait::async_trait]
impl ContentStore for HttpContentStore {
    async fn publish(&self, upload: OutboundUpload) -> Result<UpstreamResponse, RelayError> {
        let url = format!("{}{}", self.base_url, ENTITIES_PATH);
        let entity = upload.entity_id.clone();
        let form = Self::build_form(upload).await?;

        let response = self
            .client
            .post(&url)
            .header(UPLOAD_ORIGIN_HEADER, &self.upload_origin)
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| unavailable(e, self.upload_timeout))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| unavailable(e, self.upload_timeout))?;

        debug!(entity = %entity, status = status.as_u16(), "Upstream answered publish");

        if !status.is_success() {
            return Err(RelayError::UpstreamRejected {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(UpstreamResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }

    async fn fetch(&self, path_and_query: &str) -> Result<ProxiedResponse, RelayError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let response = self
            .client
            .get(&url)
            .timeout(self.discovery_timeout)
            .send()
            .await
            .map_err(|e| unavailable(e, self.discovery_timeout))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| unavailable(e, self.discovery_timeout))?;

        Ok(ProxiedResponse {
            status,
            headers,
            body,
        })
    }
}
