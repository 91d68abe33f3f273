//! Remote JSON document source.

use crate::domain::errors::SourceError;
use crate::domain::record::AuthorizationRecord;
use crate::ports::outbound::AuthorizationSource;
use std::time::Duration;

/// Fetches the authorization document over HTTP(S) on every call.
#[derive(Debug, Clone)]
pub struct HttpAuthorizationSource {
    url: String,
    client: reqwest::Client,
}

impl HttpAuthorizationSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("parcel-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl AuthorizationSource for HttpAuthorizationSource {
    async fn fetch(&self) -> Result<Vec<AuthorizationRecord>, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
