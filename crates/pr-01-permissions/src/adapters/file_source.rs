//! Local JSON file source.

use crate::domain::errors::SourceError;
use crate::domain::record::AuthorizationRecord;
use crate::ports::outbound::AuthorizationSource;
use std::path::PathBuf;

/// Reads the authorization document from disk on every fetch.
#[derive(Debug, Clone)]
pub struct FileAuthorizationSource {
    path: PathBuf,
}

impl FileAuthorizationSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl AuthorizationSource for FileAuthorizationSource {
    async fn fetch(&self) -> Result<Vec<AuthorizationRecord>, SourceError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.describe(),
                source,
            })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
