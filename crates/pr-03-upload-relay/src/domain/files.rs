//! # Staged Upload Files
//!
//! Every file part of a publish request is written to a temporary directory
//! owned by the request. The directory and its contents are removed when the
//! `UploadFileSet` is dropped, whichever way the request ends.
//!
//! On-disk names are sequence numbers; client-supplied names are kept only as
//! metadata and never touch a path.

use crate::domain::errors::RelayError;
use shared_types::{Entity, EntityId};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;

/// One staged file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Multipart field name the client used.
    pub field_name: String,
    /// Original filename from the part's content-disposition, if any.
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub path: PathBuf,
    pub size: u64,
}

impl UploadedFile {
    /// Whether this file is the document describing `entity_id`.
    ///
    /// Matches on the original filename, falling back to the field name.
    pub fn is_entity_file(&self, entity_id: &EntityId) -> bool {
        let name = self.file_name.as_deref().unwrap_or(&self.field_name);
        name == entity_id.as_str()
    }
}

/// The set of files that arrived with one request.
#[derive(Debug)]
pub struct UploadFileSet {
    dir: TempDir,
    files: Vec<UploadedFile>,
    next_part: usize,
}

/// Incremental writer for one file part.
pub struct StagingWriter {
    file: tokio::fs::File,
    staged: UploadedFile,
}

impl StagingWriter {
    pub async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk).await?;
        self.staged.size += chunk.len() as u64;
        Ok(())
    }

    pub async fn finish(mut self) -> io::Result<UploadedFile> {
        self.file.flush().await?;
        Ok(self.staged)
    }
}

impl UploadFileSet {
    /// Create an empty set backed by a fresh temporary directory.
    pub fn new() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("parcel-relay-").tempdir()?;
        Ok(Self {
            dir,
            files: Vec::new(),
            next_part: 0,
        })
    }

    /// Start staging a file part. Call `push` with the finished file.
    pub async fn open(
        &mut self,
        field_name: impl Into<String>,
        file_name: Option<String>,
        content_type: Option<String>,
    ) -> io::Result<StagingWriter> {
        let path = self.dir.path().join(format!("part-{:04}", self.next_part));
        self.next_part += 1;
        let file = tokio::fs::File::create(&path).await?;
        Ok(StagingWriter {
            file,
            staged: UploadedFile {
                field_name: field_name.into(),
                file_name,
                content_type,
                path,
                size: 0,
            },
        })
    }

    pub fn push(&mut self, file: UploadedFile) {
        self.files.push(file);
    }

    /// Stage a file whose bytes are already in memory.
    pub async fn stage(
        &mut self,
        field_name: impl Into<String>,
        file_name: Option<String>,
        content_type: Option<String>,
        bytes: &[u8],
    ) -> io::Result<()> {
        let mut writer = self.open(field_name, file_name, content_type).await?;
        writer.write(bytes).await?;
        let staged = writer.finish().await?;
        self.push(staged);
        Ok(())
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn entity_file(&self, entity_id: &EntityId) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.is_entity_file(entity_id))
    }

    /// Read and decode the entity document for `entity_id`.
    pub async fn read_entity(&self, entity_id: &EntityId) -> Result<Entity, RelayError> {
        let file = self.entity_file(entity_id).ok_or_else(|| {
            RelayError::MalformedUpload(format!("no file named after entity {entity_id}"))
        })?;
        let bytes = tokio::fs::read(&file.path).await?;
        Entity::from_json(entity_id.clone(), &bytes)
            .map_err(|e| RelayError::MalformedUpload(e.to_string()))
    }
}
