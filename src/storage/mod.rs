// Storage layer: the remote object store uploads are relayed to

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

pub mod credentials;
pub mod google_drive;

pub use credentials::{ServiceAccountCredential, ServiceAccountKey};
pub use google_drive::GoogleDrive;

/// Name pattern of every stored photo, local time at second resolution.
pub const PHOTO_NAME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S.jpg";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid service account credential: {0}")]
    InvalidCredential(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("request to storage provider failed: {0}")]
    Request(String),

    #[error("Drive API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response from storage provider: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for StorageError {
    fn from(e: reqwest::Error) -> Self {
        StorageError::Request(e.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Metadata for a file about to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewFile {
    pub name: String,
    pub parents: Vec<String>,
}

impl NewFile {
    /// A photo named after `taken_at`, placed in `folder_id`.
    pub fn photo<Tz>(folder_id: &str, taken_at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            name: photo_file_name(taken_at),
            parents: vec![folder_id.to_string()],
        }
    }
}

/// Bytes to upload plus their declared media type.
#[derive(Debug, Clone)]
pub struct FileContent {
    pub data: Bytes,
    pub mime_type: String,
}

/// The provider's view of a created file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredFile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parents: Vec<String>,
}

pub fn photo_file_name<Tz>(taken_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    taken_at.format(PHOTO_NAME_FORMAT).to_string()
}

/// Opens authenticated sessions against a storage provider.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    async fn open_session(&self) -> StorageResult<Box<dyn StorageSession>>;
}

/// One authenticated conversation with the provider.
#[async_trait]
pub trait StorageSession: Send + Sync {
    async fn create_file(&self, file: NewFile, content: FileContent) -> StorageResult<StoredFile>;
}
