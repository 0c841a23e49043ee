//! Google Drive storage provider
//!
//! Each session authenticates with the service-account credential and
//! uploads through the Drive v3 `files.create` multipart endpoint.
//! Sessions are not cached; every upload exchanges a fresh token.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Body, Client};
use serde::Deserialize;
use tracing::{debug, info};

use super::{
    FileContent, NewFile, ServiceAccountCredential, StorageError, StorageProvider, StorageResult,
    StorageSession, StoredFile,
};

pub const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";
const RESPONSE_FIELDS: &str = "id,name,parents";

#[derive(Clone)]
pub struct GoogleDrive {
    client: Client,
    credential: ServiceAccountCredential,
    upload_base: String,
}

impl GoogleDrive {
    pub fn new(credential: ServiceAccountCredential) -> Self {
        Self {
            client: Client::new(),
            credential,
            upload_base: DRIVE_UPLOAD_BASE.to_string(),
        }
    }

    /// Point uploads at a different Drive endpoint (tests, proxies).
    pub fn with_upload_base(mut self, upload_base: impl Into<String>) -> Self {
        self.upload_base = upload_base.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl StorageProvider for GoogleDrive {
    async fn open_session(&self) -> StorageResult<Box<dyn StorageSession>> {
        let key = self.credential.parse()?;
        let access_token = key.fetch_access_token(&self.client, DRIVE_SCOPE).await?;

        debug!("Opened Drive session as {}", key.client_email);

        Ok(Box::new(DriveSession {
            client: self.client.clone(),
            access_token,
            upload_base: self.upload_base.clone(),
        }))
    }
}

pub struct DriveSession {
    client: Client,
    access_token: String,
    upload_base: String,
}

#[derive(Deserialize)]
struct DriveErrorResponse {
    error: DriveErrorBody,
}

#[derive(Deserialize)]
struct DriveErrorBody {
    message: String,
}

#[async_trait]
impl StorageSession for DriveSession {
    async fn create_file(&self, file: NewFile, content: FileContent) -> StorageResult<StoredFile> {
        let url = format!("{}/files", self.upload_base);
        let boundary = format!("relay-{}", uuid::Uuid::new_v4().simple());
        let parts = related_parts(&boundary, &file, &content)?;
        let content_length: usize = parts.iter().map(Bytes::len).sum();
        let body = Body::wrap_stream(futures::stream::iter(
            parts.into_iter().map(Ok::<_, std::io::Error>),
        ));

        let response = self
            .client
            .post(&url)
            .query(&[("uploadType", "multipart"), ("fields", RESPONSE_FIELDS)])
            .bearer_auth(&self.access_token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .header(reqwest::header::CONTENT_LENGTH, content_length)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<DriveErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(StorageError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let stored: StoredFile = serde_json::from_str(&text)
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;

        info!("Drive created file {} ({})", stored.id, file.name);
        Ok(stored)
    }
}

/// Chunks of a `multipart/related` body: JSON metadata first, media second.
/// The media chunk shares the uploaded buffer instead of copying it.
fn related_parts(boundary: &str, file: &NewFile, content: &FileContent) -> StorageResult<[Bytes; 3]> {
    let metadata = serde_json::to_string(file)
        .map_err(|e| StorageError::Request(format!("encoding metadata: {}", e)))?;

    let head = format!(
        "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{meta}\r\n--{b}\r\nContent-Type: {mime}\r\n\r\n",
        b = boundary,
        meta = metadata,
        mime = content.mime_type,
    );
    let tail = format!("\r\n--{}--\r\n", boundary);

    Ok([Bytes::from(head), content.data.clone(), Bytes::from(tail)])
}
