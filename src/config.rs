use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::env;
use std::fmt;
use tracing::warn;

use crate::storage::ServiceAccountCredential;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Decoded service-account JSON, still unparsed.
    pub credential: ServiceAccountCredential,
    pub folder_id: String,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub access_token: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Fails only when the credential is not valid base64 or the port does
    /// not parse; every other value is taken verbatim.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credential = decode_credential(&lookup("GOOGLE_CREDENTIAL").unwrap_or_default())?;
        let folder_id = lookup("FOLDER_ID").unwrap_or_default();
        let access_token = lookup("ACCESS_TOKEN").unwrap_or_default();

        if credential.is_empty() {
            warn!("GOOGLE_CREDENTIAL is empty; every upload will fail to reach Google Drive");
        }
        if folder_id.is_empty() {
            warn!("FOLDER_ID is empty; uploads will land without a parent folder");
        }
        if access_token.is_empty() {
            warn!("ACCESS_TOKEN is empty; every upload request will be rejected");
        }

        Ok(Self {
            server: ServerConfig {
                port: lookup("PORT")
                    .unwrap_or_else(|| "8080".to_string())
                    .parse()
                    .context("PORT must be a valid port number")?,
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            },
            storage: StorageConfig {
                credential,
                folder_id,
            },
            auth: AuthConfig { access_token },
        })
    }
}

/// Decode the base64 service-account blob.
pub fn decode_credential(encoded: &str) -> Result<ServiceAccountCredential> {
    let bytes = BASE64
        .decode(encoded.trim())
        .context("error decoding google credential")?;
    Ok(ServiceAccountCredential::new(bytes))
}
