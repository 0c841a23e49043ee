//! Google service-account credentials
//!
//! Turns the decoded service-account JSON into a short-lived OAuth access
//! token with the JWT bearer grant: an RS256 assertion signed by the
//! account's private key is exchanged at the account's `token_uri`.

use std::fmt;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::StorageError;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Raw service-account JSON as decoded from the environment.
#[derive(Clone, Default)]
pub struct ServiceAccountCredential(Vec<u8>);

impl ServiceAccountCredential {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the JSON key file.
    pub fn parse(&self) -> Result<ServiceAccountKey, StorageError> {
        let key: ServiceAccountKey = serde_json::from_slice(&self.0)
            .map_err(|e| StorageError::InvalidCredential(e.to_string()))?;

        if let Some(kind) = key.key_type.as_deref() {
            if kind != "service_account" {
                return Err(StorageError::InvalidCredential(format!(
                    "unsupported credential type {:?}",
                    kind
                )));
            }
        }

        Ok(key)
    }
}

impl fmt::Debug for ServiceAccountCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceAccountCredential(<{} bytes redacted>)", self.0.len())
    }
}

/// The fields of a service-account key file we actually use.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: Option<String>,
    pub client_email: String,
    pub private_key: String,
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

impl ServiceAccountKey {
    /// Sign the assertion presented to the token endpoint.
    pub fn build_assertion(&self, scope: &str, issued_at: i64) -> Result<String, StorageError> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| StorageError::InvalidCredential(format!("private key: {}", e)))?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: scope.to_string(),
            aud: self.token_uri.clone(),
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };

        encode(&header, &claims, &key)
            .map_err(|e| StorageError::InvalidCredential(format!("signing assertion: {}", e)))
    }

    /// Exchange a freshly signed assertion for an access token.
    pub async fn fetch_access_token(
        &self,
        client: &Client,
        scope: &str,
    ) -> Result<String, StorageError> {
        let assertion = self.build_assertion(scope, chrono::Utc::now().timestamp())?;

        debug!("Requesting access token for {}", self.client_email);

        let response = client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| StorageError::TokenExchange(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StorageError::TokenExchange(e.to_string()))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => body,
            };
            return Err(StorageError::TokenExchange(format!(
                "{} ({})",
                message,
                status.as_u16()
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| StorageError::TokenExchange(format!("malformed token response: {}", e)))?;

        Ok(token.access_token)
    }
}
