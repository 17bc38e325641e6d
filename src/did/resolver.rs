// SPDX-License-Identifier: AGPL-3.0-or-later

//! DID resolution.
//!
//! Resolution is live on every request: failures are not cached and there are
//! no retries, so a stale authority document can never be served.

use async_trait::async_trait;
use thiserror::Error;

use super::document::DidDocument;

#[derive(Debug, Error)]
pub enum DidError {
    #[error("failed to resolve DID '{did}': {reason}")]
    Resolution { did: String, reason: String },
    #[error("unsupported DID method in '{0}': only did:web is supported")]
    UnsupportedMethod(String),
    #[error("could not find service with type '{service_type}' in DID document for '{did}'")]
    NoMatchingService { service_type: String, did: String },
}

/// Resolves a DID into its DID document.
#[async_trait]
pub trait DidResolver: Send + Sync {
    async fn resolve(&self, did: &str) -> Result<DidDocument, DidError>;
}

/// `did:web` resolver fetching `did.json` over HTTPS.
pub struct WebDidResolver {
    client: reqwest::Client,
}

impl WebDidResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DidResolver for WebDidResolver {
    async fn resolve(&self, did: &str) -> Result<DidDocument, DidError> {
        let url = did_web_url(did)?;

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DidError::Resolution {
                did: did.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DidError::Resolution {
                did: did.to_string(),
                reason: format!("HTTP {} from {url}", response.status()),
            });
        }

        response.json().await.map_err(|e| DidError::Resolution {
            did: did.to_string(),
            reason: format!("invalid DID document: {e}"),
        })
    }
}

/// Map a `did:web` identifier to the URL of its DID document.
///
/// `did:web:example.com` resolves to the well-known location; additional
/// colon-separated segments become path components, and `%3A` escapes a port
/// separator in the host.
fn did_web_url(did: &str) -> Result<String, DidError> {
    let method_specific = did
        .strip_prefix("did:web:")
        .ok_or_else(|| DidError::UnsupportedMethod(did.to_string()))?;
    if method_specific.is_empty() {
        return Err(DidError::UnsupportedMethod(did.to_string()));
    }

    let mut segments = method_specific.split(':');
    let host = segments
        .next()
        .expect("split always yields one segment")
        .replace("%3A", ":");

    let path: Vec<&str> = segments.collect();
    if path.is_empty() {
        Ok(format!("https://{host}/.well-known/did.json"))
    } else {
        Ok(format!("https://{host}/{}/did.json", path.join("/")))
    }
}
