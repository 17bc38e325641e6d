// SPDX-License-Identifier: AGPL-3.0-or-later

//! Raw catalog retrieval.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::did::DidError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Did(#[from] DidError),
    #[error("catalog request to '{url}' failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("catalog endpoint returned HTTP {status}: {body}")]
    Endpoint { status: u16, body: String },
    #[error("unexpected catalog response structure: expected a JSON array")]
    NotAnArray,
}

/// Retrieves the raw catalog entries from an endpoint URL.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<Value>, CatalogError>;
}

/// HTTP catalog source issuing a POST with an empty body, the query form the
/// federated catalog endpoint expects.
pub struct HttpCatalogSource {
    client: reqwest::Client,
}

impl HttpCatalogSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self, url: &str) -> Result<Vec<Value>, CatalogError> {
        let response =
            self.client
                .post(url)
                .send()
                .await
                .map_err(|e| CatalogError::Transport {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Endpoint {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await.map_err(|e| CatalogError::Transport {
            url: url.to_string(),
            reason: format!("invalid JSON in catalog response: {e}"),
        })?;

        match body {
            Value::Array(entries) => Ok(entries),
            _ => Err(CatalogError::NotAnArray),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/catalog")
    }

    fn source() -> HttpCatalogSource {
        HttpCatalogSource::new(reqwest::Client::new())
    }

    #[tokio::test]
    async fn fetches_a_catalog_array() {
        let url = serve(Router::new().route(
            "/catalog",
            post(|| async { Json(json!([{ "@id": "catalog-1" }])) }),
        ))
        .await;

        let entries = source().fetch(&url).await.unwrap();
        assert_eq!(entries, vec![json!({ "@id": "catalog-1" })]);
    }

    #[tokio::test]
    async fn non_success_status_carries_status_and_body() {
        let url = serve(Router::new().route(
            "/catalog",
            post(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "broken") }),
        ))
        .await;

        let err = source().fetch(&url).await.unwrap_err();
        match err {
            CatalogError::Endpoint { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn non_array_response_is_rejected() {
        let url = serve(Router::new().route(
            "/catalog",
            post(|| async { Json(json!({ "@id": "not-an-array" })) }),
        ))
        .await;

        assert!(matches!(
            source().fetch(&url).await.unwrap_err(),
            CatalogError::NotAnArray
        ));
    }

    #[tokio::test]
    async fn connection_failure_is_a_transport_error() {
        let err = source()
            .fetch("http://127.0.0.1:1/catalog")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Transport { .. }));
    }
}
