// SPDX-License-Identifier: AGPL-3.0-or-later

//! Authority catalog endpoint location.

use std::sync::Arc;

use super::resolver::{DidError, DidResolver};

/// Locates the authority's federated catalog endpoint through its DID
/// document.
///
/// One resolution attempt per request, nothing cached: every filter request
/// sees the authority's current service endpoints.
pub struct AuthorityLocator {
    resolver: Arc<dyn DidResolver>,
    authority_did: String,
    service_type: String,
}

impl AuthorityLocator {
    pub fn new(
        resolver: Arc<dyn DidResolver>,
        authority_did: impl Into<String>,
        service_type: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            authority_did: authority_did.into(),
            service_type: service_type.into(),
        }
    }

    /// Resolve the authority DID and return the endpoint URL of the service
    /// entry whose type matches the configured catalog service type.
    pub async fn catalog_endpoint(&self) -> Result<String, DidError> {
        let document = self.resolver.resolve(&self.authority_did).await?;

        document
            .service_of_type(&self.service_type)
            .map(|service| service.service_endpoint.clone())
            .ok_or_else(|| DidError::NoMatchingService {
                service_type: self.service_type.clone(),
                did: self.authority_did.clone(),
            })
    }
}
