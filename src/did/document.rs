// SPDX-License-Identifier: AGPL-3.0-or-later

//! DID document model.

use serde::{Deserialize, Serialize};

/// A resolved DID document, reduced to the parts endpoint location needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DidDocument {
    pub id: String,
    /// Declared service endpoints, keyed by their `type`.
    #[serde(default, rename = "service")]
    pub services: Vec<DidService>,
}

impl DidDocument {
    /// First declared service whose type equals `service_type`.
    pub fn service_of_type(&self, service_type: &str) -> Option<&DidService> {
        self.services
            .iter()
            .find(|s| s.service_type == service_type)
    }
}

/// A single service entry of a DID document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DidService {
    pub id: String,
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(rename = "serviceEndpoint")]
    pub service_endpoint: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> DidDocument {
        serde_json::from_value(serde_json::json!({
            "id": "did:web:authority",
            "service": [
                {
                    "id": "did:web:authority#identity",
                    "type": "IdentityHub",
                    "serviceEndpoint": "https://authority.example.com/identity"
                },
                {
                    "id": "did:web:authority#catalog",
                    "type": "FederatedCatalogService",
                    "serviceEndpoint": "https://authority.example.com/catalog"
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn finds_service_by_type() {
        let doc = document();
        let service = doc.service_of_type("FederatedCatalogService").unwrap();
        assert_eq!(service.service_endpoint, "https://authority.example.com/catalog");
    }

    #[test]
    fn missing_type_yields_none() {
        assert!(document().service_of_type("Unknown").is_none());
    }

    #[test]
    fn document_without_services_deserializes() {
        let doc: DidDocument =
            serde_json::from_value(serde_json::json!({ "id": "did:web:empty" })).unwrap();
        assert!(doc.services.is_empty());
    }
}
