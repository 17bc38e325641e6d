// SPDX-License-Identifier: AGPL-3.0-or-later

//! Typed catalog model.
//!
//! Value types built from the expanded catalog wire form. Required fields are
//! validated at construction; a filtered catalog is always a rebuild, never a
//! mutation.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::policy::Policy;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("catalog requires a non-empty @id")]
    MissingCatalogId,
    #[error("dataset requires a non-empty @id")]
    MissingDatasetId,
}

/// A dataset offered through the catalog, with its usage policies keyed by
/// offer identifier.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    pub id: String,
    pub offers: BTreeMap<String, Policy>,
}

impl Dataset {
    pub fn new(id: impl Into<String>, offers: BTreeMap<String, Policy>) -> Result<Self, ModelError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ModelError::MissingDatasetId);
        }
        Ok(Self { id, offers })
    }

    /// A dataset without offers is access-unrestricted.
    pub fn is_unrestricted(&self) -> bool {
        self.offers.is_empty()
    }
}

/// A data service entry advertised alongside the datasets.
#[derive(Debug, Clone, Serialize)]
pub struct DataService {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
}

/// One participant's catalog as fetched from the authority.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<String>,
    pub datasets: Vec<Dataset>,
    pub data_services: Vec<DataService>,
    /// Remaining top-level properties of the catalog entry, keyed by their
    /// expanded IRI.
    pub properties: BTreeMap<String, Value>,
}

impl Catalog {
    pub fn new(
        id: impl Into<String>,
        participant_id: Option<String>,
        datasets: Vec<Dataset>,
        data_services: Vec<DataService>,
        properties: BTreeMap<String, Value>,
    ) -> Result<Self, ModelError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ModelError::MissingCatalogId);
        }
        Ok(Self {
            id,
            participant_id,
            datasets,
            data_services,
            properties,
        })
    }

    /// Rebuild this catalog with a different dataset collection, preserving
    /// identity, services and properties.
    pub fn with_datasets(&self, datasets: Vec<Dataset>) -> Self {
        Self {
            id: self.id.clone(),
            participant_id: self.participant_id.clone(),
            datasets,
            data_services: self.data_services.clone(),
            properties: self.properties.clone(),
        }
    }

    /// Whether `needle` occurs as a substring in the participant identifier
    /// or any string-valued top-level property.
    pub fn mentions(&self, needle: &str) -> bool {
        if self
            .participant_id
            .as_deref()
            .is_some_and(|id| id.contains(needle))
        {
            return true;
        }
        self.properties
            .values()
            .filter_map(Value::as_str)
            .any(|value| value.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog_with_properties(properties: BTreeMap<String, Value>) -> Catalog {
        Catalog::new("catalog-1", Some("did:web:owner".to_string()), vec![], vec![], properties)
            .unwrap()
    }

    #[test]
    fn empty_ids_are_rejected() {
        assert_eq!(
            Catalog::new("", None, vec![], vec![], BTreeMap::new()).unwrap_err(),
            ModelError::MissingCatalogId
        );
        assert_eq!(
            Dataset::new("", BTreeMap::new()).unwrap_err(),
            ModelError::MissingDatasetId
        );
    }

    #[test]
    fn rebuild_preserves_identity() {
        let mut properties = BTreeMap::new();
        properties.insert("title".to_string(), json!("transport data"));
        let catalog = catalog_with_properties(properties.clone());

        let rebuilt = catalog.with_datasets(vec![
            Dataset::new("asset-1", BTreeMap::new()).unwrap()
        ]);

        assert_eq!(rebuilt.id, catalog.id);
        assert_eq!(rebuilt.participant_id, catalog.participant_id);
        assert_eq!(rebuilt.properties, properties);
        assert_eq!(rebuilt.datasets.len(), 1);
    }

    #[test]
    fn mentions_matches_substrings_in_string_properties() {
        let mut properties = BTreeMap::new();
        properties.insert(
            "note".to_string(),
            json!("maintained by did:web:participant since 2024"),
        );
        properties.insert("count".to_string(), json!(3));
        let catalog = catalog_with_properties(properties);

        assert!(catalog.mentions("did:web:participant"));
        assert!(catalog.mentions("did:web:owner"));
        assert!(!catalog.mentions("did:web:stranger"));
    }

    #[test]
    fn dataset_without_offers_is_unrestricted() {
        let dataset = Dataset::new("open-asset", BTreeMap::new()).unwrap();
        assert!(dataset.is_unrestricted());
    }
}
