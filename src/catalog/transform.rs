// SPDX-License-Identifier: AGPL-3.0-or-later

//! Catalog wire-form transformation.
//!
//! Turns raw JSON-LD catalog entries into the typed model: each entry is
//! expanded against the registered namespaces, then walked into
//! [`Catalog`]/[`Dataset`]/[`Policy`] values. Constraint left operands are
//! classified into their [`ConstraintKind`] here, once, so policy evaluation
//! never parses strings.
//!
//! Malformed input degrades per element: a bad catalog entry or a bad dataset
//! is skipped with a warning, everything else survives.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use super::model::{Catalog, DataService, Dataset, ModelError};
use crate::jsonld::{JsonLd, DCAT_NS, DSPACE_NS, ODRL_NS};
use crate::policy::{
    Action, AtomicConstraint, Constraint, Operator, Permission, Policy, PolicyNamespace,
};

#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("catalog entry has no '@id'")]
    MissingEntryId,
    #[error("permission has no action")]
    MissingAction,
    #[error("malformed constraint: {0}")]
    MalformedConstraint(String),
}

/// Expands and transforms raw catalog entries into typed catalogs.
pub struct CatalogTransformer {
    jsonld: JsonLd,
    namespace: PolicyNamespace,
}

impl CatalogTransformer {
    pub fn new(jsonld: JsonLd, namespace: PolicyNamespace) -> Self {
        Self { jsonld, namespace }
    }

    /// Transform every entry of the fetched catalog array.
    ///
    /// Per-element failures are logged and skipped; the result contains the
    /// catalogs that survived, possibly none.
    pub fn transform_all(&self, entries: &[Value]) -> Vec<Catalog> {
        let mut catalogs = Vec::with_capacity(entries.len());
        for entry in entries {
            if !entry.is_object() {
                tracing::warn!("skipping non-object catalog entry");
                continue;
            }
            let expanded = match self.jsonld.expand(entry) {
                Ok(expanded) => expanded,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping catalog entry that failed JSON-LD expansion");
                    continue;
                }
            };
            match self.transform_catalog(&expanded) {
                Ok(catalog) => catalogs.push(catalog),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping catalog entry that failed transformation");
                }
            }
        }
        catalogs
    }

    fn transform_catalog(&self, expanded: &Value) -> Result<Catalog, TransformError> {
        let id = node_id(expanded).ok_or(TransformError::MissingEntryId)?;

        let participant_key = format!("{DSPACE_NS}participantId");
        let dataset_key = format!("{DCAT_NS}dataset");
        let service_key = format!("{DCAT_NS}service");

        let participant_id = expanded
            .get(&participant_key)
            .and_then(text_value)
            .map(str::to_string);

        let mut datasets = Vec::new();
        if let Some(raw) = expanded.get(&dataset_key) {
            for node in one_or_many(raw) {
                match self.transform_dataset(node) {
                    Ok(dataset) => datasets.push(dataset),
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping malformed dataset");
                    }
                }
            }
        }

        let mut data_services = Vec::new();
        if let Some(raw) = expanded.get(&service_key) {
            for node in one_or_many(raw) {
                if let Some(id) = node_id(node) {
                    data_services.push(DataService {
                        id: id.to_string(),
                        endpoint_url: node
                            .get(format!("{DCAT_NS}endpointUrl"))
                            .and_then(text_value)
                            .map(str::to_string),
                    });
                } else {
                    tracing::warn!("skipping data service without '@id'");
                }
            }
        }

        let mut properties = BTreeMap::new();
        if let Some(object) = expanded.as_object() {
            for (key, value) in object {
                if key == "@id"
                    || *key == participant_key
                    || *key == dataset_key
                    || *key == service_key
                {
                    continue;
                }
                properties.insert(key.clone(), value.clone());
            }
        }

        Ok(Catalog::new(
            id,
            participant_id,
            datasets,
            data_services,
            properties,
        )?)
    }

    fn transform_dataset(&self, node: &Value) -> Result<Dataset, TransformError> {
        let id = node_id(node).ok_or(ModelError::MissingDatasetId)?;

        let mut offers = BTreeMap::new();
        if let Some(raw) = node.get(format!("{ODRL_NS}hasPolicy")) {
            for (index, policy_node) in one_or_many(raw).into_iter().enumerate() {
                let offer_id = node_id(policy_node)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{id}-offer-{index}"));
                offers.insert(offer_id, self.transform_policy(policy_node)?);
            }
        }

        Ok(Dataset::new(id, offers)?)
    }

    fn transform_policy(&self, node: &Value) -> Result<Policy, TransformError> {
        let mut permissions = Vec::new();
        if let Some(raw) = node.get(format!("{ODRL_NS}permission")) {
            for permission_node in one_or_many(raw) {
                permissions.push(self.transform_permission(permission_node)?);
            }
        }
        Ok(Policy::new(permissions))
    }

    fn transform_permission(&self, node: &Value) -> Result<Permission, TransformError> {
        let action = node
            .get(format!("{ODRL_NS}action"))
            .and_then(node_id_or_text)
            .ok_or(TransformError::MissingAction)?;

        let mut constraints = Vec::new();
        if let Some(raw) = node.get(format!("{ODRL_NS}constraint")) {
            for constraint_node in one_or_many(raw) {
                constraints.push(self.transform_constraint(constraint_node)?);
            }
        }

        Ok(Permission {
            action: Action::new(action),
            constraints,
        })
    }

    fn transform_constraint(&self, node: &Value) -> Result<Constraint, TransformError> {
        if let Some(branches) = node.get(format!("{ODRL_NS}and")) {
            return self.transform_group(branches, Constraint::And);
        }
        if let Some(branches) = node.get(format!("{ODRL_NS}or")) {
            return self.transform_group(branches, Constraint::Or);
        }

        let left = node
            .get(format!("{ODRL_NS}leftOperand"))
            .and_then(node_id_or_text)
            .ok_or_else(|| TransformError::MalformedConstraint("missing leftOperand".into()))?;
        let operator = node
            .get(format!("{ODRL_NS}operator"))
            .and_then(node_id_or_text)
            .ok_or_else(|| TransformError::MalformedConstraint("missing operator".into()))?;
        let right = node
            .get(format!("{ODRL_NS}rightOperand"))
            .and_then(text_value)
            .ok_or_else(|| TransformError::MalformedConstraint("missing rightOperand".into()))?;

        Ok(Constraint::Atomic(AtomicConstraint {
            kind: self.namespace.classify(left),
            left_operand: left.to_string(),
            operator: Operator::parse(operator),
            right_operand: right.to_string(),
        }))
    }

    fn transform_group(
        &self,
        branches: &Value,
        build: fn(Vec<Constraint>) -> Constraint,
    ) -> Result<Constraint, TransformError> {
        let Some(branches) = branches.as_array() else {
            return Err(TransformError::MalformedConstraint(
                "logical constraint group must be an array".into(),
            ));
        };
        let branches = branches
            .iter()
            .map(|branch| self.transform_constraint(branch))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(build(branches))
    }
}

/// Interpret a node as one-or-many: arrays yield their elements, anything
/// else yields itself.
fn one_or_many(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(entries) => entries.iter().collect(),
        other => vec![other],
    }
}

fn node_id(node: &Value) -> Option<&str> {
    node.get("@id").and_then(Value::as_str)
}

/// `@id` of an object node, or the node itself when it is a bare string.
fn node_id_or_text(node: &Value) -> Option<&str> {
    node_id(node).or_else(|| node.as_str())
}

/// Text content of a literal node: a bare string or an `@value` wrapper.
fn text_value(node: &Value) -> Option<&str> {
    node.as_str()
        .or_else(|| node.get("@value").and_then(Value::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ConstraintKind;
    use serde_json::json;

    const POLICY_NS: &str = "https://w3id.org/dse/policy/";

    fn transformer() -> CatalogTransformer {
        let mut jsonld = JsonLd::with_default_namespaces();
        jsonld.register_namespace("dse-policy", POLICY_NS, crate::jsonld::DEFAULT_SCOPE);
        CatalogTransformer::new(jsonld, PolicyNamespace::new(POLICY_NS))
    }

    fn catalog_entry() -> Value {
        json!({
            "@id": "catalog-1",
            "@type": "dcat:Catalog",
            "dspace:participantId": "did:web:owner",
            "dcat:service": { "@id": "service-1", "dcat:endpointUrl": "https://owner.example.com/dsp" },
            "dcat:dataset": [
                {
                    "@id": "restricted-route-asset",
                    "odrl:hasPolicy": {
                        "@id": "offer-1",
                        "odrl:permission": {
                            "odrl:action": { "@id": "odrl:use" },
                            "odrl:constraint": {
                                "odrl:leftOperand": { "@id": "dse-policy:RestrictedDiscoveryClaim.$.DomainCredential.domain" },
                                "odrl:operator": { "@id": "odrl:eq" },
                                "odrl:rightOperand": "route"
                            }
                        }
                    }
                },
                { "@id": "open-asset" }
            ]
        })
    }

    #[test]
    fn transforms_a_full_catalog_entry() {
        let catalogs = transformer().transform_all(&[catalog_entry()]);

        assert_eq!(catalogs.len(), 1);
        let catalog = &catalogs[0];
        assert_eq!(catalog.id, "catalog-1");
        assert_eq!(catalog.participant_id.as_deref(), Some("did:web:owner"));
        assert_eq!(catalog.data_services.len(), 1);
        assert_eq!(
            catalog.data_services[0].endpoint_url.as_deref(),
            Some("https://owner.example.com/dsp")
        );
        assert_eq!(catalog.datasets.len(), 2);

        let restricted = &catalog.datasets[0];
        assert_eq!(restricted.id, "restricted-route-asset");
        let policy = restricted.offers.get("offer-1").unwrap();
        assert_eq!(policy.permissions.len(), 1);
        let permission = &policy.permissions[0];
        assert!(permission.action.is_use());
        match &permission.constraints[0] {
            Constraint::Atomic(atomic) => {
                assert_eq!(atomic.kind, ConstraintKind::RestrictedDiscovery);
                assert_eq!(
                    atomic.left_operand,
                    format!("{POLICY_NS}RestrictedDiscoveryClaim.$.DomainCredential.domain")
                );
                assert_eq!(atomic.operator, Operator::Eq);
                assert_eq!(atomic.right_operand, "route");
            }
            other => panic!("expected atomic constraint, got {other:?}"),
        }

        assert!(catalog.datasets[1].is_unrestricted());
    }

    #[test]
    fn preserves_unrecognized_top_level_properties() {
        let entry = json!({
            "@id": "catalog-1",
            "@type": "dcat:Catalog",
            "note": "maintained by did:web:participant"
        });

        let catalogs = transformer().transform_all(&[entry]);
        assert_eq!(
            catalogs[0].properties.get("note"),
            Some(&json!("maintained by did:web:participant"))
        );
        assert!(catalogs[0].properties.contains_key("@type"));
        assert!(!catalogs[0].properties.contains_key("@id"));
    }

    #[test]
    fn logical_constraint_groups_are_nested() {
        let entry = json!({
            "@id": "catalog-1",
            "dcat:dataset": {
                "@id": "restricted-and-asset",
                "odrl:hasPolicy": {
                    "odrl:permission": {
                        "odrl:action": { "@id": "odrl:use" },
                        "odrl:constraint": {
                            "odrl:and": [
                                {
                                    "odrl:leftOperand": { "@id": "dse-policy:Membership" },
                                    "odrl:operator": { "@id": "odrl:eq" },
                                    "odrl:rightOperand": "active"
                                },
                                {
                                    "odrl:leftOperand": { "@id": "dse-policy:RestrictedDiscoveryClaim.$.DomainCredential.domain" },
                                    "odrl:operator": { "@id": "odrl:eq" },
                                    "odrl:rightOperand": "travel"
                                }
                            ]
                        }
                    }
                }
            }
        });

        let catalogs = transformer().transform_all(&[entry]);
        let offers = &catalogs[0].datasets[0].offers;
        let policy = offers.values().next().unwrap();
        match &policy.permissions[0].constraints[0] {
            Constraint::And(branches) => assert_eq!(branches.len(), 2),
            other => panic!("expected and group, got {other:?}"),
        }
    }

    #[test]
    fn malformed_entries_are_skipped_not_fatal() {
        let entries = vec![
            json!("not an object"),
            json!({ "missing": "id" }),
            catalog_entry(),
        ];

        let catalogs = transformer().transform_all(&entries);
        assert_eq!(catalogs.len(), 1);
        assert_eq!(catalogs[0].id, "catalog-1");
    }

    #[test]
    fn malformed_dataset_skips_only_that_dataset() {
        let entry = json!({
            "@id": "catalog-1",
            "dcat:dataset": [
                { "no-id": true },
                { "@id": "open-asset" }
            ]
        });

        let catalogs = transformer().transform_all(&[entry]);
        assert_eq!(catalogs[0].datasets.len(), 1);
        assert_eq!(catalogs[0].datasets[0].id, "open-asset");
    }

    #[test]
    fn missing_permission_yields_empty_policy() {
        let entry = json!({
            "@id": "catalog-1",
            "dcat:dataset": {
                "@id": "asset",
                "odrl:hasPolicy": { "@id": "offer-1" }
            }
        });

        let catalogs = transformer().transform_all(&[entry]);
        let policy = catalogs[0].datasets[0].offers.get("offer-1").unwrap();
        assert!(policy.permissions.is_empty());
    }

    #[test]
    fn document_local_context_expands_policy_operands() {
        let entry = json!({
            "@id": "catalog-1",
            "@context": { "pol": POLICY_NS },
            "dcat:dataset": {
                "@id": "asset",
                "odrl:hasPolicy": {
                    "odrl:permission": {
                        "odrl:action": { "@id": "odrl:use" },
                        "odrl:constraint": {
                            "odrl:leftOperand": { "@id": "pol:Membership" },
                            "odrl:operator": { "@id": "odrl:eq" },
                            "odrl:rightOperand": "active"
                        }
                    }
                }
            }
        });

        let catalogs = transformer().transform_all(&[entry]);
        let policy = catalogs[0].datasets[0].offers.values().next().unwrap();
        match &policy.permissions[0].constraints[0] {
            Constraint::Atomic(atomic) => {
                assert_eq!(atomic.kind, ConstraintKind::Membership);
            }
            other => panic!("expected atomic constraint, got {other:?}"),
        }
    }
}
