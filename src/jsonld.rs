// SPDX-License-Identifier: AGPL-3.0-or-later

//! JSON-LD namespace registry and prefix expansion.
//!
//! Catalog responses arrive as compacted JSON-LD: keys and identifiers are
//! CURIEs (`odrl:permission`, `dcat:dataset`, ...) whose prefixes are declared
//! either in the document's own `@context` or in namespaces registered here at
//! startup. Expansion rewrites every prefixed key and every `@id`/`@type`
//! value to its full IRI so that downstream transformation can match on
//! stable IRIs. This is a prefix-expansion facility, not a full JSON-LD
//! processor; the catalog wire format never uses more than that.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

/// Scope under which namespaces apply to every expansion.
pub const DEFAULT_SCOPE: &str = "*";

/// DCAT namespace, used for `dcat:dataset` and `dcat:service`.
pub const DCAT_NS: &str = "http://www.w3.org/ns/dcat#";

/// ODRL namespace, used for policies, permissions and constraints.
pub const ODRL_NS: &str = "http://www.w3.org/ns/odrl/2/";

/// Dataspace protocol namespace, used for `dspace:participantId`.
pub const DSPACE_NS: &str = "https://w3id.org/dspace/v0.8/";

#[derive(Debug, Error)]
pub enum JsonLdError {
    #[error("cannot expand non-object JSON-LD value")]
    NotAnObject,
    #[error("invalid @context: expected an object mapping prefixes to namespace IRIs")]
    InvalidContext,
}

/// Process-wide namespace registry with per-scope prefix tables.
///
/// Configured once at startup and shared read-only afterwards.
#[derive(Debug, Default)]
pub struct JsonLd {
    // scope -> prefix -> namespace IRI
    namespaces: BTreeMap<String, BTreeMap<String, String>>,
}

impl JsonLd {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the namespaces the catalog wire format uses.
    pub fn with_default_namespaces() -> Self {
        let mut jsonld = Self::new();
        jsonld.register_namespace("dcat", DCAT_NS, DEFAULT_SCOPE);
        jsonld.register_namespace("odrl", ODRL_NS, DEFAULT_SCOPE);
        jsonld.register_namespace("dspace", DSPACE_NS, DEFAULT_SCOPE);
        jsonld
    }

    /// Register a namespace `prefix -> uri` binding for the given scope.
    pub fn register_namespace(
        &mut self,
        prefix: impl Into<String>,
        uri: impl Into<String>,
        scope: impl Into<String>,
    ) {
        self.namespaces
            .entry(scope.into())
            .or_default()
            .insert(prefix.into(), uri.into());
    }

    /// Expand a JSON-LD object using the default scope.
    pub fn expand(&self, value: &Value) -> Result<Value, JsonLdError> {
        self.expand_in_scope(value, DEFAULT_SCOPE)
    }

    /// Expand a JSON-LD object: resolve the document's `@context`, merge it
    /// over the namespaces registered for `scope`, then rewrite all prefixed
    /// keys and `@id`/`@type` values to full IRIs. The `@context` entry is
    /// consumed and not carried into the expanded form.
    pub fn expand_in_scope(&self, value: &Value, scope: &str) -> Result<Value, JsonLdError> {
        let object = value.as_object().ok_or(JsonLdError::NotAnObject)?;

        let mut context = self
            .namespaces
            .get(scope)
            .cloned()
            .unwrap_or_default();
        if scope != DEFAULT_SCOPE {
            if let Some(defaults) = self.namespaces.get(DEFAULT_SCOPE) {
                for (prefix, uri) in defaults {
                    context.entry(prefix.clone()).or_insert_with(|| uri.clone());
                }
            }
        }

        if let Some(local) = object.get("@context") {
            merge_local_context(local, &mut context)?;
        }

        let mut expanded = Map::new();
        for (key, entry) in object {
            if key == "@context" {
                continue;
            }
            expanded.insert(expand_term(key, &context), expand_value(entry, &context));
        }
        Ok(Value::Object(expanded))
    }
}

/// Merge a document-local `@context` into the active prefix table.
/// Document-local bindings take precedence over registered ones.
fn merge_local_context(
    local: &Value,
    context: &mut BTreeMap<String, String>,
) -> Result<(), JsonLdError> {
    match local {
        Value::Object(entries) => {
            for (prefix, uri) in entries {
                // Keyword entries like "@vocab" and embedded term definitions
                // are not prefix bindings; only string-valued entries count.
                if let Value::String(uri) = uri {
                    if !prefix.starts_with('@') {
                        context.insert(prefix.clone(), uri.clone());
                    }
                }
            }
            Ok(())
        }
        // Remote context IRIs cannot be dereferenced here; the known
        // vocabularies are preregistered, so a bare IRI adds nothing.
        Value::String(_) => Ok(()),
        Value::Array(parts) => {
            for part in parts {
                merge_local_context(part, context)?;
            }
            Ok(())
        }
        _ => Err(JsonLdError::InvalidContext),
    }
}

fn expand_value(value: &Value, context: &BTreeMap<String, String>) -> Value {
    match value {
        Value::Object(entries) => {
            let mut expanded = Map::new();
            for (key, entry) in entries {
                let expanded_entry = if key == "@id" || key == "@type" {
                    match entry {
                        Value::String(s) => Value::String(expand_term(s, context)),
                        other => expand_value(other, context),
                    }
                } else {
                    expand_value(entry, context)
                };
                expanded.insert(expand_term(key, context), expanded_entry);
            }
            Value::Object(expanded)
        }
        Value::Array(entries) => {
            Value::Array(entries.iter().map(|e| expand_value(e, context)).collect())
        }
        other => other.clone(),
    }
}

/// Expand a single CURIE against the prefix table; unprefixed terms and
/// unknown prefixes pass through unchanged.
pub fn expand_term(term: &str, context: &BTreeMap<String, String>) -> String {
    if let Some((prefix, local)) = term.split_once(':') {
        if let Some(namespace) = context.get(prefix) {
            return format!("{namespace}{local}");
        }
    }
    term.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_registered_prefixes_in_keys() {
        let jsonld = JsonLd::with_default_namespaces();
        let doc = json!({ "dcat:dataset": [], "dspace:participantId": "did:web:me" });

        let expanded = jsonld.expand(&doc).unwrap();

        assert!(expanded.get(format!("{DCAT_NS}dataset")).is_some());
        assert_eq!(
            expanded[format!("{DSPACE_NS}participantId")],
            json!("did:web:me")
        );
    }

    #[test]
    fn local_context_overrides_registered_namespaces() {
        let jsonld = JsonLd::with_default_namespaces();
        let doc = json!({
            "@context": { "dcat": "https://example.com/dcat/" },
            "dcat:dataset": []
        });

        let expanded = jsonld.expand(&doc).unwrap();

        assert!(expanded.get("https://example.com/dcat/dataset").is_some());
    }

    #[test]
    fn expands_id_and_type_values() {
        let jsonld = JsonLd::with_default_namespaces();
        let doc = json!({
            "odrl:action": { "@id": "odrl:use" }
        });

        let expanded = jsonld.expand(&doc).unwrap();

        assert_eq!(
            expanded[format!("{ODRL_NS}action")]["@id"],
            json!(format!("{ODRL_NS}use"))
        );
    }

    #[test]
    fn non_object_input_is_rejected() {
        let jsonld = JsonLd::with_default_namespaces();
        assert!(matches!(
            jsonld.expand(&json!("just a string")),
            Err(JsonLdError::NotAnObject)
        ));
        assert!(matches!(
            jsonld.expand(&json!(null)),
            Err(JsonLdError::NotAnObject)
        ));
    }

    #[test]
    fn numeric_context_is_invalid() {
        let jsonld = JsonLd::with_default_namespaces();
        let doc = json!({ "@context": 42, "dcat:dataset": [] });
        assert!(matches!(
            jsonld.expand(&doc),
            Err(JsonLdError::InvalidContext)
        ));
    }

    #[test]
    fn unknown_prefix_passes_through() {
        let jsonld = JsonLd::with_default_namespaces();
        let doc = json!({ "unknown:field": 1 });
        let expanded = jsonld.expand(&doc).unwrap();
        assert_eq!(expanded["unknown:field"], json!(1));
    }

    #[test]
    fn scoped_namespaces_fall_back_to_defaults() {
        let mut jsonld = JsonLd::with_default_namespaces();
        jsonld.register_namespace("pol", "https://example.com/policy/", "discovery");
        let doc = json!({ "pol:Membership": "active", "dcat:dataset": [] });

        let expanded = jsonld.expand_in_scope(&doc, "discovery").unwrap();

        assert!(expanded.get("https://example.com/policy/Membership").is_some());
        assert!(expanded.get(format!("{DCAT_NS}dataset")).is_some());
    }
}
