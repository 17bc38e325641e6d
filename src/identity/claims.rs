// SPDX-License-Identifier: AGPL-3.0-or-later

//! Claim token and verifiable credential representations.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Claim key under which the verifiable credential list is stored.
pub const VC_CLAIM: &str = "vc";

/// A verified set of claims extracted from a participant token.
///
/// For catalog filtering the only claim that matters is [`VC_CLAIM`], a JSON
/// array of verifiable credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimToken {
    claims: HashMap<String, Value>,
}

impl ClaimToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_claim(mut self, name: impl Into<String>, value: Value) -> Self {
        self.claims.insert(name.into(), value);
        self
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }
}

/// A verifiable credential as carried in the `vc` claim.
///
/// Only the fields policy evaluation reads are modeled; issuer and proof
/// verification happen upstream in the identity infrastructure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerifiableCredential {
    /// Credential type(s). The wire form allows a single string or a list.
    #[serde(rename = "type", deserialize_with = "one_or_many")]
    pub types: Vec<String>,
    /// Subject(s) the credential makes claims about.
    #[serde(rename = "credentialSubject", deserialize_with = "one_or_many")]
    pub credential_subject: Vec<CredentialSubject>,
    /// Credential issuer identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

impl VerifiableCredential {
    /// Whether any declared type ends with `type_suffix`. Credential types on
    /// the wire may be full IRIs, so matching is on the suffix.
    pub fn has_type(&self, type_suffix: &str) -> bool {
        self.types.iter().any(|t| t.ends_with(type_suffix))
    }
}

/// The subject claims of a verifiable credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CredentialSubject {
    #[serde(default, rename = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub claims: serde_json::Map<String, Value>,
}

/// Accept either a single value or a list of values.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        One(T),
        Many(Vec<T>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}
