// SPDX-License-Identifier: AGPL-3.0-or-later

//! Constraint classification and scope bindings.
//!
//! Constraint left operands are rooted in a configurable policy namespace
//! (`<ns>Membership`, `<ns>RestrictedDiscoveryClaim.$...`, ...). They are
//! classified into a [`ConstraintKind`] once, when the catalog is
//! transformed; which kinds apply in which evaluation scope is a fixed
//! lookup table built at startup. The evaluation hot path never parses
//! strings.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::model::ODRL_USE_ACTION;

/// Named policy evaluation scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Scope {
    /// Filtering the federated catalog for a discovering participant.
    CatalogDiscovery,
    /// Serving a participant's own catalog.
    Catalog,
    /// Contract negotiation.
    Negotiation,
    /// Transfer processes.
    Transfer,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::CatalogDiscovery => "catalog.discovery",
            Scope::Catalog => "catalog",
            Scope::Negotiation => "contract.negotiation",
            Scope::Transfer => "transfer.process",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified constraint type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConstraintKind {
    /// `<ns>Membership`: requires an active membership credential.
    Membership,
    /// `<ns>GenericClaim...`: dotted credential-claim comparison, contract
    /// scopes only.
    GenericClaim,
    /// `<ns>RestrictedDiscoveryClaim...`: dotted credential-claim comparison
    /// gating discovery.
    RestrictedDiscovery,
    /// Left operand outside the policy namespace; never bound to any scope.
    Unknown,
}

/// The configured policy namespace, and the operand classification it
/// implies.
#[derive(Debug, Clone)]
pub struct PolicyNamespace {
    namespace: String,
}

impl PolicyNamespace {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn membership_operand(&self) -> String {
        format!("{}Membership", self.namespace)
    }

    pub fn generic_claim_operand(&self) -> String {
        format!("{}GenericClaim", self.namespace)
    }

    pub fn restricted_discovery_operand(&self) -> String {
        format!("{}RestrictedDiscoveryClaim", self.namespace)
    }

    /// Classify an expanded left operand into its constraint kind.
    pub fn classify(&self, left_operand: &str) -> ConstraintKind {
        if left_operand.eq_ignore_ascii_case(&self.membership_operand()) {
            ConstraintKind::Membership
        } else if left_operand.starts_with(&self.restricted_discovery_operand()) {
            ConstraintKind::RestrictedDiscovery
        } else if left_operand.starts_with(&self.generic_claim_operand()) {
            ConstraintKind::GenericClaim
        } else {
            ConstraintKind::Unknown
        }
    }
}

/// Lookup table from constraint kinds and action IRIs to the scopes they are
/// bound in. Built once at startup, read-only afterwards.
#[derive(Debug, Default)]
pub struct RuleBindings {
    constraint_scopes: HashMap<ConstraintKind, HashSet<Scope>>,
    action_scopes: HashMap<String, HashSet<Scope>>,
}

impl RuleBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard bindings of this deployment: membership constraints
    /// apply everywhere, generic claim constraints only during contract
    /// scopes, restricted discovery constraints in discovery and contract
    /// scopes, and the ODRL `use` action in all scopes.
    pub fn catalog_defaults() -> Self {
        const ALL_SCOPES: [Scope; 4] = [
            Scope::CatalogDiscovery,
            Scope::Catalog,
            Scope::Negotiation,
            Scope::Transfer,
        ];

        let mut bindings = Self::new();
        bindings.bind_constraint(ConstraintKind::Membership, ALL_SCOPES);
        bindings.bind_constraint(
            ConstraintKind::GenericClaim,
            [Scope::Negotiation, Scope::Transfer],
        );
        bindings.bind_constraint(
            ConstraintKind::RestrictedDiscovery,
            [Scope::CatalogDiscovery, Scope::Negotiation, Scope::Transfer],
        );
        for scope in ALL_SCOPES {
            bindings.bind_action(ODRL_USE_ACTION, scope);
        }
        bindings
    }

    pub fn bind_constraint(
        &mut self,
        kind: ConstraintKind,
        scopes: impl IntoIterator<Item = Scope>,
    ) {
        self.constraint_scopes
            .entry(kind)
            .or_default()
            .extend(scopes);
    }

    pub fn bind_action(&mut self, action_type: impl Into<String>, scope: Scope) {
        self.action_scopes
            .entry(action_type.into())
            .or_default()
            .insert(scope);
    }

    pub fn is_constraint_bound(&self, kind: ConstraintKind, scope: Scope) -> bool {
        self.constraint_scopes
            .get(&kind)
            .is_some_and(|scopes| scopes.contains(&scope))
    }

    pub fn is_action_bound(&self, action_type: &str, scope: Scope) -> bool {
        self.action_scopes
            .get(action_type)
            .is_some_and(|scopes| scopes.contains(&scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namespace() -> PolicyNamespace {
        PolicyNamespace::new("https://w3id.org/dse/policy/")
    }

    #[test]
    fn classifies_membership_case_insensitively() {
        assert_eq!(
            namespace().classify("https://w3id.org/dse/policy/Membership"),
            ConstraintKind::Membership
        );
        assert_eq!(
            namespace().classify("https://w3id.org/dse/policy/membership"),
            ConstraintKind::Membership
        );
    }

    #[test]
    fn classifies_prefixed_operands() {
        assert_eq!(
            namespace()
                .classify("https://w3id.org/dse/policy/RestrictedDiscoveryClaim.$.DomainCredential.domain"),
            ConstraintKind::RestrictedDiscovery
        );
        assert_eq!(
            namespace().classify("https://w3id.org/dse/policy/GenericClaim.$.SomeCredential.x"),
            ConstraintKind::GenericClaim
        );
    }

    #[test]
    fn foreign_operands_are_unknown() {
        assert_eq!(
            namespace().classify("https://other.example.com/Whatever"),
            ConstraintKind::Unknown
        );
    }

    #[test]
    fn default_bindings_scope_constraints() {
        let bindings = RuleBindings::catalog_defaults();

        assert!(bindings.is_constraint_bound(ConstraintKind::Membership, Scope::CatalogDiscovery));
        assert!(bindings.is_constraint_bound(ConstraintKind::Membership, Scope::Transfer));
        assert!(bindings
            .is_constraint_bound(ConstraintKind::RestrictedDiscovery, Scope::CatalogDiscovery));
        assert!(!bindings.is_constraint_bound(ConstraintKind::GenericClaim, Scope::CatalogDiscovery));
        assert!(bindings.is_constraint_bound(ConstraintKind::GenericClaim, Scope::Negotiation));
        assert!(!bindings.is_constraint_bound(ConstraintKind::Unknown, Scope::CatalogDiscovery));
    }

    #[test]
    fn use_action_bound_in_all_scopes() {
        let bindings = RuleBindings::catalog_defaults();
        for scope in [
            Scope::CatalogDiscovery,
            Scope::Catalog,
            Scope::Negotiation,
            Scope::Transfer,
        ] {
            assert!(bindings.is_action_bound(ODRL_USE_ACTION, scope));
        }
        assert!(!bindings.is_action_bound("custom:share", Scope::CatalogDiscovery));
    }
}
