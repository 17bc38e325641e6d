// SPDX-License-Identifier: AGPL-3.0-or-later

//! Shared application state.
//!
//! Everything in here is built once at startup and shared read-only across
//! request handlers. The policy engine's registrations (scope bindings,
//! constraint functions, post validators) happen exactly once, in
//! [`AppState::new`], before the server accepts traffic.

use std::sync::Arc;

use crate::catalog::{CatalogTransformer, FederatedCatalogService, HttpCatalogSource};
use crate::config::FilterConfig;
use crate::did::{AuthorityLocator, WebDidResolver};
use crate::identity::{JwtIdentityService, TokenValidator};
use crate::jsonld::{JsonLd, DEFAULT_SCOPE};
use crate::policy::{
    ConstraintKind, CredentialClaimConstraintFunction, DeclaredPermissionsValidator,
    MembershipConstraintFunction, PolicyEngine, PolicyNamespace, RuleBindings, Scope,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<FilterConfig>,
    pub validator: Arc<TokenValidator>,
    pub catalog: Arc<FederatedCatalogService>,
}

impl AppState {
    /// Wire the full filtering pipeline from configuration.
    pub fn new(config: FilterConfig, client: reqwest::Client) -> Self {
        let namespace = PolicyNamespace::new(&config.policy_namespace);

        let mut engine = PolicyEngine::new(RuleBindings::catalog_defaults());
        engine.register_function(
            ConstraintKind::Membership,
            Arc::new(MembershipConstraintFunction),
        );
        engine.register_function(
            ConstraintKind::RestrictedDiscovery,
            Arc::new(CredentialClaimConstraintFunction::new(
                namespace.restricted_discovery_operand(),
            )),
        );
        engine.register_function(
            ConstraintKind::GenericClaim,
            Arc::new(CredentialClaimConstraintFunction::new(
                namespace.generic_claim_operand(),
            )),
        );
        engine.register_post_validator(
            Scope::CatalogDiscovery,
            Arc::new(DeclaredPermissionsValidator),
        );

        let mut jsonld = JsonLd::with_default_namespaces();
        jsonld.register_namespace(
            &config.policy_prefix,
            &config.policy_namespace,
            DEFAULT_SCOPE,
        );

        let locator = AuthorityLocator::new(
            Arc::new(WebDidResolver::new(client.clone())),
            &config.authority_did,
            &config.catalog_service_type,
        );

        let catalog = FederatedCatalogService::new(
            locator,
            Arc::new(HttpCatalogSource::new(client)),
            CatalogTransformer::new(jsonld, namespace),
            Arc::new(engine),
        );

        let identity = JwtIdentityService::from_secret(config.jwt_secret.as_deref());
        let validator = TokenValidator::new(Arc::new(identity), &config.vc_scope_alias);

        Self::with_components(config, validator, catalog)
    }

    /// Assemble state from prebuilt components, bypassing the default
    /// wiring. Used by tests that substitute collaborators.
    pub fn with_components(
        config: FilterConfig,
        validator: TokenValidator,
        catalog: FederatedCatalogService,
    ) -> Self {
        Self {
            config: Arc::new(config),
            validator: Arc::new(validator),
            catalog: Arc::new(catalog),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_wires_from_test_config() {
        let state = AppState::new(
            FilterConfig::for_tests("did:web:authority"),
            reqwest::Client::new(),
        );
        assert_eq!(state.config.authority_did, "did:web:authority");
    }
}
