// SPDX-License-Identifier: AGPL-3.0-or-later

//! Boundary validator requiring the discovery credential read scopes.

use std::sync::Arc;

use super::claims::ClaimToken;
use super::service::{IdentityError, IdentityService, TokenRepresentation, VerificationContext};

/// Credential types whose read scopes are required for catalog discovery.
const DISCOVERY_CREDENTIAL_TYPES: [&str; 2] = ["MembershipCredential", "DomainCredential"];

/// Validates inbound filter-request tokens before any catalog work happens.
///
/// A token must verify and carry the read scopes for all discovery
/// credential types; anything else fails the request at the HTTP boundary.
pub struct TokenValidator {
    identity: Arc<dyn IdentityService>,
    context: VerificationContext,
}

impl TokenValidator {
    pub fn new(identity: Arc<dyn IdentityService>, vc_scope_alias: &str) -> Self {
        let scopes = DISCOVERY_CREDENTIAL_TYPES
            .iter()
            .map(|credential_type| format!("{vc_scope_alias}:{credential_type}:read"));
        Self {
            identity,
            context: VerificationContext::with_scopes(scopes),
        }
    }

    /// Verify the token under the discovery scopes. Failures are logged at
    /// warning level and short-circuit the request; there is no retry.
    pub async fn validate(
        &self,
        token: &TokenRepresentation,
    ) -> Result<ClaimToken, IdentityError> {
        self.identity
            .verify_token(token, &self.context)
            .await
            .inspect_err(|e| tracing::warn!("token validation failed: {e}"))
    }
}
