// SPDX-License-Identifier: AGPL-3.0-or-later

//! Identity service: token verification producing claim tokens.
//!
//! ## Verification Modes
//!
//! - **Production mode** (`JWT_SECRET` set): full HS256 signature
//!   verification plus expiry and scope checks.
//! - **Development mode** (no secret): claims are decoded without signature
//!   verification; expiry and scopes are still checked.

use std::collections::HashSet;

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

use super::claims::{ClaimToken, VC_CLAIM};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Opaque token as carried in the filter request body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenRepresentation {
    pub token: String,
}

/// Scope requirements a token must satisfy for a given operation.
#[derive(Debug, Clone, Default)]
pub struct VerificationContext {
    pub required_scopes: Vec<String>,
}

impl VerificationContext {
    pub fn with_scopes(scopes: impl IntoIterator<Item = String>) -> Self {
        Self {
            required_scopes: scopes.into_iter().collect(),
        }
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("token is malformed")]
    MalformedToken,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    TokenExpired,
    #[error("token is missing required scope '{0}'")]
    MissingScope(String),
    #[error("token verification failed: {0}")]
    Verification(String),
}

/// Verifies participant tokens into claim tokens.
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn verify_token(
        &self,
        token: &TokenRepresentation,
        context: &VerificationContext,
    ) -> Result<ClaimToken, IdentityError>;
}

/// Registered claims of a participant presentation token.
#[derive(Debug, Deserialize)]
struct PresentationClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    iss: Option<String>,
    #[serde(default)]
    exp: i64,
    /// Space-separated scope string.
    #[serde(default)]
    scope: Option<String>,
    /// Verifiable credential list.
    #[serde(default)]
    vc: Option<Value>,
}

/// JWT-backed [`IdentityService`].
pub struct JwtIdentityService {
    decoding_key: Option<DecodingKey>,
}

impl JwtIdentityService {
    /// Production mode: verify HS256 signatures with the shared secret.
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: Some(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    /// Development mode: decode claims without signature verification.
    pub fn insecure() -> Self {
        Self { decoding_key: None }
    }

    /// Build from an optional secret, logging which mode is active.
    pub fn from_secret(secret: Option<&str>) -> Self {
        match secret {
            Some(secret) => Self::new(secret),
            None => {
                tracing::warn!("no JWT secret configured, token signatures will not be verified");
                Self::insecure()
            }
        }
    }

    fn decode_claims(&self, token: &str) -> Result<PresentationClaims, IdentityError> {
        match &self.decoding_key {
            Some(key) => {
                let mut validation = Validation::new(Algorithm::HS256);
                validation.leeway = CLOCK_SKEW_LEEWAY;
                validation.validate_aud = false;

                let data = decode::<PresentationClaims>(token, key, &validation).map_err(|e| {
                    match e.kind() {
                        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                            IdentityError::TokenExpired
                        }
                        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                            IdentityError::InvalidSignature
                        }
                        _ => IdentityError::MalformedToken,
                    }
                })?;
                Ok(data.claims)
            }
            None => {
                let data = jsonwebtoken::dangerous::insecure_decode::<PresentationClaims>(token)
                    .map_err(|_| IdentityError::MalformedToken)?;
                let claims = data.claims;

                let now = chrono::Utc::now().timestamp();
                if claims.exp > 0 && claims.exp < now - CLOCK_SKEW_LEEWAY as i64 {
                    return Err(IdentityError::TokenExpired);
                }
                Ok(claims)
            }
        }
    }
}

#[async_trait]
impl IdentityService for JwtIdentityService {
    async fn verify_token(
        &self,
        token: &TokenRepresentation,
        context: &VerificationContext,
    ) -> Result<ClaimToken, IdentityError> {
        let claims = self.decode_claims(&token.token)?;

        let granted: HashSet<&str> = claims
            .scope
            .as_deref()
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default();
        for required in &context.required_scopes {
            if !granted.contains(required.as_str()) {
                return Err(IdentityError::MissingScope(required.clone()));
            }
        }

        let mut claim_token = ClaimToken::new();
        if let Some(sub) = claims.sub {
            claim_token = claim_token.with_claim("sub", Value::String(sub));
        }
        if let Some(iss) = claims.iss {
            claim_token = claim_token.with_claim("iss", Value::String(iss));
        }
        if let Some(vc) = claims.vc {
            claim_token = claim_token.with_claim(VC_CLAIM, vc);
        }
        Ok(claim_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        exp: i64,
        scope: String,
        vc: Value,
    }

    fn signed_token(secret: &str, exp: i64, scope: &str) -> TokenRepresentation {
        let claims = TestClaims {
            sub: "did:web:participant".to_string(),
            exp,
            scope: scope.to_string(),
            vc: json!([{ "type": "MembershipCredential", "credentialSubject": {} }]),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        TokenRepresentation { token }
    }

    fn far_future() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[tokio::test]
    async fn valid_token_yields_vc_claim() {
        let service = JwtIdentityService::new("secret");
        let token = signed_token("secret", far_future(), "a:read b:read");
        let context = VerificationContext::with_scopes(["a:read".to_string()]);

        let claims = service.verify_token(&token, &context).await.unwrap();

        assert!(claims.claim(VC_CLAIM).is_some());
        assert_eq!(claims.claim("sub"), Some(&json!("did:web:participant")));
    }

    #[tokio::test]
    async fn wrong_signature_is_rejected() {
        let service = JwtIdentityService::new("secret");
        let token = signed_token("other-secret", far_future(), "a:read");
        let context = VerificationContext::default();

        let result = service.verify_token(&token, &context).await;
        assert!(matches!(result, Err(IdentityError::InvalidSignature)));
    }

    #[tokio::test]
    async fn missing_scope_is_rejected() {
        let service = JwtIdentityService::new("secret");
        let token = signed_token("secret", far_future(), "a:read");
        let context = VerificationContext::with_scopes(["b:read".to_string()]);

        let result = service.verify_token(&token, &context).await;
        assert!(matches!(result, Err(IdentityError::MissingScope(scope)) if scope == "b:read"));
    }

    #[tokio::test]
    async fn expired_token_is_rejected_in_dev_mode() {
        let service = JwtIdentityService::insecure();
        let token = signed_token("anything", 1_000_000, "a:read");
        let context = VerificationContext::default();

        let result = service.verify_token(&token, &context).await;
        assert!(matches!(result, Err(IdentityError::TokenExpired)));
    }

    #[tokio::test]
    async fn dev_mode_ignores_signature() {
        let service = JwtIdentityService::insecure();
        let token = signed_token("anything", far_future(), "a:read");
        let context = VerificationContext::with_scopes(["a:read".to_string()]);

        assert!(service.verify_token(&token, &context).await.is_ok());
    }

    #[tokio::test]
    async fn garbage_token_is_malformed() {
        let service = JwtIdentityService::insecure();
        let token = TokenRepresentation {
            token: "not-a-jwt".to_string(),
        };

        let result = service.verify_token(&token, &VerificationContext::default()).await;
        assert!(matches!(result, Err(IdentityError::MalformedToken)));
    }
}
