// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup and never
//! mutated afterwards. Requests only ever see it behind an `Arc`.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTHORITY_DID` | DID of the catalog authority | Required |
//! | `CATALOG_SERVICE_TYPE` | DID service type of the catalog endpoint | `FederatedCatalogService` |
//! | `VC_SCOPE_ALIAS` | Scope alias prefix for credential read scopes | `org.eclipse.dse.vc.type` |
//! | `POLICY_NAMESPACE` | Namespace URI of policy constraint left operands | `https://w3id.org/dse/policy/` |
//! | `POLICY_PREFIX` | JSON-LD prefix registered for the policy namespace | `dse-policy` |
//! | `JWT_SECRET` | HS256 secret for token verification | Dev mode if unset |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `CATALOG_HTTP_TIMEOUT_SECS` | Timeout for DID/catalog HTTP calls | `30` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Environment variable name for the authority DID.
pub const AUTHORITY_DID_ENV: &str = "AUTHORITY_DID";

/// Environment variable name for the catalog DID service type.
pub const CATALOG_SERVICE_TYPE_ENV: &str = "CATALOG_SERVICE_TYPE";

/// Environment variable name for the credential scope alias.
pub const VC_SCOPE_ALIAS_ENV: &str = "VC_SCOPE_ALIAS";

/// Environment variable name for the policy constraint namespace URI.
pub const POLICY_NAMESPACE_ENV: &str = "POLICY_NAMESPACE";

/// Environment variable name for the policy namespace JSON-LD prefix.
pub const POLICY_PREFIX_ENV: &str = "POLICY_PREFIX";

/// Environment variable name for the HS256 token verification secret.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Environment variable name for the outbound HTTP timeout in seconds.
pub const HTTP_TIMEOUT_ENV: &str = "CATALOG_HTTP_TIMEOUT_SECS";

/// DID service type announcing the authority's federated catalog endpoint.
pub const DEFAULT_CATALOG_SERVICE_TYPE: &str = "FederatedCatalogService";

/// Default scope alias under which credential read scopes are issued.
pub const DEFAULT_VC_SCOPE_ALIAS: &str = "org.eclipse.dse.vc.type";

/// Default namespace URI for policy constraint left operands.
pub const DEFAULT_POLICY_NAMESPACE: &str = "https://w3id.org/dse/policy/";

/// Default JSON-LD prefix for the policy namespace.
pub const DEFAULT_POLICY_PREFIX: &str = "dse-policy";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Configuration error raised during startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required setting '{0}' is not set")]
    MissingRequired(&'static str),
    #[error("setting '{name}' has invalid value '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

/// Validated runtime configuration for the filter service.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// DID of the catalog authority whose DID document announces the
    /// federated catalog endpoint.
    pub authority_did: String,
    /// DID service type to look for in the authority's DID document.
    pub catalog_service_type: String,
    /// Scope alias prefix; read scopes are `<alias>:<CredentialType>:read`.
    pub vc_scope_alias: String,
    /// Namespace URI that policy constraint left operands are rooted in.
    pub policy_namespace: String,
    /// JSON-LD prefix registered for [`FilterConfig::policy_namespace`].
    pub policy_prefix: String,
    /// HS256 secret for token verification. `None` enables dev mode, which
    /// decodes tokens without signature verification.
    pub jwt_secret: Option<String>,
    /// Timeout applied to DID resolution and catalog fetch requests.
    pub http_timeout: Duration,
}

impl FilterConfig {
    /// Load the configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let authority_did = env::var(AUTHORITY_DID_ENV)
            .map_err(|_| ConfigError::MissingRequired(AUTHORITY_DID_ENV))?;
        if authority_did.trim().is_empty() {
            return Err(ConfigError::MissingRequired(AUTHORITY_DID_ENV));
        }

        let http_timeout_secs = match env::var(HTTP_TIMEOUT_ENV) {
            Ok(raw) => raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                name: HTTP_TIMEOUT_ENV,
                value: raw,
            })?,
            Err(_) => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            authority_did,
            catalog_service_type: env::var(CATALOG_SERVICE_TYPE_ENV)
                .unwrap_or_else(|_| DEFAULT_CATALOG_SERVICE_TYPE.to_string()),
            vc_scope_alias: env::var(VC_SCOPE_ALIAS_ENV)
                .unwrap_or_else(|_| DEFAULT_VC_SCOPE_ALIAS.to_string()),
            policy_namespace: env::var(POLICY_NAMESPACE_ENV)
                .unwrap_or_else(|_| DEFAULT_POLICY_NAMESPACE.to_string()),
            policy_prefix: env::var(POLICY_PREFIX_ENV)
                .unwrap_or_else(|_| DEFAULT_POLICY_PREFIX.to_string()),
            jwt_secret: env::var(JWT_SECRET_ENV).ok(),
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }

    /// Configuration for tests: fixed authority DID, dev-mode tokens.
    pub fn for_tests(authority_did: impl Into<String>) -> Self {
        Self {
            authority_did: authority_did.into(),
            catalog_service_type: DEFAULT_CATALOG_SERVICE_TYPE.to_string(),
            vc_scope_alias: DEFAULT_VC_SCOPE_ALIAS.to_string(),
            policy_namespace: DEFAULT_POLICY_NAMESPACE.to_string(),
            policy_prefix: DEFAULT_POLICY_PREFIX.to_string(),
            jwt_secret: None,
            http_timeout: Duration::from_secs(5),
        }
    }
}
