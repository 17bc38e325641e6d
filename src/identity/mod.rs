// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Identity Module
//!
//! Token verification for the catalog filter API.
//!
//! ## Flow
//!
//! 1. A participant obtains a credential presentation token from its own
//!    identity infrastructure and sends it in the filter request body.
//! 2. This service verifies the token under the discovery read scopes
//!    (`<alias>:MembershipCredential:read`, `<alias>:DomainCredential:read`).
//! 3. The verified claims, most importantly the `vc` claim holding the
//!    participant's verifiable credentials, feed policy evaluation.
//!
//! Verification failures never proceed to catalog fetching.

pub mod claims;
pub mod service;
pub mod validator;

pub use claims::{ClaimToken, CredentialSubject, VerifiableCredential, VC_CLAIM};
pub use service::{
    IdentityError, IdentityService, JwtIdentityService, TokenRepresentation, VerificationContext,
};
pub use validator::TokenValidator;
