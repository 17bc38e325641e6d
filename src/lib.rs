// SPDX-License-Identifier: AGPL-3.0-or-later

//! Credential-gated federated catalog filter service.
//!
//! Fetches the federated catalog from a remote authority, located through
//! DID document resolution, and returns only the datasets whose ODRL usage
//! policies the requesting participant's verifiable credentials satisfy.

pub mod api;
pub mod catalog;
pub mod config;
pub mod did;
pub mod error;
pub mod identity;
pub mod jsonld;
pub mod policy;
pub mod state;
