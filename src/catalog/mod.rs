// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Catalog Module
//!
//! Fetching, transforming and filtering the federated catalog. The
//! [`filter::FederatedCatalogService`] orchestrates the pipeline: locate the
//! authority's catalog endpoint through DID resolution, fetch the raw
//! JSON-LD entries, transform them into typed catalogs, then evaluate every
//! dataset's offers against the participant's credentials.

pub mod fetch;
pub mod filter;
pub mod model;
pub mod transform;

pub use fetch::{CatalogError, CatalogSource, HttpCatalogSource};
pub use filter::FederatedCatalogService;
pub use model::{Catalog, DataService, Dataset, ModelError};
pub use transform::{CatalogTransformer, TransformError};
