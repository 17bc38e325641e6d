// SPDX-License-Identifier: AGPL-3.0-or-later

//! The filtering pipeline: locate, fetch, transform, evaluate.

use std::sync::Arc;

use super::fetch::{CatalogError, CatalogSource};
use super::model::{Catalog, Dataset};
use super::transform::CatalogTransformer;
use crate::did::AuthorityLocator;
use crate::identity::ClaimToken;
use crate::policy::{discovery_context, PolicyContext, PolicyEngine};

/// Fetches the federated catalog from the authority and filters it down to
/// the datasets the requesting participant's credentials allow.
///
/// Stateless across requests; every invocation resolves, fetches and
/// evaluates from scratch.
pub struct FederatedCatalogService {
    locator: AuthorityLocator,
    source: Arc<dyn CatalogSource>,
    transformer: CatalogTransformer,
    engine: Arc<PolicyEngine>,
}

impl FederatedCatalogService {
    pub fn new(
        locator: AuthorityLocator,
        source: Arc<dyn CatalogSource>,
        transformer: CatalogTransformer,
        engine: Arc<PolicyEngine>,
    ) -> Self {
        Self {
            locator,
            source,
            transformer,
            engine,
        }
    }

    /// Produce the filtered catalog collection for one participant.
    ///
    /// Catalogs mentioning the participant's DID in their top-level string
    /// properties are returned unmodified. All other catalogs keep exactly
    /// the datasets whose every offer evaluates successfully; datasets
    /// without offers are always kept. Emptied catalog shells stay in the
    /// result.
    pub async fn fetch_and_filter_catalog(
        &self,
        claims: &ClaimToken,
        participant_did: &str,
    ) -> Result<Vec<Catalog>, CatalogError> {
        let mut context = discovery_context(claims);

        let endpoint = self.locator.catalog_endpoint().await?;
        let entries = self.source.fetch(&endpoint).await?;
        if entries.is_empty() {
            tracing::warn!("catalog source returned no entries");
            return Ok(Vec::new());
        }

        let catalogs = self.transformer.transform_all(&entries);

        let filtered = catalogs
            .into_iter()
            .map(|catalog| {
                if catalog.mentions(participant_did) {
                    tracing::debug!(catalog = %catalog.id, "self-visibility override, catalog kept unmodified");
                    return catalog;
                }
                let datasets = catalog
                    .datasets
                    .iter()
                    .filter(|dataset| self.dataset_visible(dataset, &mut context))
                    .cloned()
                    .collect();
                catalog.with_datasets(datasets)
            })
            .collect();

        Ok(filtered)
    }

    /// A dataset is visible iff every offered policy evaluates successfully.
    fn dataset_visible(&self, dataset: &Dataset, context: &mut PolicyContext) -> bool {
        if dataset.is_unrestricted() {
            return true;
        }
        dataset.offers.iter().all(|(offer_id, policy)| {
            match self.engine.evaluate(policy, context) {
                Ok(()) => true,
                Err(failure) => {
                    tracing::debug!(
                        dataset = %dataset.id,
                        offer = %offer_id,
                        problems = ?failure.problems,
                        "policy evaluation failed, dataset excluded"
                    );
                    false
                }
            }
        })
    }
}
