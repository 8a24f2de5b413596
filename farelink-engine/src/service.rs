use chrono::NaiveDate;
use farelink_core::search::SearchRequest;
use farelink_core::{MarketplaceApi, ProviderError};
use farelink_shared::airline::AirlineSummary;
use farelink_shared::criteria::FilterCriteria;
use farelink_shared::flight::NormalizedFlight;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::airline_cache::AirlineCache;
use crate::filters::{apply_filters, sort_flights};
use crate::normalize::normalize_offers;

/// Tag identifying which backend produced a result set.
pub const MARKETPLACE_SOURCE: &str = "marketplace";

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The upstream search itself failed. Distinct from an empty result,
    /// which is a successful response; the UI renders this as retryable.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub search_id: Uuid,
    pub flights: Vec<NormalizedFlight>,
    pub count: usize,
    /// Offers rejected by structural validation, reported for observability.
    pub dropped: usize,
    pub source: String,
}

/// Caller-facing facade over the full pipeline: provider fetch, airline
/// cache warm-up, normalization, filtering, sorting.
pub struct SearchService {
    api: Arc<dyn MarketplaceApi>,
    cache: Arc<AirlineCache>,
}

impl SearchService {
    pub fn new(api: Arc<dyn MarketplaceApi>, cache: Arc<AirlineCache>) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &Arc<AirlineCache> {
        &self.cache
    }

    /// Run one search. Zero survivors after filtering is a successful empty
    /// response, not an error.
    pub async fn search(
        &self,
        request: &SearchRequest,
        criteria: &FilterCriteria,
    ) -> Result<SearchResponse, EngineError> {
        let request = request.with_normalized_codes();
        let offers = self.api.search_offers(&request).await?;
        debug!(offers = offers.len(), origin = %request.origin, destination = %request.destination, "Marketplace returned offers");

        // Carrier display data embedded in the results is free; harvest it
        // before normalization consults the cache.
        self.cache.warm_from_offers(&offers).await;

        let outcome = normalize_offers(&offers, &self.cache).await;
        let mut flights = apply_filters(outcome.flights, criteria);
        if let Some(key) = criteria.sort {
            sort_flights(&mut flights, key);
        }

        info!(
            count = flights.len(),
            dropped = outcome.dropped,
            "Search pipeline complete"
        );

        Ok(SearchResponse {
            search_id: Uuid::new_v4(),
            count: flights.len(),
            flights,
            dropped: outcome.dropped,
            source: MARKETPLACE_SOURCE.to_string(),
        })
    }

    /// Distinct airlines flying a route on a date, resolved through the
    /// metadata cache and sorted by code.
    pub async fn airlines_for_route(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
    ) -> Result<Vec<AirlineSummary>, EngineError> {
        let request = SearchRequest::one_way(origin, destination, date, 1).with_normalized_codes();
        let offers = self.api.search_offers(&request).await?;
        self.cache.warm_from_offers(&offers).await;

        let codes: Vec<String> = AirlineCache::extract_airline_codes(&offers)
            .into_iter()
            .collect();
        let airlines = self.cache.get_airlines(&codes).await;
        Ok(airlines.iter().map(AirlineSummary::from).collect())
    }
}
