use async_trait::async_trait;
use farelink_shared::wire::{
    PassengerInput, PaymentInput, RawOffer, WireAirline, WireOrder,
};

use crate::search::SearchRequest;
use crate::ProviderResult;

/// Boundary to the upstream flight marketplace.
///
/// The engine and the airline cache program against this trait so tests can
/// substitute synthetic upstreams. The production implementation lives in
/// `farelink-provider`.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// Run one offer search and return the complete result set.
    /// Pagination is handled internally; callers never see partial pages.
    async fn search_offers(&self, request: &SearchRequest) -> ProviderResult<Vec<RawOffer>>;

    /// Full airline listing, cursor-paginated internally.
    async fn list_airlines(&self) -> ProviderResult<Vec<WireAirline>>;

    /// Single airline lookup by IATA code.
    async fn get_airline(&self, code: &str) -> ProviderResult<WireAirline>;

    /// Batched airline lookup for one chunk of codes. Used only by the
    /// metadata cache's refresh path.
    async fn airlines_by_codes(&self, codes: &[String]) -> ProviderResult<Vec<WireAirline>>;

    /// Create an order for an offer. Non-idempotent; never retried.
    async fn create_order(
        &self,
        offer_id: &str,
        passengers: &[PassengerInput],
        payment: &PaymentInput,
    ) -> ProviderResult<WireOrder>;

    async fn get_order(&self, order_id: &str) -> ProviderResult<WireOrder>;

    /// Best-effort cancellation; false on any failure rather than an error.
    async fn cancel_order(&self, order_id: &str) -> bool;
}
