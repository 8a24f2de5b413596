use async_trait::async_trait;
use chrono::NaiveDate;
use farelink_core::search::{CabinClass, SearchRequest};
use farelink_core::{MarketplaceApi, ProviderError, ProviderResult};
use farelink_shared::wire::{
    DataEnvelope, Paginated, PassengerInput, PaymentInput, RawOffer, WireAirline, WireOrder,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::app_config::ProviderConfig;
use crate::pagination::collect_pages;

/// Bearer-authenticated client for the upstream flight marketplace.
///
/// Two-phase lifecycle: `new` always succeeds, even with no credential, so
/// wiring this into a process that never uses it cannot crash. Every public
/// operation goes through `ensure_ready`, the only path that can fail with a
/// configuration error. No operation retries automatically.
pub struct ProviderClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl ProviderClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Credential check deferred to first use.
    fn ensure_ready(&self) -> ProviderResult<&str> {
        match self.config.api_token.as_deref() {
            Some(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(ProviderError::Configuration(
                "Marketplace API token is not configured".to_string(),
            )),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_seconds)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ProviderResult<T> {
        let token = self.ensure_ready()?;
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(token)
            .timeout(self.timeout())
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Upstream(e.to_string()))?;
        Self::decode(response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ProviderResult<T> {
        let token = self.ensure_ready()?;
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(token)
            .timeout(self.timeout())
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Upstream(e.to_string()))?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ProviderResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Upstream(e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::Upstream(upstream_message(status, &body)));
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }

    async fn fetch_offers_page(
        &self,
        request_id: &str,
        after: Option<String>,
    ) -> ProviderResult<Paginated<RawOffer>> {
        let mut query = vec![
            ("offer_request_id", request_id.to_string()),
            ("limit", self.config.page_limit.to_string()),
        ];
        if let Some(cursor) = after {
            query.push(("after", cursor));
        }
        self.get_json("/air/offers", &query).await
    }

    async fn fetch_airlines_page(
        &self,
        after: Option<String>,
    ) -> ProviderResult<Paginated<WireAirline>> {
        let mut query = vec![("limit", self.config.page_limit.to_string())];
        if let Some(cursor) = after {
            query.push(("after", cursor));
        }
        self.get_json("/air/airlines", &query).await
    }
}

#[async_trait]
impl MarketplaceApi for ProviderClient {
    async fn search_offers(&self, request: &SearchRequest) -> ProviderResult<Vec<RawOffer>> {
        let body = offer_request_body(request);
        let created: DataEnvelope<OfferRequestCreated> = self
            .post_json(
                "/air/offer_requests?return_offers=false",
                &DataEnvelope { data: body },
            )
            .await?;
        let request_id = created.data.id;
        debug!(%request_id, origin = %request.origin, destination = %request.destination, "Offer request created, listing offers");

        collect_pages(self.config.page_cap, |after| {
            self.fetch_offers_page(&request_id, after)
        })
        .await
    }

    async fn list_airlines(&self) -> ProviderResult<Vec<WireAirline>> {
        collect_pages(self.config.page_cap, |after| self.fetch_airlines_page(after)).await
    }

    async fn get_airline(&self, code: &str) -> ProviderResult<WireAirline> {
        let query = vec![("iata_code", code.to_string()), ("limit", "1".to_string())];
        let page: Paginated<WireAirline> = self.get_json("/air/airlines", &query).await?;
        page.data
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Upstream(format!("Airline {} not found upstream", code)))
    }

    async fn airlines_by_codes(&self, codes: &[String]) -> ProviderResult<Vec<WireAirline>> {
        let mut query: Vec<(&str, String)> = codes
            .iter()
            .map(|code| ("iata_codes[]", code.clone()))
            .collect();
        query.push(("limit", codes.len().max(1).to_string()));
        let page: Paginated<WireAirline> = self.get_json("/air/airlines", &query).await?;
        Ok(page.data)
    }

    async fn create_order(
        &self,
        offer_id: &str,
        passengers: &[PassengerInput],
        payment: &PaymentInput,
    ) -> ProviderResult<WireOrder> {
        // Non-idempotent: a blind retry risks a double booking, so any
        // failure is surfaced to the caller unmodified.
        let body = DataEnvelope {
            data: OrderBody {
                selected_offers: vec![offer_id],
                passengers,
                payments: vec![payment],
            },
        };
        let order: DataEnvelope<WireOrder> = self.post_json("/air/orders", &body).await?;
        Ok(order.data)
    }

    async fn get_order(&self, order_id: &str) -> ProviderResult<WireOrder> {
        let order: DataEnvelope<WireOrder> = self
            .get_json(&format!("/air/orders/{}", order_id), &[])
            .await?;
        Ok(order.data)
    }

    async fn cancel_order(&self, order_id: &str) -> bool {
        let body = DataEnvelope {
            data: OrderCancellationBody { order_id },
        };
        match self
            .post_json::<DataEnvelope<serde_json::Value>, _>("/air/order_cancellations", &body)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(order_id, error = %e, "Order cancellation failed");
                false
            }
        }
    }
}

/// Parse the marketplace error envelope, keeping the upstream message when
/// it is decodable and falling back to the bare HTTP status otherwise.
fn upstream_message(status: reqwest::StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        errors: Vec<ErrorDetail>,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        title: Option<String>,
        message: Option<String>,
    }

    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if let Some(detail) = envelope.errors.into_iter().next() {
            if let Some(message) = detail.message.or(detail.title) {
                return format!("{} ({})", message, status);
            }
        }
    }
    format!("HTTP {}", status)
}

fn offer_request_body(request: &SearchRequest) -> OfferRequestBody<'_> {
    let mut slices = vec![OfferRequestSlice {
        origin: &request.origin,
        destination: &request.destination,
        departure_date: request.departure_date,
    }];
    // Return slice only for round trips
    if let Some(return_date) = request.return_date {
        slices.push(OfferRequestSlice {
            origin: &request.destination,
            destination: &request.origin,
            departure_date: return_date,
        });
    }

    let mut passengers = Vec::new();
    for _ in 0..request.adults {
        passengers.push(PassengerSpec { passenger_type: "adult" });
    }
    for _ in 0..request.children {
        passengers.push(PassengerSpec { passenger_type: "child" });
    }
    for _ in 0..request.infants {
        passengers.push(PassengerSpec {
            passenger_type: "infant_without_seat",
        });
    }

    OfferRequestBody {
        slices,
        passengers,
        cabin_class: request.cabin_class,
        max_connections: request.max_connections,
    }
}

#[derive(Debug, Serialize)]
struct OfferRequestBody<'a> {
    slices: Vec<OfferRequestSlice<'a>>,
    passengers: Vec<PassengerSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cabin_class: Option<CabinClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_connections: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OfferRequestSlice<'a> {
    origin: &'a str,
    destination: &'a str,
    departure_date: NaiveDate,
}

#[derive(Debug, Serialize)]
struct PassengerSpec {
    #[serde(rename = "type")]
    passenger_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct OfferRequestCreated {
    id: String,
}

#[derive(Debug, Serialize)]
struct OrderBody<'a> {
    selected_offers: Vec<&'a str>,
    passengers: &'a [PassengerInput],
    payments: Vec<&'a PaymentInput>,
}

#[derive(Debug, Serialize)]
struct OrderCancellationBody<'a> {
    order_id: &'a str,
}
