use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ============================================================================
// Marketplace wire models (upstream-owned shapes, read-only on our side)
// ============================================================================

/// A priced, bookable flight proposal as returned by the marketplace.
/// Never mutated; read once per normalization pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOffer {
    pub id: String,
    pub owner: Option<CarrierRef>,
    #[serde(default)]
    pub slices: Vec<RawSlice>,
    pub total_amount: String,
    pub total_currency: String,
    #[serde(default)]
    pub expires_at: Option<NaiveDateTime>,
}

/// One directional itinerary leg of an offer (outbound or return).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSlice {
    pub origin: WirePlace,
    pub destination: WirePlace,
    /// ISO-8601 style duration string, e.g. "PT7H35M". Advisory only.
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub segments: Vec<RawSegment>,
}

/// A single flown leg within a slice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSegment {
    pub origin: WirePlace,
    pub destination: WirePlace,
    pub departing_at: NaiveDateTime,
    pub arriving_at: NaiveDateTime,
    pub marketing_carrier: Option<CarrierRef>,
    pub operating_carrier: Option<CarrierRef>,
    #[serde(default)]
    pub marketing_carrier_flight_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WirePlace {
    #[serde(default)]
    pub iata_code: Option<String>,
}

/// Airline reference embedded in offers and segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierRef {
    #[serde(default)]
    pub iata_code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo_symbol_url: Option<String>,
}

/// Airline record from the marketplace airlines endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireAirline {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub iata_code: Option<String>,
    #[serde(default)]
    pub logo_symbol_url: Option<String>,
}

// ============================================================================
// Cursor pagination envelope
// ============================================================================

/// Cursor metadata carried by every paginated list response.
/// Absence of `after` signals the final page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListMeta {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: Option<ListMeta>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

// ============================================================================
// Order wire models
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Confirmed,
    Cancelled,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireOrder {
    pub id: String,
    #[serde(default)]
    pub booking_reference: Option<String>,
    pub status: OrderStatus,
    pub total_amount: String,
    pub total_currency: String,
}

/// Passenger details submitted with an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassengerInput {
    pub given_name: String,
    pub family_name: String,
    pub born_on: NaiveDate,
    #[serde(rename = "type")]
    pub passenger_type: PassengerType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PassengerType {
    Adult,
    Child,
    InfantWithoutSeat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    #[serde(rename = "type")]
    pub payment_type: String,
    pub amount: String,
    pub currency: String,
}
