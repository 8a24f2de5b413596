use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a normalized flight
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightStatus {
    Scheduled,
    Expired,
}

/// Airline display data attached to a normalized flight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AirlineRef {
    pub code: String,
    pub name: String,
    pub logo_url: Option<String>,
}

/// The stable internal flight shape produced by normalization.
///
/// Invariant: departure and arrival airport codes are non-empty and the
/// source offer had at least one segment. Offers failing that are dropped
/// during normalization, never defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedFlight {
    pub id: String,
    /// Marketing carrier code + flight number, e.g. "BA117".
    pub flight_number: String,
    pub airline: AirlineRef,
    pub departure_airport: String,
    pub departure_at: NaiveDateTime,
    pub arrival_airport: String,
    pub arrival_at: NaiveDateTime,
    /// Total slice duration in minutes. Advisory; 0 when upstream sent
    /// an unparseable duration string.
    pub duration_minutes: i64,
    /// Segment count of the first slice minus one.
    pub stops: usize,
    /// Ground time between adjacent segments, in minutes, one entry per
    /// connection. Empty for non-stop flights. Never negative: upstream
    /// clock inconsistencies are clamped to zero during normalization.
    pub layovers: Vec<i64>,
    pub price_amount: f64,
    pub price_currency: String,
    pub status: FlightStatus,
}
