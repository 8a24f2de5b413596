use chrono::Utc;
use farelink_shared::airline::CachedAirline;
use farelink_shared::flight::{AirlineRef, FlightStatus, NormalizedFlight};
use farelink_shared::wire::{RawOffer, RawSlice};
use std::collections::HashMap;
use tracing::warn;

use crate::airline_cache::AirlineCache;

/// Result of one normalization pass. `dropped` counts offers rejected by
/// structural validation; they are never defaulted or partially rendered.
#[derive(Debug, Default)]
pub struct NormalizationOutcome {
    pub flights: Vec<NormalizedFlight>,
    pub dropped: usize,
}

/// Convert raw marketplace offers into the stable internal flight shape.
///
/// Fail closed: a malformed flight record is worse than a missing one in a
/// booking context, so offers missing slices, segments, airport codes, an
/// owner, or a parseable price are dropped and counted. Airline display
/// data is resolved through the metadata cache, batched per owner code.
pub async fn normalize_offers(offers: &[RawOffer], cache: &AirlineCache) -> NormalizationOutcome {
    let owner_codes: Vec<String> = offers.iter().filter_map(owner_code).collect();
    let airlines: HashMap<String, CachedAirline> = cache
        .get_airlines(&owner_codes)
        .await
        .into_iter()
        .map(|a| (a.code.clone(), a))
        .collect();

    let mut outcome = NormalizationOutcome::default();
    for offer in offers {
        match normalize_offer(offer, &airlines) {
            Some(flight) => outcome.flights.push(flight),
            None => outcome.dropped += 1,
        }
    }

    if outcome.dropped > 0 {
        warn!(
            dropped = outcome.dropped,
            total = offers.len(),
            "Dropped malformed offers during normalization"
        );
    }
    outcome
}

fn owner_code(offer: &RawOffer) -> Option<String> {
    offer
        .owner
        .as_ref()
        .and_then(|o| o.iata_code.as_deref())
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty())
}

fn normalize_offer(
    offer: &RawOffer,
    airlines: &HashMap<String, CachedAirline>,
) -> Option<NormalizedFlight> {
    let code = owner_code(offer)?;
    let slice = offer.slices.first()?;
    let first = slice.segments.first()?;
    let last = slice.segments.last()?;

    let departure_airport = non_empty(first.origin.iata_code.as_deref())?;
    let arrival_airport = non_empty(last.destination.iata_code.as_deref())?;

    // A flight that cannot be priced cannot be booked.
    let price_amount: f64 = offer.total_amount.trim().parse().ok()?;

    let marketing_code = first
        .marketing_carrier
        .as_ref()
        .and_then(|c| c.iata_code.clone())
        .unwrap_or_else(|| code.clone());
    let flight_number = format!(
        "{}{}",
        marketing_code,
        first.marketing_carrier_flight_number.as_deref().unwrap_or("")
    );

    let airline = airlines
        .get(&code)
        .cloned()
        .unwrap_or_else(|| CachedAirline::fallback(&code));

    let status = match offer.expires_at {
        Some(expires_at) if expires_at <= Utc::now().naive_utc() => FlightStatus::Expired,
        _ => FlightStatus::Scheduled,
    };

    Some(NormalizedFlight {
        id: offer.id.clone(),
        flight_number,
        airline: AirlineRef {
            code: airline.code,
            name: airline.name,
            logo_url: airline.logo_url,
        },
        departure_airport,
        departure_at: first.departing_at,
        arrival_airport,
        arrival_at: last.arriving_at,
        duration_minutes: slice
            .duration
            .as_deref()
            .map(parse_duration_minutes)
            .unwrap_or(0),
        stops: slice.segments.len() - 1,
        layovers: layover_minutes(slice),
        price_amount,
        price_currency: offer.total_currency.clone(),
        status,
    })
}

fn non_empty(code: Option<&str>) -> Option<String> {
    code.map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// Parse an ISO-8601 style `PT#H#M` duration into minutes. Hours-only and
/// minutes-only strings are valid; anything unparseable yields 0 since the
/// duration is advisory, not authoritative for booking.
pub fn parse_duration_minutes(raw: &str) -> i64 {
    let rest = match raw.trim().strip_prefix("PT") {
        Some(rest) if !rest.is_empty() => rest,
        _ => return 0,
    };

    let mut minutes: i64 = 0;
    let mut digits = String::new();
    for ch in rest.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let value: i64 = match digits.parse() {
            Ok(v) => v,
            Err(_) => return 0,
        };
        digits.clear();
        match ch {
            'H' => minutes += value * 60,
            'M' => minutes += value,
            _ => return 0,
        }
    }
    if !digits.is_empty() {
        // trailing digits with no unit
        return 0;
    }
    minutes
}

/// Layover durations between adjacent segments, in minutes. A negative gap
/// (clock or timezone inconsistency upstream) is clamped to zero, never
/// propagated.
pub fn layover_minutes(slice: &RawSlice) -> Vec<i64> {
    slice
        .segments
        .windows(2)
        .map(|pair| {
            let gap = (pair[1].departing_at - pair[0].arriving_at).num_minutes();
            if gap < 0 {
                warn!(gap, "Negative layover gap from upstream, clamping to zero");
                0
            } else {
                gap
            }
        })
        .collect()
}
