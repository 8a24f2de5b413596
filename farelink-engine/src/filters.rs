use farelink_shared::criteria::{FilterCriteria, SortKey};
use farelink_shared::flight::NormalizedFlight;

/// Apply the client-visible filter contract: price ceiling, max stops,
/// airline allow-list. The predicates are independent, so the order only
/// affects short-circuit cost, not the result. An empty allow-list means
/// "no restriction".
pub fn apply_filters(
    flights: Vec<NormalizedFlight>,
    criteria: &FilterCriteria,
) -> Vec<NormalizedFlight> {
    let allow: Vec<String> = criteria
        .airlines
        .iter()
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty())
        .collect();

    flights
        .into_iter()
        .filter(|f| criteria.max_price.map_or(true, |cap| f.price_amount <= cap))
        .filter(|f| criteria.max_stops.map_or(true, |cap| f.stops <= cap))
        .filter(|f| allow.is_empty() || allow.contains(&f.airline.code))
        .collect()
}

/// Full re-sort on one ascending key. `sort_by` is stable, so ties keep
/// their input order; there is no secondary key.
pub fn sort_flights(flights: &mut [NormalizedFlight], key: SortKey) {
    match key {
        SortKey::Price => flights.sort_by(|a, b| a.price_amount.total_cmp(&b.price_amount)),
        SortKey::Duration => flights.sort_by_key(|f| f.duration_minutes),
        SortKey::Stops => flights.sort_by_key(|f| f.stops),
        SortKey::DepartureTime => flights.sort_by_key(|f| f.departure_at),
    }
}
