use serde::{Deserialize, Serialize};

/// Single active sort key, ascending only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Price,
    Duration,
    Stops,
    DepartureTime,
}

/// Client-visible filter contract for one search call.
///
/// Immutable for the duration of a search; re-evaluated from scratch on
/// every call. An empty airline list means "no restriction", not "reject all".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub airlines: Vec<String>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub max_stops: Option<usize>,
    #[serde(default)]
    pub sort: Option<SortKey>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criteria_defaults_apply_no_filtering() {
        let criteria: FilterCriteria = serde_json::from_str("{}").expect("Failed to deserialize");
        assert!(criteria.airlines.is_empty());
        assert!(criteria.max_price.is_none());
        assert!(criteria.max_stops.is_none());
        assert!(criteria.sort.is_none());
    }

    #[test]
    fn test_sort_key_wire_names() {
        let key: SortKey = serde_json::from_str(r#""departure_time""#).unwrap();
        assert_eq!(key, SortKey::DepartureTime);
    }
}
