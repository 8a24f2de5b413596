use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CabinClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

/// Structured search request for one itinerary.
///
/// Origin and destination are 3-letter airport codes; case normalization
/// and `adults >= 1` are the caller's responsibility. A return slice is
/// built only when `return_date` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub infants: u32,
    #[serde(default)]
    pub return_date: Option<NaiveDate>,
    #[serde(default)]
    pub cabin_class: Option<CabinClass>,
    #[serde(default)]
    pub max_connections: Option<u32>,
}

impl SearchRequest {
    pub fn one_way(origin: &str, destination: &str, departure_date: NaiveDate, adults: u32) -> Self {
        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure_date,
            adults,
            children: 0,
            infants: 0,
            return_date: None,
            cabin_class: None,
            max_connections: None,
        }
    }

    /// Copy of the request with airport codes upper-cased.
    pub fn with_normalized_codes(&self) -> Self {
        let mut req = self.clone();
        req.origin = req.origin.trim().to_ascii_uppercase();
        req.destination = req.destination.trim().to_ascii_uppercase();
        req
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserialization() {
        let json = r#"
            {
                "origin": "JFK",
                "destination": "LHR",
                "departure_date": "2026-03-14",
                "adults": 2,
                "cabin_class": "business"
            }
        "#;
        let req: SearchRequest = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(req.origin, "JFK");
        assert_eq!(req.children, 0);
        assert_eq!(req.cabin_class, Some(CabinClass::Business));
        assert!(req.return_date.is_none());
    }

    #[test]
    fn test_code_normalization() {
        let req = SearchRequest::one_way(" jfk ", "lhr", NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(), 1);
        let normalized = req.with_normalized_codes();
        assert_eq!(normalized.origin, "JFK");
        assert_eq!(normalized.destination, "LHR");
    }
}
