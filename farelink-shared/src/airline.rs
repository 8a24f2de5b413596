use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provenance of a cached airline entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AirlineSource {
    /// Seeded from the static known-good list at construction
    Bootstrap,
    /// Fetched from the marketplace airlines endpoint
    Upstream,
    /// Derived from carrier data embedded in search results
    Search,
    /// Synthesized after a failed upstream lookup; name is the code itself
    Fallback,
}

/// One cache entry per airline code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedAirline {
    pub code: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub cached_at: DateTime<Utc>,
    pub source: AirlineSource,
}

impl CachedAirline {
    pub fn new(code: &str, name: &str, logo_url: Option<String>, source: AirlineSource) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            logo_url,
            cached_at: Utc::now(),
            source,
        }
    }

    /// Fallback entry keyed by the code itself, so a read never fails outright.
    pub fn fallback(code: &str) -> Self {
        Self::new(code, code, None, AirlineSource::Fallback)
    }
}

/// Display summary exposed to the search UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AirlineSummary {
    pub code: String,
    pub name: String,
    pub logo_url: Option<String>,
}

impl From<&CachedAirline> for AirlineSummary {
    fn from(entry: &CachedAirline) -> Self {
        Self {
            code: entry.code.clone(),
            name: entry.name.clone(),
            logo_url: entry.logo_url.clone(),
        }
    }
}
