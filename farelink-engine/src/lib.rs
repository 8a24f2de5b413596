pub mod airline_cache;
pub mod filters;
pub mod normalize;
pub mod service;

pub use airline_cache::{AirlineCache, CacheConfig, CacheStats};
pub use normalize::{normalize_offers, NormalizationOutcome};
pub use service::{EngineError, SearchResponse, SearchService};
