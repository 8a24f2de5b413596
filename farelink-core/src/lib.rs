pub mod api;
pub mod search;

pub use api::MarketplaceApi;
pub use search::{CabinClass, SearchRequest};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider configuration error: {0}")]
    Configuration(String),
    #[error("Upstream request failed: {0}")]
    Upstream(String),
    #[error("Failed to decode upstream response: {0}")]
    Decode(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;
