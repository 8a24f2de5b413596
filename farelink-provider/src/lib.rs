pub mod app_config;
pub mod client;
pub mod pagination;

pub use app_config::{Config, ProviderConfig};
pub use client::ProviderClient;
