pub mod client;
pub mod error;
pub mod provider;

pub use client::{parse_prediction, parse_quote, MarketDataClient};
pub use error::{MarketDataError, MarketDataResult};

use std::time::Duration;

/// Configuration for the quote / prediction service
#[derive(Debug, Clone)]
pub struct MarketDataConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8005".to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}
