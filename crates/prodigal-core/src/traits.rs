use async_trait::async_trait;
use crate::{CompanyPage, ProdigalError, Quote};

/// Source of scraped company pages (news + description)
#[async_trait]
pub trait CompanyPageSource: Send + Sync {
    /// `Ok(None)` when the source site does not know the ticker.
    async fn fetch_page(&self, ticker: &str) -> Result<Option<CompanyPage>, ProdigalError>;
}

/// Current quotes and price forecasts for a ticker
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn quote(&self, ticker: &str) -> Result<Option<Quote>, ProdigalError>;

    async fn prediction(&self, ticker: &str) -> Result<Option<Vec<f64>>, ProdigalError>;
}
