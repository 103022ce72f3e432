use async_trait::async_trait;
use prodigal_core::{MarketDataProvider, ProdigalError, Quote};

use crate::client::MarketDataClient;
use crate::error::MarketDataError;

fn to_api_error(e: MarketDataError) -> ProdigalError {
    ProdigalError::Api(e.to_string())
}

#[async_trait]
impl MarketDataProvider for MarketDataClient {
    async fn quote(&self, ticker: &str) -> Result<Option<Quote>, ProdigalError> {
        self.get_quote(ticker).await.map_err(to_api_error)
    }

    async fn prediction(&self, ticker: &str) -> Result<Option<Vec<f64>>, ProdigalError> {
        self.get_prediction(ticker).await.map_err(to_api_error)
    }
}
