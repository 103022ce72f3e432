use prodigal_core::{Quote, QuotePoint};
use reqwest::{header, Client, StatusCode};

use crate::error::{MarketDataError, MarketDataResult};
use crate::MarketDataConfig;

/// Number of forecast values the prediction endpoint is expected to return
pub const PREDICTION_HORIZON: usize = 5;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/54.0.2840.90 Safari/537.36";

#[derive(Clone)]
pub struct MarketDataClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl MarketDataClient {
    pub fn new(config: MarketDataConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        }
    }

    pub fn quote_url(&self, ticker: &str) -> String {
        format!("{}/stocks/{}", self.base_url, ticker)
    }

    pub fn prediction_url(&self, ticker: &str) -> String {
        format!("{}/stocks/{}/runexpr", self.base_url, ticker)
    }

    /// GET with the api key as both query parameter and header.
    /// `Ok(None)` on 404.
    async fn get_body(&self, url: &str) -> MarketDataResult<Option<String>> {
        let response = self
            .client
            .get(url)
            .query(&[("apikey", &self.api_key)])
            .header("apikey", &self.api_key)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        if !check_status(response.status())? {
            return Ok(None);
        }

        Ok(Some(response.text().await?))
    }

    /// Latest quote and price series for `ticker`
    pub async fn get_quote(&self, ticker: &str) -> MarketDataResult<Option<Quote>> {
        let Some(body) = self.get_body(&self.quote_url(ticker)).await? else {
            tracing::debug!("No quote data for {}", ticker);
            return Ok(None);
        };

        let quote = parse_quote(&body)?;
        if quote.is_none() {
            tracing::warn!("Quote service returned an empty series for {}", ticker);
        }
        Ok(quote)
    }

    /// Forecast closing prices for the next trading days
    pub async fn get_prediction(&self, ticker: &str) -> MarketDataResult<Option<Vec<f64>>> {
        let Some(body) = self.get_body(&self.prediction_url(ticker)).await? else {
            tracing::debug!("No prediction for {}", ticker);
            return Ok(None);
        };

        let prices = parse_prediction(&body)?;
        if prices.len() != PREDICTION_HORIZON {
            tracing::debug!(
                "Prediction for {} has {} values, expected {}",
                ticker,
                prices.len(),
                PREDICTION_HORIZON
            );
        }
        Ok(Some(prices))
    }
}

/// `Ok(false)` on 404 (no data for the ticker), an error on any other
/// non-2xx status.
pub(crate) fn check_status(status: StatusCode) -> MarketDataResult<bool> {
    if status == StatusCode::NOT_FOUND {
        return Ok(false);
    }
    if !status.is_success() {
        return Err(MarketDataError::UnexpectedStatus(status));
    }
    Ok(true)
}

/// Parse the quote endpoint body: a JSON array whose first element is the
/// most recent trading day. An empty array yields `None`.
pub fn parse_quote(body: &str) -> MarketDataResult<Option<Quote>> {
    let series: Vec<serde_json::Value> = serde_json::from_str(body)?;

    let Some(first) = series.first() else {
        return Ok(None);
    };

    let latest: QuotePoint = serde_json::from_value(first.clone())
        .map_err(|e| MarketDataError::InvalidResponse(format!("latest quote: {e}")))?;

    Ok(Some(Quote { latest, series }))
}

pub fn parse_prediction(body: &str) -> MarketDataResult<Vec<f64>> {
    Ok(serde_json::from_str(body)?)
}
