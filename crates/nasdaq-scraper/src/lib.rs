//! Company page scraper
//!
//! Fetches a ticker's listing page and pulls out the display name, recent
//! news headlines and the company description.

mod parse;

pub use parse::{parse_company_page, HEADER_SUFFIX_LEN};

use async_trait::async_trait;
use prodigal_core::{CompanyPage, CompanyPageSource, ProdigalError};
use reqwest::{Client, StatusCode};
use std::time::Duration;

const BASE_URL: &str = "https://www.nasdaq.com/symbol/";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/54.0.2840.90 Safari/537.36";

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Page URL prefix; the ticker is appended directly
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct NasdaqScraper {
    client: Client,
    base_url: String,
}

impl NasdaqScraper {
    pub fn new(config: ScraperConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.base_url,
        }
    }

    pub fn page_url(&self, ticker: &str) -> String {
        format!("{}{}", self.base_url, ticker)
    }

    /// Scrape the listing page for `ticker`. `Ok(None)` means the site does
    /// not list the ticker.
    pub async fn scrape(&self, ticker: &str) -> Result<Option<CompanyPage>, ProdigalError> {
        let url = self.page_url(ticker);
        tracing::debug!("Scraping {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProdigalError::Api(e.to_string()))?;

        if !check_status(response.status(), ticker)? {
            tracing::debug!("No listing page for {}", ticker);
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProdigalError::Api(e.to_string()))?;

        let page = parse_company_page(&body)?;
        match &page {
            Some(p) => tracing::debug!(
                "Scraped {}: {} news items, description {}",
                ticker,
                p.news.len(),
                if p.description.is_some() { "present" } else { "missing" }
            ),
            None => tracing::debug!("Page header missing for {}, treating as unknown ticker", ticker),
        }
        Ok(page)
    }
}

/// `Ok(false)` when the site has no page for the ticker (404), an error on
/// any other non-2xx status.
fn check_status(status: StatusCode, ticker: &str) -> Result<bool, ProdigalError> {
    if status == StatusCode::NOT_FOUND {
        return Ok(false);
    }
    if !status.is_success() {
        return Err(ProdigalError::Api(format!("Scrape HTTP {} for {}", status, ticker)));
    }
    Ok(true)
}

#[async_trait]
impl CompanyPageSource for NasdaqScraper {
    async fn fetch_page(&self, ticker: &str) -> Result<Option<CompanyPage>, ProdigalError> {
        self.scrape(ticker).await
    }
}
