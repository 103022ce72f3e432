//! Ticker search
//!
//! Composes the company directory, the user's recency lists, the page
//! scraper and the market data service to answer a search request.

use prodigal_core::{
    CompanyPage, CompanyPageSource, CompanyRef, MarketDataProvider, NewsItem, ProdigalResult,
    Quote, User,
};
use prodigal_store::{CompanyDirectory, RecencyService};
use serde::Serialize;
use std::sync::Arc;

/// Merged answer to a ticker search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchReport {
    pub ticker: String,
    /// Name from the company directory
    pub name: String,
    /// Name as shown on the scraped listing page
    pub listed_name: Option<String>,
    pub news: Vec<NewsItem>,
    pub description: Option<Vec<String>>,
    /// `None` when the quote service has no data for the ticker or failed
    pub quote: Option<Quote>,
}

pub struct SearchService {
    directory: CompanyDirectory,
    recency: RecencyService,
    pages: Arc<dyn CompanyPageSource>,
    market: Arc<dyn MarketDataProvider>,
}

impl SearchService {
    pub fn new(
        directory: CompanyDirectory,
        recency: RecencyService,
        pages: Arc<dyn CompanyPageSource>,
        market: Arc<dyn MarketDataProvider>,
    ) -> Self {
        Self {
            directory,
            recency,
            pages,
            market,
        }
    }

    /// Search by ticker and record it in the user's history.
    ///
    /// `Ok(None)` when the ticker is not in the directory; the history is left
    /// untouched in that case. Scraper and quote failures degrade the report
    /// instead of failing the search.
    pub async fn search(&self, user: &mut User, ticker: &str) -> ProdigalResult<Option<SearchReport>> {
        let Some(company) = self.directory.find_by_ticker(ticker).await? else {
            tracing::debug!("Search for unknown ticker {}", ticker);
            return Ok(None);
        };

        self.recency.update_history(user, company.id).await?;

        let (page, quote) = tokio::join!(
            self.pages.fetch_page(&company.symbol),
            self.market.quote(&company.symbol)
        );

        let page = match page {
            Ok(Some(page)) => Some(page),
            Ok(None) => {
                tracing::info!("Listing page not found for {}", company.symbol);
                None
            }
            Err(e) => {
                tracing::warn!("Scrape failed for {}: {}", company.symbol, e);
                None
            }
        };

        let quote = match quote {
            Ok(quote) => quote,
            Err(e) => {
                tracing::warn!("Quote fetch failed for {}: {}", company.symbol, e);
                None
            }
        };

        let CompanyPage {
            company_name,
            news,
            description,
        } = page.unwrap_or_default();

        Ok(Some(SearchReport {
            ticker: company.symbol,
            name: company.name,
            listed_name: Some(company_name).filter(|n| !n.is_empty()),
            news,
            description,
            quote,
        }))
    }

    /// Companies in a sector as (ticker, name) pairs
    pub async fn search_by_sector(&self, sector: &str) -> ProdigalResult<Vec<CompanyRef>> {
        let companies = self.directory.find_by_sector(sector).await?;
        Ok(companies.iter().map(|c| c.to_ref()).collect())
    }

    /// Forecast closing prices. Service failures propagate.
    pub async fn predict(&self, ticker: &str) -> ProdigalResult<Option<Vec<f64>>> {
        self.market.prediction(ticker).await
    }

    pub async fn company_names(&self) -> ProdigalResult<Vec<String>> {
        self.directory.list_distinct_names().await
    }

    pub async fn ticker_by_name(&self, name: &str) -> ProdigalResult<Option<String>> {
        Ok(self.directory.find_by_name(name).await?.map(|c| c.symbol))
    }

    /// `false` if the ticker is unknown or already a favorite.
    pub async fn add_favorite(&self, user: &mut User, ticker: &str) -> ProdigalResult<bool> {
        match self.directory.find_by_ticker(ticker).await? {
            Some(company) => self.recency.add_favorite(user, company.id).await,
            None => Ok(false),
        }
    }

    /// `false` if the ticker is unknown or not a favorite.
    pub async fn remove_favorite(&self, user: &mut User, ticker: &str) -> ProdigalResult<bool> {
        match self.directory.find_by_ticker(ticker).await? {
            Some(company) => self.recency.remove_favorite(user, company.id).await,
            None => Ok(false),
        }
    }

    pub async fn history(&self, user: &User) -> ProdigalResult<Option<Vec<CompanyRef>>> {
        self.recency.get_history(user).await
    }

    pub async fn favorites(&self, user: &User) -> ProdigalResult<Option<Vec<CompanyRef>>> {
        self.recency.get_favorites(user).await
    }
}
