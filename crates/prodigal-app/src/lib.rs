//! Application wiring
//!
//! Builds the store, scraper, market data client and notifier from an
//! [`AppConfig`] and exposes the signup, login and search entry points.

pub mod config;

pub use config::AppConfig;

use anyhow::{Context, Result};
use market_data_client::MarketDataClient;
use nasdaq_scraper::NasdaqScraper;
use notification_service::NotificationService;
use prodigal_core::{Gender, ProdigalResult, SignupOutcome, User};
use prodigal_store::{
    validate_email, CompanyDirectory, CredentialManager, ProdigalDb, RecencyService,
    UserRepository,
};
use search_orchestrator::SearchService;
use serde::Deserialize;
use std::sync::Arc;

pub struct Prodigal {
    directory: CompanyDirectory,
    credentials: CredentialManager,
    search: SearchService,
    notifications: NotificationService,
}

impl Prodigal {
    /// Open the database (creating the schema if needed) and build every
    /// service from `config`.
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let db = ProdigalDb::new(&config.database_url)
            .await
            .with_context(|| format!("opening database {}", config.database_url))?;

        let search = SearchService::new(
            CompanyDirectory::new(db.clone()),
            RecencyService::new(UserRepository::new(db.clone()), CompanyDirectory::new(db.clone())),
            Arc::new(NasdaqScraper::new(config.scraper.clone())),
            Arc::new(MarketDataClient::new(config.market_data.clone())),
        );

        Ok(Self::from_parts(
            db,
            search,
            NotificationService::new(&config.notifications),
        ))
    }

    pub fn from_parts(db: ProdigalDb, search: SearchService, notifications: NotificationService) -> Self {
        Self {
            directory: CompanyDirectory::new(db.clone()),
            credentials: CredentialManager::new(UserRepository::new(db)),
            search,
            notifications,
        }
    }

    pub fn directory(&self) -> &CompanyDirectory {
        &self.directory
    }

    pub fn search(&self) -> &SearchService {
        &self.search
    }

    /// Register a new account and queue the welcome email.
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        gender: Gender,
        password: &str,
    ) -> ProdigalResult<SignupOutcome> {
        if !validate_email(email) {
            tracing::debug!("Signup rejected, malformed email for {}", username);
            return Ok(SignupOutcome::MalformedEmail);
        }

        let outcome = self
            .credentials
            .create_user(username, email, gender, password)
            .await?;

        if let SignupOutcome::Created(user) = &outcome {
            self.notifications.send_welcome(&user.email, &user.username);
        }

        Ok(outcome)
    }

    pub async fn login(&self, identifier: &str, password: &str) -> ProdigalResult<Option<User>> {
        self.credentials.verify_login(identifier, password).await
    }
}

#[derive(Debug, Deserialize)]
struct CompanyRow {
    symbol: String,
    name: String,
    sector: String,
}

/// Import `symbol,name,sector` rows (with a header line). Tickers already in
/// the directory are skipped. Returns the number of companies added.
pub async fn seed_companies<R: std::io::Read>(directory: &CompanyDirectory, reader: R) -> Result<usize> {
    let mut rows = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut added = 0;

    for (line, row) in rows.deserialize::<CompanyRow>().enumerate() {
        let row = row.with_context(|| format!("company seed row {}", line + 1))?;

        if row.symbol.is_empty() {
            tracing::warn!("Skipping company seed row {} with empty symbol", line + 1);
            continue;
        }

        if directory.find_by_ticker(&row.symbol).await?.is_some() {
            continue;
        }

        directory
            .insert(&row.symbol, &row.name, &row.sector)
            .await
            .with_context(|| format!("inserting {}", row.symbol))?;
        added += 1;
    }

    tracing::info!("Seeded {} companies", added);
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use notification_service::{Notice, NotificationChannel, NotificationError, NoticeType};
    use prodigal_core::{CompanyPage, CompanyPageSource, MarketDataProvider, ProdigalError, Quote};
    use std::sync::Mutex;

    struct NoPages;

    #[async_trait]
    impl CompanyPageSource for NoPages {
        async fn fetch_page(&self, _ticker: &str) -> Result<Option<CompanyPage>, ProdigalError> {
            Ok(None)
        }
    }

    struct NoMarket;

    #[async_trait]
    impl MarketDataProvider for NoMarket {
        async fn quote(&self, _ticker: &str) -> Result<Option<Quote>, ProdigalError> {
            Ok(None)
        }

        async fn prediction(&self, _ticker: &str) -> Result<Option<Vec<f64>>, ProdigalError> {
            Ok(None)
        }
    }

    struct Outbox(Arc<Mutex<Vec<String>>>);

    #[async_trait]
    impl NotificationChannel for Outbox {
        async fn send(&self, notice: &Notice) -> Result<(), NotificationError> {
            let NoticeType::Welcome { username } = &notice.notice_type;
            self.0.lock().unwrap().push(format!("{} <{}>", username, notice.recipient));
            Ok(())
        }

        fn name(&self) -> &str {
            "outbox"
        }
    }

    const SEED: &str = "symbol,name,sector\nAAPL,Apple Inc.,Technology\nMSFT, Microsoft Corporation ,Technology\nAMGN,Amgen Inc.,Health Care\n";

    async fn app() -> (Prodigal, Arc<Mutex<Vec<String>>>) {
        let db = ProdigalDb::in_memory().await.unwrap();
        let search = SearchService::new(
            CompanyDirectory::new(db.clone()),
            RecencyService::new(UserRepository::new(db.clone()), CompanyDirectory::new(db.clone())),
            Arc::new(NoPages),
            Arc::new(NoMarket),
        );
        let outbox = Arc::new(Mutex::new(Vec::new()));
        let notifications =
            NotificationService::with_channels(vec![Box::new(Outbox(outbox.clone()))]);
        (Prodigal::from_parts(db, search, notifications), outbox)
    }

    #[tokio::test]
    async fn test_seed_companies() {
        let (app, _) = app().await;

        assert_eq!(seed_companies(app.directory(), SEED.as_bytes()).await.unwrap(), 3);
        assert_eq!(app.directory().count().await.unwrap(), 3);

        let msft = app.directory().find_by_ticker("MSFT").await.unwrap().unwrap();
        assert_eq!(msft.name, "Microsoft Corporation");

        // Second import adds nothing
        assert_eq!(seed_companies(app.directory(), SEED.as_bytes()).await.unwrap(), 0);
        assert_eq!(app.directory().count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_seed_rejects_short_rows() {
        let (app, _) = app().await;
        let csv = "symbol,name,sector\nAAPL,Apple Inc.\n";
        assert!(seed_companies(app.directory(), csv.as_bytes()).await.is_err());
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let (app, outbox) = app().await;

        let outcome = app
            .signup("henry", "henry@example.com", Gender::Male, "hunter2")
            .await
            .unwrap();
        assert!(outcome.is_created());

        let user = app.login("henry", "hunter2").await.unwrap().unwrap();
        assert_eq!(user.email, "henry@example.com");
        assert!(app.login("henry@example.com", "hunter2").await.unwrap().is_some());
        assert!(app.login("henry", "wrong").await.unwrap().is_none());

        // Welcome email is sent in the background
        for _ in 0..50 {
            if !outbox.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(*outbox.lock().unwrap(), vec!["henry <henry@example.com>".to_string()]);
    }

    #[tokio::test]
    async fn test_signup_rejections() {
        let (app, outbox) = app().await;

        assert_eq!(
            app.signup("ivy", "not-an-email", Gender::Female, "pw").await.unwrap(),
            SignupOutcome::MalformedEmail
        );
        assert!(app.login("ivy", "pw").await.unwrap().is_none());

        assert!(app
            .signup("ivy", "ivy@example.com", Gender::Female, "pw")
            .await
            .unwrap()
            .is_created());
        assert_eq!(
            app.signup("ivy", "other@example.com", Gender::Other, "pw").await.unwrap(),
            SignupOutcome::DuplicateAccount
        );
        assert_eq!(
            app.signup("ivy2", "ivy@example.com", Gender::Other, "pw").await.unwrap(),
            SignupOutcome::DuplicateAccount
        );

        assert_eq!(
            app.signup("ivy3", &format!("{}@example.com", "a".repeat(40)), Gender::Female, "pw")
                .await
                .unwrap(),
            SignupOutcome::MalformedEmail
        );
        assert_eq!(
            app.signup(&"k".repeat(51), "kay@example.com", Gender::Female, "pw")
                .await
                .unwrap(),
            SignupOutcome::InvalidUsername
        );

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(outbox.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_through_facade() {
        let (app, _) = app().await;
        seed_companies(app.directory(), SEED.as_bytes()).await.unwrap();

        app.signup("jo", "jo@example.com", Gender::Other, "pw").await.unwrap();
        let mut user = app.login("jo", "pw").await.unwrap().unwrap();

        let report = app.search().search(&mut user, "AMGN").await.unwrap().unwrap();
        assert_eq!(report.name, "Amgen Inc.");
        assert!(report.quote.is_none());

        let history = app.search().history(&user).await.unwrap().unwrap();
        assert_eq!(history[0].ticker, "AMGN");
    }
}
