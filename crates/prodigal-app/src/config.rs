use anyhow::{Context, Result};
use market_data_client::MarketDataConfig;
use nasdaq_scraper::ScraperConfig;
use notification_service::{NotificationConfig, SmtpTls};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub market_data: MarketDataConfig,
    pub scraper: ScraperConfig,
    pub notifications: NotificationConfig,
    /// Optional `symbol,name,sector` CSV imported at startup
    pub company_seed_csv: Option<PathBuf>,
}

impl AppConfig {
    /// Load from the process environment (call `dotenvy::dotenv()` first to
    /// pick up a `.env` file).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secs = |key: &str, default: Duration| -> Result<Duration> {
            match get(key) {
                Some(v) => {
                    let n: u64 = v
                        .trim()
                        .parse()
                        .with_context(|| format!("{key} must be a whole number of seconds"))?;
                    Ok(Duration::from_secs(n))
                }
                None => Ok(default),
            }
        };

        let market = MarketDataConfig::default();
        let scraper = ScraperConfig::default();
        let notifications = NotificationConfig::default();

        let config = Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| "sqlite:prodigal.db".to_string()),
            market_data: MarketDataConfig {
                base_url: get("MARKET_DATA_URL").unwrap_or(market.base_url),
                api_key: get("MARKET_DATA_API_KEY").unwrap_or(market.api_key),
                timeout: secs("MARKET_DATA_TIMEOUT_SECS", market.timeout)?,
            },
            scraper: ScraperConfig {
                base_url: get("SCRAPER_BASE_URL").unwrap_or(scraper.base_url),
                timeout: secs("SCRAPER_TIMEOUT_SECS", scraper.timeout)?,
                user_agent: scraper.user_agent,
            },
            notifications: NotificationConfig {
                smtp_host: get("SMTP_HOST"),
                smtp_port: match get("SMTP_PORT") {
                    Some(v) => v.trim().parse().context("SMTP_PORT must be a port number")?,
                    None => notifications.smtp_port,
                },
                smtp_username: get("SMTP_USERNAME"),
                smtp_password: get("SMTP_PASSWORD"),
                smtp_from: get("SMTP_FROM_ADDRESS"),
                smtp_tls: match get("SMTP_TLS").as_deref() {
                    Some("tls") => SmtpTls::Tls,
                    Some("none") => SmtpTls::None,
                    Some("starttls") | None => SmtpTls::StartTls,
                    Some(other) => anyhow::bail!("SMTP_TLS must be tls, starttls or none, got {other:?}"),
                },
                site_url: get("SITE_URL").unwrap_or(notifications.site_url),
            },
            company_seed_csv: get("COMPANY_SEED_CSV").map(PathBuf::from),
        };

        if config.market_data.api_key.is_empty() {
            tracing::warn!("MARKET_DATA_API_KEY is not set; quote and prediction calls will likely be rejected");
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, "sqlite:prodigal.db");
        assert_eq!(config.market_data.timeout, Duration::from_secs(10));
        assert_eq!(config.scraper.base_url, "https://www.nasdaq.com/symbol/");
        assert_eq!(config.notifications.smtp_port, 587);
        assert!(config.notifications.smtp_host.is_none());
        assert!(config.company_seed_csv.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("MARKET_DATA_URL", "https://ml.example.com"),
            ("MARKET_DATA_API_KEY", "secret"),
            ("MARKET_DATA_TIMEOUT_SECS", "3"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "2525"),
            ("SMTP_TLS", "none"),
            ("COMPANY_SEED_CSV", "data/companies.csv"),
        ])
        .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.market_data.base_url, "https://ml.example.com");
        assert_eq!(config.market_data.api_key, "secret");
        assert_eq!(config.market_data.timeout, Duration::from_secs(3));
        assert_eq!(config.notifications.smtp_port, 2525);
        assert!(matches!(config.notifications.smtp_tls, SmtpTls::None));
        assert_eq!(
            config.company_seed_csv,
            Some(PathBuf::from("data/companies.csv"))
        );
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("DATABASE_URL", "  "), ("SMTP_HOST", "")]).unwrap();
        assert_eq!(config.database_url, "sqlite:prodigal.db");
        assert!(config.notifications.smtp_host.is_none());
    }

    #[test]
    fn test_bad_numbers_are_rejected() {
        assert!(config_from(&[("SCRAPER_TIMEOUT_SECS", "soon")]).is_err());
        assert!(config_from(&[("MARKET_DATA_TIMEOUT_SECS", "-1")]).is_err());
        assert!(config_from(&[("SMTP_PORT", "99999")]).is_err());
        assert!(config_from(&[("SMTP_TLS", "maybe")]).is_err());
    }

    #[test]
    fn test_unset_values_match_component_defaults() {
        let config = config_from(&[("SCRAPER_BASE_URL", " ")]).unwrap();
        let scraper = ScraperConfig::default();
        let market = MarketDataConfig::default();
        let notifications = NotificationConfig::default();

        assert_eq!(config.scraper.base_url, scraper.base_url);
        assert_eq!(config.scraper.timeout, scraper.timeout);
        assert_eq!(config.scraper.user_agent, scraper.user_agent);
        assert_eq!(config.market_data.base_url, market.base_url);
        assert_eq!(config.market_data.api_key, market.api_key);
        assert_eq!(config.notifications.smtp_port, notifications.smtp_port);
        assert_eq!(config.notifications.site_url, notifications.site_url);
    }
}
