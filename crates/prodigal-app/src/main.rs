use anyhow::{Context, Result};
use prodigal_app::{seed_companies, AppConfig, Prodigal};
use prodigal_store::ProdigalDb;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    tracing::info!("Starting Prodigal");

    let config = AppConfig::from_env()?;
    if !ProdigalDb::exists(&config.database_url) {
        tracing::info!("Creating new database at {}", config.database_url);
    }

    let app = Prodigal::new(&config).await?;

    if let Some(path) = &config.company_seed_csv {
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening company seed {}", path.display()))?;
        seed_companies(app.directory(), file).await?;
    }

    let companies = app.directory().count().await?;
    tracing::info!("Company directory holds {} companies", companies);
    if companies == 0 {
        tracing::warn!("Company directory is empty; set COMPANY_SEED_CSV to import one");
    }

    Ok(())
}
