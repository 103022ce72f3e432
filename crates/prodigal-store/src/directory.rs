//! Company directory lookups against the static `companies` table.

use prodigal_core::{Company, ProdigalResult};
use sqlx::FromRow;

use crate::db::ProdigalDb;
use crate::db_error;

#[derive(Debug, FromRow)]
struct CompanyRow {
    company_id: i64,
    symbol: String,
    name: String,
    sector: String,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Self {
            id: row.company_id,
            symbol: row.symbol,
            name: row.name,
            sector: row.sector,
        }
    }
}

#[derive(Clone)]
pub struct CompanyDirectory {
    db: ProdigalDb,
}

impl CompanyDirectory {
    pub fn new(db: ProdigalDb) -> Self {
        Self { db }
    }

    pub async fn find_by_ticker(&self, ticker: &str) -> ProdigalResult<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>(
            "SELECT company_id, symbol, name, sector FROM companies WHERE symbol = ?",
        )
        .bind(ticker)
        .fetch_optional(self.db.pool())
        .await
        .map_err(db_error)?;

        Ok(row.map(Company::from))
    }

    pub async fn find_by_id(&self, id: i64) -> ProdigalResult<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>(
            "SELECT company_id, symbol, name, sector FROM companies WHERE company_id = ?",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await
        .map_err(db_error)?;

        Ok(row.map(Company::from))
    }

    /// Exact name match. Names are not unique; the lowest id wins.
    pub async fn find_by_name(&self, name: &str) -> ProdigalResult<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>(
            r#"
            SELECT company_id, symbol, name, sector
            FROM companies
            WHERE name = ?
            ORDER BY company_id
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(self.db.pool())
        .await
        .map_err(db_error)?;

        Ok(row.map(Company::from))
    }

    pub async fn find_by_sector(&self, sector: &str) -> ProdigalResult<Vec<Company>> {
        let rows = sqlx::query_as::<_, CompanyRow>(
            "SELECT company_id, symbol, name, sector FROM companies WHERE sector = ? ORDER BY company_id",
        )
        .bind(sector)
        .fetch_all(self.db.pool())
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Company::from).collect())
    }

    pub async fn list_distinct_names(&self) -> ProdigalResult<Vec<String>> {
        let names: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT name FROM companies ORDER BY name")
                .fetch_all(self.db.pool())
                .await
                .map_err(db_error)?;

        Ok(names.into_iter().map(|(name,)| name).collect())
    }

    pub async fn insert(&self, symbol: &str, name: &str, sector: &str) -> ProdigalResult<Company> {
        let row = sqlx::query_as::<_, CompanyRow>(
            r#"
            INSERT INTO companies (symbol, name, sector)
            VALUES (?, ?, ?)
            RETURNING company_id, symbol, name, sector
            "#,
        )
        .bind(symbol)
        .bind(name)
        .bind(sector)
        .fetch_one(self.db.pool())
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    pub async fn count(&self) -> ProdigalResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM companies")
            .fetch_one(self.db.pool())
            .await
            .map_err(db_error)?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_directory() -> CompanyDirectory {
        let db = ProdigalDb::in_memory().await.unwrap();
        let dir = CompanyDirectory::new(db);
        dir.insert("AAPL", "Apple Inc.", "Technology").await.unwrap();
        dir.insert("MSFT", "Microsoft Corporation", "Technology").await.unwrap();
        dir.insert("AMGN", "Amgen Inc.", "Health Care").await.unwrap();
        dir.insert("GOOGL", "Alphabet Inc.", "Technology").await.unwrap();
        dir.insert("GOOG", "Alphabet Inc.", "Technology").await.unwrap();
        dir
    }

    #[tokio::test]
    async fn test_find_by_ticker() {
        let dir = seeded_directory().await;

        let apple = dir.find_by_ticker("AAPL").await.unwrap().unwrap();
        assert_eq!(apple.name, "Apple Inc.");
        assert_eq!(apple.sector, "Technology");

        assert!(dir.find_by_ticker("ZZZZ").await.unwrap().is_none());
        assert!(dir.find_by_ticker("aapl").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_id_round_trips() {
        let dir = seeded_directory().await;
        let msft = dir.find_by_ticker("MSFT").await.unwrap().unwrap();
        assert_eq!(dir.find_by_id(msft.id).await.unwrap(), Some(msft));
        assert!(dir.find_by_id(9_999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_name_prefers_lowest_id() {
        let dir = seeded_directory().await;
        let alphabet = dir.find_by_name("Alphabet Inc.").await.unwrap().unwrap();
        assert_eq!(alphabet.symbol, "GOOGL");
        assert!(dir.find_by_name("Alphabet").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_sector() {
        let dir = seeded_directory().await;

        let tech = dir.find_by_sector("Technology").await.unwrap();
        let symbols: Vec<_> = tech.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT", "GOOGL", "GOOG"]);

        assert!(dir.find_by_sector("Utilities").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_distinct_names() {
        let dir = seeded_directory().await;
        let names = dir.list_distinct_names().await.unwrap();
        assert_eq!(
            names,
            vec!["Alphabet Inc.", "Amgen Inc.", "Apple Inc.", "Microsoft Corporation"]
        );
        assert_eq!(dir.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_duplicate_ticker_rejected() {
        let dir = seeded_directory().await;
        assert!(dir.insert("AAPL", "Other Apple", "Technology").await.is_err());
    }

    #[tokio::test]
    async fn test_ticker_length_is_checked() {
        let dir = seeded_directory().await;
        assert!(dir.insert("TOOLONG", "Too Long Co", "Industrials").await.is_err());
    }
}
