use prodigal_core::{CompanyRef, ProdigalResult, User};

use crate::directory::CompanyDirectory;
use crate::users::UserRepository;

/// Persists history and favorites changes and resolves them for display.
///
/// Each update changes a copy of the caller's `User`, saves both list
/// columns, and only then replaces the caller's value, so a failed save
/// leaves `user` matching the stored row. Concurrent updates for the same
/// user race and the last save wins.
#[derive(Clone)]
pub struct RecencyService {
    users: UserRepository,
    directory: CompanyDirectory,
}

impl RecencyService {
    pub fn new(users: UserRepository, directory: CompanyDirectory) -> Self {
        Self { users, directory }
    }

    pub async fn update_history(&self, user: &mut User, company_id: i64) -> ProdigalResult<()> {
        self.save_changed(user, |u| {
            u.history.record(company_id);
            true
        })
        .await?;
        Ok(())
    }

    /// Returns `false` (and writes nothing) if already a favorite.
    pub async fn add_favorite(&self, user: &mut User, company_id: i64) -> ProdigalResult<bool> {
        self.save_changed(user, |u| u.favorites.add(company_id)).await
    }

    /// Returns `false` (and writes nothing) if not a favorite.
    pub async fn remove_favorite(&self, user: &mut User, company_id: i64) -> ProdigalResult<bool> {
        self.save_changed(user, |u| u.favorites.remove(company_id)).await
    }

    /// Apply `change` to a copy of `user`; when it reports a change, save the
    /// copy and write it back to `user`.
    async fn save_changed<F>(&self, user: &mut User, change: F) -> ProdigalResult<bool>
    where
        F: FnOnce(&mut User) -> bool,
    {
        let mut updated = user.clone();
        if !change(&mut updated) {
            return Ok(false);
        }
        self.users.save_lists(&updated).await?;
        *user = updated;
        Ok(true)
    }

    pub async fn get_history(&self, user: &User) -> ProdigalResult<Option<Vec<CompanyRef>>> {
        self.resolve(user.history.ids()).await
    }

    pub async fn get_favorites(&self, user: &User) -> ProdigalResult<Option<Vec<CompanyRef>>> {
        self.resolve(user.favorites.ids()).await
    }

    async fn resolve(&self, ids: &[i64]) -> ProdigalResult<Option<Vec<CompanyRef>>> {
        if ids.is_empty() {
            return Ok(None);
        }

        let mut refs = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.directory.find_by_id(id).await? {
                Some(company) => refs.push(company.to_ref()),
                None => tracing::warn!("Company {} referenced by a user list no longer exists", id),
            }
        }
        Ok(Some(refs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ProdigalDb;
    use crate::users::NewUser;
    use prodigal_core::Gender;

    struct Fixture {
        db: ProdigalDb,
        service: RecencyService,
        users: UserRepository,
        user: User,
        ids: Vec<i64>,
    }

    async fn fixture() -> Fixture {
        let db = ProdigalDb::in_memory().await.unwrap();
        let users = UserRepository::new(db.clone());
        let directory = CompanyDirectory::new(db.clone());

        let mut ids = Vec::new();
        for (symbol, name) in [
            ("AAPL", "Apple Inc."),
            ("MSFT", "Microsoft Corporation"),
            ("NVDA", "NVIDIA Corporation"),
            ("AMZN", "Amazon.com, Inc."),
            ("TSLA", "Tesla, Inc."),
            ("META", "Meta Platforms, Inc."),
        ] {
            ids.push(directory.insert(symbol, name, "Technology").await.unwrap().id);
        }

        let user = users
            .insert(&NewUser {
                username: "dana",
                email: "dana@example.com",
                gender: Gender::Other,
                password_hash: "x",
                salt: "y",
            })
            .await
            .unwrap()
            .unwrap();

        Fixture {
            db,
            service: RecencyService::new(users.clone(), directory),
            users,
            user,
            ids,
        }
    }

    #[tokio::test]
    async fn test_history_is_persisted_most_recent_first() {
        let mut fx = fixture().await;
        for &id in &fx.ids {
            fx.service.update_history(&mut fx.user, id).await.unwrap();
        }
        fx.service.update_history(&mut fx.user, fx.ids[3]).await.unwrap();

        let stored = fx.users.find_by_id(fx.user.id).await.unwrap().unwrap();
        assert_eq!(
            stored.history.ids(),
            &[fx.ids[3], fx.ids[5], fx.ids[4], fx.ids[2], fx.ids[1]]
        );

        let tickers: Vec<_> = fx
            .service
            .get_history(&stored)
            .await
            .unwrap()
            .unwrap()
            .into_iter()
            .map(|r| r.ticker)
            .collect();
        assert_eq!(tickers, vec!["AMZN", "META", "TSLA", "NVDA", "MSFT"]);
    }

    #[tokio::test]
    async fn test_empty_lists_resolve_to_none() {
        let fx = fixture().await;
        assert!(fx.service.get_history(&fx.user).await.unwrap().is_none());
        assert!(fx.service.get_favorites(&fx.user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_then_remove_favorite_clears_column() {
        let mut fx = fixture().await;
        let id = fx.ids[0];

        assert!(fx.service.add_favorite(&mut fx.user, id).await.unwrap());
        assert!(!fx.service.add_favorite(&mut fx.user, id).await.unwrap());

        let favorites = fx.service.get_favorites(&fx.user).await.unwrap().unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].name, "Apple Inc.");

        assert!(fx.service.remove_favorite(&mut fx.user, id).await.unwrap());
        assert!(!fx.service.remove_favorite(&mut fx.user, id).await.unwrap());

        let (column,): (Option<String>,) =
            sqlx::query_as("SELECT favorites FROM users WHERE user_id = ?")
                .bind(fx.user.id)
                .fetch_one(fx.db.pool())
                .await
                .unwrap();
        assert_eq!(column, None);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_user_unchanged() {
        let mut fx = fixture().await;
        fx.service.update_history(&mut fx.user, fx.ids[0]).await.unwrap();
        fx.service.add_favorite(&mut fx.user, fx.ids[0]).await.unwrap();
        let before = fx.user.clone();

        fx.db.pool().close().await;

        assert!(fx.service.update_history(&mut fx.user, fx.ids[1]).await.is_err());
        assert!(fx.service.add_favorite(&mut fx.user, fx.ids[1]).await.is_err());
        assert!(fx.service.remove_favorite(&mut fx.user, fx.ids[0]).await.is_err());
        assert_eq!(fx.user, before);
    }

    #[tokio::test]
    async fn test_favorites_keep_insertion_order() {
        let mut fx = fixture().await;
        fx.service.add_favorite(&mut fx.user, fx.ids[2]).await.unwrap();
        fx.service.add_favorite(&mut fx.user, fx.ids[0]).await.unwrap();

        let tickers: Vec<_> = fx
            .service
            .get_favorites(&fx.user)
            .await
            .unwrap()
            .unwrap()
            .into_iter()
            .map(|r| r.ticker)
            .collect();
        assert_eq!(tickers, vec!["NVDA", "AAPL"]);
    }
}
