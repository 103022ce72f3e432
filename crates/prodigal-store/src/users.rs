use prodigal_core::{Favorites, Gender, History, ProdigalError, ProdigalResult, User};
use sqlx::FromRow;

use crate::db::ProdigalDb;
use crate::db_error;

const USER_COLUMNS: &str =
    "user_id, username, email, gender, password, salt, history, favorites";

#[derive(Debug, FromRow)]
struct UserRow {
    user_id: i64,
    username: String,
    email: String,
    gender: String,
    password: String,
    salt: String,
    history: Option<String>,
    favorites: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = ProdigalError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.user_id,
            gender: row.gender.parse::<Gender>()?,
            history: History::from_column(row.history.as_deref())?,
            favorites: Favorites::from_column(row.favorites.as_deref())?,
            username: row.username,
            email: row.email,
            password_hash: row.password,
            salt: row.salt,
        })
    }
}

/// Fields of a user that does not have an id yet
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub gender: Gender,
    pub password_hash: &'a str,
    pub salt: &'a str,
}

#[derive(Clone)]
pub struct UserRepository {
    db: ProdigalDb,
}

impl UserRepository {
    pub fn new(db: ProdigalDb) -> Self {
        Self { db }
    }

    pub async fn find_by_username(&self, username: &str) -> ProdigalResult<Option<User>> {
        self.find_one("username", username).await
    }

    pub async fn find_by_email(&self, email: &str) -> ProdigalResult<Option<User>> {
        self.find_one("email", email).await
    }

    pub async fn find_by_id(&self, id: i64) -> ProdigalResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = ?"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await
        .map_err(db_error)?;

        row.map(User::try_from).transpose()
    }

    // `column` is always one of our own literals, never caller input.
    async fn find_one(&self, column: &str, value: &str) -> ProdigalResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {column} = ?"
        ))
        .bind(value)
        .fetch_optional(self.db.pool())
        .await
        .map_err(db_error)?;

        row.map(User::try_from).transpose()
    }

    pub async fn username_or_email_taken(&self, username: &str, email: &str) -> ProdigalResult<bool> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ? OR email = ?")
                .bind(username)
                .bind(email)
                .fetch_one(self.db.pool())
                .await
                .map_err(db_error)?;

        Ok(count > 0)
    }

    /// Insert a user. Returns `None` when the username or email is already
    /// taken (unique index violation).
    pub async fn insert(&self, new_user: &NewUser<'_>) -> ProdigalResult<Option<User>> {
        let result = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (username, email, gender, password, salt)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new_user.username)
        .bind(new_user.email)
        .bind(new_user.gender.as_str())
        .bind(new_user.password_hash)
        .bind(new_user.salt)
        .fetch_one(self.db.pool())
        .await;

        match result {
            Ok(row) => Ok(Some(row.try_into()?)),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
            Err(e) => Err(db_error(e)),
        }
    }

    /// Write the user's history and favorites columns. Last write wins.
    pub async fn save_lists(&self, user: &User) -> ProdigalResult<()> {
        sqlx::query("UPDATE users SET history = ?, favorites = ? WHERE user_id = ?")
            .bind(user.history.to_column())
            .bind(user.favorites.to_column())
            .bind(user.id)
            .execute(self.db.pool())
            .await
            .map_err(db_error)?;

        Ok(())
    }
}
