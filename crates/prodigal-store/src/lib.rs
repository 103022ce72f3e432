pub mod accounts;
pub mod db;
pub mod directory;
pub mod recency;
pub mod users;

pub use accounts::{hash_password, validate_email, CredentialManager, MAX_EMAIL_LEN, MAX_USERNAME_LEN};
pub use db::ProdigalDb;
pub use directory::CompanyDirectory;
pub use recency::RecencyService;
pub use users::UserRepository;

use prodigal_core::ProdigalError;

pub(crate) fn db_error(e: sqlx::Error) -> ProdigalError {
    ProdigalError::Database(e.to_string())
}
