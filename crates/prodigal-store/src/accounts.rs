//! Account creation and login verification.

use prodigal_core::{Gender, ProdigalResult, SignupOutcome, User};
use rand::rngs::OsRng;
use rand::RngCore;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

use crate::users::{NewUser, UserRepository};

/// Random bytes per salt, stored hex-encoded
const SALT_BYTES: usize = 48;

/// Column limits from `schema.sql`, counted in characters like SQLite `length()`
pub const MAX_USERNAME_LEN: usize = 50;
pub const MAX_EMAIL_LEN: usize = 50;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9.\-_]*@[a-zA-Z0-9]+\.[a-zA-Z]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Format check only: `local@domain.tld` where the local part starts with an
/// alphanumeric, the domain is alphanumeric and the tld alphabetic.
pub fn validate_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Hex SHA-256 of `salt ++ password`
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[derive(Clone)]
pub struct CredentialManager {
    users: UserRepository,
}

impl CredentialManager {
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// Create a new account. A taken username or email is reported as
    /// [`SignupOutcome::DuplicateAccount`] and input that does not fit the
    /// user columns as `InvalidUsername` / `MalformedEmail`; nothing is
    /// written in either case.
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        gender: Gender,
        password: &str,
    ) -> ProdigalResult<SignupOutcome> {
        let username_len = username.chars().count();
        if username_len == 0 || username_len > MAX_USERNAME_LEN {
            tracing::debug!("Signup rejected, username length {}", username_len);
            return Ok(SignupOutcome::InvalidUsername);
        }
        if email.chars().count() > MAX_EMAIL_LEN {
            tracing::debug!("Signup rejected, email too long for {}", username);
            return Ok(SignupOutcome::MalformedEmail);
        }

        if self.users.username_or_email_taken(username, email).await? {
            tracing::debug!("Signup rejected, username or email already registered: {}", username);
            return Ok(SignupOutcome::DuplicateAccount);
        }

        let salt = generate_salt();
        let password_hash = hash_password(&salt, password);

        let new_user = NewUser {
            username,
            email,
            gender,
            password_hash: &password_hash,
            salt: &salt,
        };

        // The unique indexes catch a concurrent signup that slipped past the check above
        match self.users.insert(&new_user).await? {
            Some(user) => {
                tracing::info!("Created user {} (id {})", user.username, user.id);
                Ok(SignupOutcome::Created(user))
            }
            None => Ok(SignupOutcome::DuplicateAccount),
        }
    }

    /// `identifier` is tried as a username first, then as an email.
    pub async fn verify_login(&self, identifier: &str, password: &str) -> ProdigalResult<Option<User>> {
        let user = match self.users.find_by_username(identifier).await? {
            Some(user) => user,
            None => match self.users.find_by_email(identifier).await? {
                Some(user) => user,
                None => {
                    tracing::debug!("Login failed, unknown identifier");
                    return Ok(None);
                }
            },
        };

        if hash_password(&user.salt, password) != user.password_hash {
            tracing::debug!("Login failed, bad password for {}", user.username);
            return Ok(None);
        }

        Ok(Some(user))
    }
}
