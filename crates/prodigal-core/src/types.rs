use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProdigalError;
use crate::recency::{Favorites, History};

/// A listed company from the reference directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub symbol: String,
    pub name: String,
    pub sector: String,
}

impl Company {
    pub fn to_ref(&self) -> CompanyRef {
        CompanyRef {
            ticker: self.symbol.clone(),
            name: self.name.clone(),
        }
    }
}

/// (ticker, display name) pair used for history, favorites and sector listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRef {
    pub ticker: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ProdigalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(ProdigalError::InvalidData(format!("unknown gender: {other}"))),
        }
    }
}

/// A registered site user.
///
/// `password_hash` is the hex SHA-256 of `salt ++ password`; the plaintext
/// password is never kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub gender: Gender,
    pub password_hash: String,
    pub salt: String,
    pub history: History,
    pub favorites: Favorites,
}

/// Result of an account signup attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupOutcome {
    Created(User),
    DuplicateAccount,
    /// Bad format, or longer than the email column allows
    MalformedEmail,
    /// Empty, or longer than the username column allows
    InvalidUsername,
}

impl SignupOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, SignupOutcome::Created(_))
    }
}

/// A single headline scraped from a company page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    pub link: String,
}

/// Everything extracted from a company's listing page
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompanyPage {
    pub company_name: String,
    pub news: Vec<NewsItem>,
    /// `None` when the page has no description section
    pub description: Option<Vec<String>>,
}

/// Latest trading day figures from the quote service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotePoint {
    pub high: f64,
    pub low: f64,
    pub opening: f64,
    pub closing: f64,
    pub volume: f64,
    pub date: String,
}

/// Quote service response: the latest point plus the raw series for charting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub latest: QuotePoint,
    pub series: Vec<serde_json::Value>,
}
