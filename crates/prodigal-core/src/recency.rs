//! History and favorites containers.
//!
//! Both lists are stored as a comma-separated id column that is `NULL` when
//! the list has no entries. Conversion to and from that column lives here and
//! is only called by the persistence layer.

use serde::{Deserialize, Serialize};

use crate::error::ProdigalError;

/// Maximum number of companies kept in a user's search history
pub const HISTORY_CAPACITY: usize = 5;

/// Most-recent-first list of viewed company ids, no duplicates, at most
/// [`HISTORY_CAPACITY`] entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    ids: Vec<i64>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a view of `company_id`, moving it to the front.
    pub fn record(&mut self, company_id: i64) {
        if let Some(pos) = self.ids.iter().position(|&id| id == company_id) {
            self.ids.remove(pos);
        }
        self.ids.insert(0, company_id);
        self.ids.truncate(HISTORY_CAPACITY);
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn from_column(column: Option<&str>) -> Result<Self, ProdigalError> {
        let mut ids = parse_column(column)?;
        dedup_in_order(&mut ids);
        ids.truncate(HISTORY_CAPACITY);
        Ok(Self { ids })
    }

    pub fn to_column(&self) -> Option<String> {
        format_column(&self.ids)
    }
}

/// Favorited company ids in the order they were added, no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorites {
    ids: Vec<i64>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the company was already a favorite.
    pub fn add(&mut self, company_id: i64) -> bool {
        if self.contains(company_id) {
            return false;
        }
        self.ids.push(company_id);
        true
    }

    /// Returns `false` if the company was not a favorite.
    pub fn remove(&mut self, company_id: i64) -> bool {
        match self.ids.iter().position(|&id| id == company_id) {
            Some(pos) => {
                self.ids.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, company_id: i64) -> bool {
        self.ids.contains(&company_id)
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn from_column(column: Option<&str>) -> Result<Self, ProdigalError> {
        let mut ids = parse_column(column)?;
        dedup_in_order(&mut ids);
        Ok(Self { ids })
    }

    pub fn to_column(&self) -> Option<String> {
        format_column(&self.ids)
    }
}

fn parse_column(column: Option<&str>) -> Result<Vec<i64>, ProdigalError> {
    let Some(raw) = column else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| ProdigalError::InvalidData(format!("bad company id in list: {s:?}")))
        })
        .collect()
}

fn format_column(ids: &[i64]) -> Option<String> {
    if ids.is_empty() {
        return None;
    }
    Some(
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(","),
    )
}

fn dedup_in_order(ids: &mut Vec<i64>) {
    let mut seen = Vec::with_capacity(ids.len());
    ids.retain(|id| {
        if seen.contains(id) {
            false
        } else {
            seen.push(*id);
            true
        }
    });
}
