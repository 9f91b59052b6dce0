//! Catalog entities
//!
//! Authors and books as they are exposed over HTTP, the create-book
//! request and its validated form, and the raw query parameters every
//! list request is decoded from.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// An entity addressed by a numeric id; pages are ordered by this id
pub trait Entity {
    /// Entity id, assigned by storage
    fn id(&self) -> u64;
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Raw query-string pairs in request order
///
/// Lookups return the first value for a repeated key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl From<Vec<(String, String)>> for QueryParams {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ============================================================================
// Author
// ============================================================================

/// A book author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: u64,
    pub name: String,
}

impl Author {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Entity for Author {
    fn id(&self) -> u64 {
        self.id
    }
}

// ============================================================================
// Book
// ============================================================================

/// A book and the ids of its authors
///
/// `author_ids` is not stored on the book row; storage fills it from the
/// author/book relation after the page of books has been fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: u64,
    pub name: String,
    pub edition: u32,
    pub publication_year: u32,
    #[serde(rename = "authors")]
    pub author_ids: Vec<u64>,
}

impl Book {
    /// Build a book from a validated create request and its assigned id
    pub fn from_new(id: u64, new_book: &NewBook) -> Self {
        Self {
            id,
            name: new_book.name.clone(),
            edition: new_book.edition,
            publication_year: new_book.publication_year,
            author_ids: new_book.author_ids.clone(),
        }
    }
}

impl Entity for Book {
    fn id(&self) -> u64 {
        self.id
    }
}

// ============================================================================
// Create Book
// ============================================================================

/// Body of `POST /books`
///
/// Absent fields deserialize to their zero value so that validation, not
/// decoding, reports which field is missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBookRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub edition: u32,
    #[serde(default)]
    pub publication_year: u32,
    #[serde(default, rename = "authors")]
    pub author_ids: Option<Vec<u64>>,
}

/// A create-book request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub name: String,
    pub edition: u32,
    pub publication_year: u32,
    pub author_ids: Vec<u64>,
}

impl CreateBookRequest {
    /// Check required fields in declaration order; the first failure wins.
    pub fn validate(self) -> Result<NewBook> {
        if self.name.is_empty() {
            return Err(Error::validation("name", "Missing name value"));
        }
        if self.edition == 0 {
            return Err(Error::validation("edition", "Missing edition value"));
        }
        if self.publication_year == 0 {
            return Err(Error::validation(
                "publication_year",
                "Missing publication_year value",
            ));
        }
        let author_ids = match self.author_ids {
            Some(ids) if !ids.is_empty() => ids,
            _ => return Err(Error::validation("authors", "Missing authors value")),
        };

        Ok(NewBook {
            name: self.name,
            edition: self.edition,
            publication_year: self.publication_year,
            author_ids,
        })
    }
}
