//! Cursor decoding and next-cursor computation

use crate::error::{Error, Result};
use crate::types::QueryParams;
use serde::{Deserialize, Serialize};

/// Query parameter carrying the page size
pub const LIMIT_PARAM: &str = "limit";

/// Query parameter carrying the page position
pub const PAGE_ID_PARAM: &str = "page_id";

/// Page size used when a request does not name one
pub const DEFAULT_LIMIT: u32 = 2;

/// Pagination position of a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    page_id: u64,
    limit: u32,
}

impl Cursor {
    /// Create a cursor; `limit` must be positive
    pub fn new(page_id: u64, limit: u32) -> Result<Self> {
        if limit == 0 {
            return Err(bad_limit());
        }
        Ok(Self { page_id, limit })
    }

    /// Cursor for the first page
    pub fn first(limit: u32) -> Result<Self> {
        Self::new(0, limit)
    }

    pub fn page_id(&self) -> u64 {
        self.page_id
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// `limit` as a slice length
    pub fn limit_usize(&self) -> usize {
        self.limit as usize
    }

    /// Page id a client sends to continue after this page
    pub fn following_page_id(&self) -> u64 {
        if self.page_id == 0 {
            u64::from(self.limit)
        } else {
            self.page_id.saturating_add(u64::from(self.limit))
        }
    }
}

// ============================================================================
// Next Page Policy
// ============================================================================

/// When a response carries `next_page_id`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum NextPagePolicy {
    /// Any non-empty page advertises a next page, even a short one
    #[default]
    AnyNonEmpty,
    /// Only a page filled up to `limit` advertises a next page
    FullPageOnly,
}

impl NextPagePolicy {
    /// Next page id for a page of `returned` rows fetched with `cursor`
    pub fn next_page_id(self, cursor: Cursor, returned: usize) -> Option<u64> {
        let advertise = match self {
            Self::AnyNonEmpty => returned > 0,
            Self::FullPageOnly => returned > 0 && returned >= cursor.limit_usize(),
        };
        advertise.then(|| cursor.following_page_id())
    }
}

// ============================================================================
// Decoder
// ============================================================================

/// Decodes request query parameters into a [`Cursor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorDecoder {
    default_limit: u32,
}

impl Default for CursorDecoder {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
        }
    }
}

impl CursorDecoder {
    /// Create a decoder with a custom default limit
    pub fn new(default_limit: u32) -> Result<Self> {
        if default_limit == 0 {
            return Err(Error::invalid_config(
                "default_limit",
                "must be a positive integer",
            ));
        }
        Ok(Self { default_limit })
    }

    pub fn default_limit(&self) -> u32 {
        self.default_limit
    }

    /// Decode `limit` and `page_id`.
    ///
    /// A present `limit` must be a positive integer and a present `page_id`
    /// a non-negative integer; absent ones fall back to the default limit
    /// and page 0.
    pub fn decode(&self, params: &QueryParams) -> Result<Cursor> {
        let limit = match params.get(LIMIT_PARAM) {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or_else(bad_limit)?,
            None => self.default_limit,
        };

        let page_id = match params.get(PAGE_ID_PARAM) {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                Error::validation(
                    PAGE_ID_PARAM,
                    "bad page_id: expected a non-negative integer",
                )
            })?,
            None => 0,
        };

        tracing::debug!(page_id, limit, "decoded cursor");
        Cursor::new(page_id, limit)
    }
}

fn bad_limit() -> Error {
    Error::validation(LIMIT_PARAM, "bad limit: expected a positive integer")
}
