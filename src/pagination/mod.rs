//! Pagination module
//!
//! Decodes the `limit` / `page_id` query parameters into a [`Cursor`] and
//! derives the cursor of the following page.
//!
//! # Overview
//!
//! A cursor is decoded once per request, before filters are resolved, and
//! the same value is handed to storage and to next-cursor computation.
//! `page_id` means "rows with an id greater than this" for the relational
//! backend and "skip this many rows" for the in-memory backend; with no
//! filters and dense ids both read the same.

mod cursor;

pub use cursor::{
    Cursor, CursorDecoder, NextPagePolicy, DEFAULT_LIMIT, LIMIT_PARAM, PAGE_ID_PARAM,
};
