//! Filter module
//!
//! Per-resource tables of query-string filters and their composition.
//!
//! # Overview
//!
//! Each filterable entity declares a static table of [`FilterDef`]s keyed
//! by query parameter name. [`FilterSet::resolve`] walks the table and keeps
//! only the entries whose key is present in the request; keys not in the
//! table are ignored. The kept filters are combined with logical AND, so
//! their order never changes the result. Storage backends either evaluate
//! a set in memory ([`FilterSet::matches`]) or render it as SQL from the
//! column and match operator recorded in each entry.

mod registry;
mod types;

pub use registry::{AUTHOR_FILTERS, BOOK_FILTERS, NAME_KEY, PUBLICATION_YEAR_KEY};
pub use types::{
    FieldValue, Filter, FilterDef, FilterSet, FilterValue, Filterable, MatchOp, ValueKind,
};
