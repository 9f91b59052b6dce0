//! Filter tables for authors and books
//!
//! Adding a filter means adding a table entry; nothing else branches on
//! filter keys.

use super::types::{FieldValue, FilterDef, Filterable, MatchOp, ValueKind};
use crate::types::{Author, Book};

/// Substring filter on `name`
pub const NAME_KEY: &str = "name";

/// Exact filter on a book's publication year
pub const PUBLICATION_YEAR_KEY: &str = "publication_year";

fn author_name(author: &Author) -> FieldValue<'_> {
    FieldValue::Text(&author.name)
}

fn book_name(book: &Book) -> FieldValue<'_> {
    FieldValue::Text(&book.name)
}

fn book_publication_year(book: &Book) -> FieldValue<'_> {
    FieldValue::Integer(i64::from(book.publication_year))
}

pub const AUTHOR_FILTERS: &[FilterDef<Author>] = &[FilterDef {
    key: NAME_KEY,
    column: "name",
    op: MatchOp::Contains,
    kind: ValueKind::Text,
    field: author_name,
}];

pub const BOOK_FILTERS: &[FilterDef<Book>] = &[
    FilterDef {
        key: NAME_KEY,
        column: "name",
        op: MatchOp::Contains,
        kind: ValueKind::Text,
        field: book_name,
    },
    FilterDef {
        key: PUBLICATION_YEAR_KEY,
        column: "publication_year",
        op: MatchOp::Equals,
        kind: ValueKind::Integer,
        field: book_publication_year,
    },
];

impl Filterable for Author {
    const FILTERS: &'static [FilterDef<Self>] = AUTHOR_FILTERS;
}

impl Filterable for Book {
    const FILTERS: &'static [FilterDef<Self>] = BOOK_FILTERS;
}
