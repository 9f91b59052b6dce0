//! Catalog schema
//!
//! DuckDB has no `AUTOINCREMENT`; each table draws its id from a sequence.
//! Foreign keys are enforced on insert, so a relation row naming a missing
//! author or book fails the statement.

/// Idempotent DDL for the catalog tables
pub const SCHEMA_SQL: &str = "
CREATE SEQUENCE IF NOT EXISTS author_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS book_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS author_book_id_seq START 1;

CREATE TABLE IF NOT EXISTS author (
    id BIGINT PRIMARY KEY DEFAULT nextval('author_id_seq'),
    name VARCHAR NOT NULL
);

CREATE TABLE IF NOT EXISTS book (
    id BIGINT PRIMARY KEY DEFAULT nextval('book_id_seq'),
    name VARCHAR NOT NULL,
    edition BIGINT NOT NULL,
    publication_year BIGINT NOT NULL
);

CREATE TABLE IF NOT EXISTS author_book (
    id BIGINT PRIMARY KEY DEFAULT nextval('author_book_id_seq'),
    author_id BIGINT REFERENCES author(id),
    book_id BIGINT REFERENCES book(id)
);
";
