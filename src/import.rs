//! CSV author import
//!
//! The first field of each row is an author name. A leading `name` header
//! and blank lines are skipped; quoted fields may contain commas and `""`
//! escapes.

use crate::error::{Error, Result, ResultExt};
use crate::storage::Storage;
use std::path::Path;

/// Header cell that marks the first row as a header
const NAME_HEADER: &str = "name";

/// Import every author named in the CSV file at `path`.
///
/// Returns the number of authors inserted.
pub async fn import_authors_file(storage: &dyn Storage, path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let body = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let count = import_authors(storage, &body).await?;
    tracing::info!(path = %path.display(), count, "authors imported");
    Ok(count)
}

/// Import the authors named in CSV `body`
pub async fn import_authors(storage: &dyn Storage, body: &str) -> Result<usize> {
    let names = author_names(body);
    for (i, name) in names.iter().enumerate() {
        storage.insert_author(name).await?;
        if (i + 1) % 1_000 == 0 {
            tracing::info!(imported = i + 1, "import progress");
        }
    }
    Ok(names.len())
}

/// Author names from CSV `body`, in file order
pub fn author_names(body: &str) -> Vec<String> {
    let mut names = Vec::new();

    for (index, line) in body.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let Some(name) = parse_csv_line(line, ',').into_iter().next() else {
            continue;
        };
        if index == 0 && name.eq_ignore_ascii_case(NAME_HEADER) {
            continue;
        }
        if name.is_empty() {
            tracing::warn!(line = index + 1, "skipping row with empty name");
            continue;
        }
        names.push(name);
    }

    names
}

/// Split one CSV line into trimmed fields
fn parse_csv_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '"' {
            if in_quotes {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                in_quotes = true;
            }
        } else if c == delimiter && !in_quotes {
            fields.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }

    fields.push(current.trim().to_string());
    fields
}
