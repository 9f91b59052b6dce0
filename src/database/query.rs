//! SQL rendering for paged, filtered reads

use crate::filter::{FilterSet, FilterValue, MatchOp};
use crate::pagination::Cursor;
use duckdb::types::Value;

/// A `SELECT` for one page plus its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl PageQuery {
    /// `SELECT columns FROM table WHERE id > page_id [AND filter...] ORDER BY id LIMIT limit`
    pub fn build<T: 'static>(
        table: &str,
        columns: &str,
        cursor: Cursor,
        filters: &FilterSet<T>,
    ) -> Self {
        let mut sql = format!("SELECT {columns} FROM {table} WHERE id > ?");
        let mut params = vec![Value::BigInt(
            i64::try_from(cursor.page_id()).unwrap_or(i64::MAX),
        )];

        for filter in filters.iter() {
            let column = filter.def().column;
            let value = match filter.value() {
                FilterValue::Text(text) => Value::Text(text.clone()),
                FilterValue::Integer(n) => Value::BigInt(*n),
                FilterValue::Unmatchable => {
                    sql.push_str(" AND FALSE");
                    continue;
                }
            };
            match filter.def().op {
                MatchOp::Contains => sql.push_str(&format!(" AND contains({column}, ?)")),
                MatchOp::Equals => sql.push_str(&format!(" AND {column} = ?")),
            }
            params.push(value);
        }

        sql.push_str(&format!(" ORDER BY id LIMIT {}", cursor.limit()));
        Self { sql, params }
    }
}

/// `?, ?, ...` with `count` placeholders
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
