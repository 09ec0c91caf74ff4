//! Parameterized statement builder.
//!
//! Placeholders are numbered (`?1`, `?2`, ...) in the order parameters are
//! pushed, so `params[n - 1]` always binds `?n`.

use crate::db::collation::FOLD_FUNCTION;
use rusqlite::types::Value;

const LIKE_ESCAPE: char = '\\';

/// SQL text and the parameters bound to its numbered placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    /// Builds `INSERT INTO table (c1, c2, ...) VALUES (?1, ?2, ...)`.
    ///
    /// `columns` and `params` are zipped positionally.
    pub fn insert(table: &'static str, columns: &[&'static str], params: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), params.len());
        let placeholders = (1..=columns.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            sql: format!(
                "INSERT INTO {table} ({}) VALUES ({placeholders});",
                columns.join(", ")
            ),
            params,
        }
    }
}

/// Builder for `SELECT` statements with optional AND-joined predicates.
///
/// A statement is only produced through `order_by`, so no listing can fall
/// back to store-default ordering.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    base: &'static str,
    conditions: Vec<String>,
    params: Vec<Value>,
}

impl SelectBuilder {
    /// Starts from a `SELECT ... FROM ...` text without `WHERE`/`ORDER BY`.
    pub fn new(base: &'static str) -> Self {
        Self {
            base,
            conditions: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Adds `column = ?n` unconditionally.
    pub fn require_id(mut self, column: &'static str, id: i64) -> Self {
        self.push(|index| format!("{column} = ?{index}"), Value::Integer(id));
        self
    }

    /// Adds `column = ?n` when `id` is present and positive.
    ///
    /// Zero and negative ids are malformed filter input and count as absent.
    pub fn filter_id(self, column: &'static str, id: Option<i64>) -> Self {
        match id.filter(|value| *value > 0) {
            Some(id) => self.require_id(column, id),
            None => self,
        }
    }

    /// Adds a case-insensitive substring match on `column` when `text` is
    /// non-blank. Both sides go through the registry fold function, so
    /// Cyrillic case is ignored too.
    pub fn filter_contains(mut self, column: &'static str, text: Option<&str>) -> Self {
        if let Some(text) = text.map(str::trim).filter(|value| !value.is_empty()) {
            self.push(
                |index| {
                    format!(
                        "{FOLD_FUNCTION}({column}) LIKE {FOLD_FUNCTION}(?{index}) ESCAPE '{LIKE_ESCAPE}'"
                    )
                },
                Value::Text(contains_pattern(text)),
            );
        }
        self
    }

    /// Finishes the statement with an explicit ordering.
    pub fn order_by(self, ordering: &'static str) -> Statement {
        let mut sql = String::from(self.base);
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(ordering);
        sql.push(';');

        Statement {
            sql,
            params: self.params,
        }
    }

    fn push(&mut self, condition: impl FnOnce(usize) -> String, value: Value) {
        self.params.push(value);
        self.conditions.push(condition(self.params.len()));
    }
}

/// Wraps `text` as a LIKE pattern matching it anywhere, literally.
///
/// `%`, `_` and the escape character itself are escaped so user input can
/// never widen the match.
pub fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::{contains_pattern, SelectBuilder, Statement};
    use rusqlite::types::Value;

    const BASE: &str = "SELECT * FROM people p";

    #[test]
    fn no_filters_emit_no_where_clause() {
        let statement = SelectBuilder::new(BASE)
            .filter_id("p.street_id", None)
            .filter_contains("p.name", None)
            .order_by("p.name ASC");
        assert_eq!(statement.sql, "SELECT * FROM people p ORDER BY p.name ASC;");
        assert!(statement.params.is_empty());
    }

    #[test]
    fn each_present_filter_adds_one_clause_and_one_param() {
        let statement = SelectBuilder::new(BASE)
            .filter_id("p.street_id", Some(4))
            .filter_contains("p.name", Some("Петр"))
            .order_by("p.name ASC");
        assert_eq!(
            statement.sql,
            "SELECT * FROM people p WHERE p.street_id = ?1 \
             AND registry_fold(p.name) LIKE registry_fold(?2) ESCAPE '\\' ORDER BY p.name ASC;"
        );
        assert_eq!(
            statement.params,
            vec![Value::Integer(4), Value::Text("%Петр%".to_string())]
        );
    }

    #[test]
    fn malformed_filters_are_treated_as_absent() {
        let statement = SelectBuilder::new(BASE)
            .filter_id("p.street_id", Some(0))
            .filter_id("p.house_id", Some(-3))
            .filter_contains("p.name", Some("   "))
            .order_by("p.id");
        assert!(!statement.sql.contains("WHERE"));
        assert!(statement.params.is_empty());
    }

    #[test]
    fn search_text_is_never_interpolated() {
        let hostile = "x' OR 1=1 --";
        let statement = SelectBuilder::new(BASE)
            .filter_contains("p.name", Some(hostile))
            .order_by("p.id");
        assert!(!statement.sql.contains(hostile));
        assert_eq!(statement.params, vec![Value::Text(format!("%{hostile}%"))]);
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(contains_pattern("50%_a\\b"), "%50\\%\\_a\\\\b%");
    }

    #[test]
    fn insert_numbers_placeholders_positionally() {
        let statement = Statement::insert(
            "houses",
            &["house_number", "street_id"],
            vec![Value::Text("12".to_string()), Value::Integer(1)],
        );
        assert_eq!(
            statement.sql,
            "INSERT INTO houses (house_number, street_id) VALUES (?1, ?2);"
        );
    }
}
