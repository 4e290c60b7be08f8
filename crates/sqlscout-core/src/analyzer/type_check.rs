//! Literal type checks over the raw statement text

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{IssueKind, ValidationIssue};
use crate::schema::{ColumnDef, Schema};
use crate::types::{infer_literal_type, is_compatible, normalize_column_type, TypeGroup};

/// `column = literal`, `column < literal`, `column > literal`
static COMPARISON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*(=|<|>)\s*('[^']*'|[A-Za-z0-9_.]+)")
        .expect("comparison pattern is valid")
});

/// `INSERT INTO t (c1, c2) VALUES (v1, v2)`
static INSERT_VALUES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bINSERT\s+INTO\s+[\w."`]+\s*\(([^)]*)\)\s*VALUES\s*\(([^)]*)\)"#)
        .expect("insert pattern is valid")
});

/// Checks literals in a statement against the columns of known tables
pub struct TypeChecker<'a> {
    schema: &'a Schema,
    /// Tables confirmed to exist, in the order they should be consulted
    tables: &'a [&'a str],
}

impl<'a> TypeChecker<'a> {
    pub fn new(schema: &'a Schema, tables: &'a [&'a str]) -> Self {
        Self { schema, tables }
    }

    /// Run both the comparison and the INSERT checks
    pub fn check(&self, sql: &str) -> Vec<ValidationIssue> {
        let mut issues = self.check_comparisons(sql);
        issues.extend(self.check_insert_values(sql));
        issues
    }

    /// `column op literal` anywhere in the text, against every table in scope
    pub fn check_comparisons(&self, sql: &str) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for caps in COMPARISON_RE.captures_iter(sql) {
            let (Some(column), Some(literal)) = (caps.get(1), caps.get(3)) else {
                continue;
            };
            let Some(group) = infer_literal_type(literal.as_str()) else {
                continue;
            };
            for table in self.tables {
                if let Some(def) = self.column(table, column.as_str()) {
                    issues.extend(mismatch(def, literal.as_str(), group));
                }
            }
        }

        issues
    }

    /// Pairwise column/value check of a single-row INSERT against the first
    /// table in scope. Lists of different length are skipped.
    pub fn check_insert_values(&self, sql: &str) -> Vec<ValidationIssue> {
        let Some(caps) = INSERT_VALUES_RE.captures(sql) else {
            return Vec::new();
        };
        let (Some(columns), Some(values)) = (caps.get(1), caps.get(2)) else {
            return Vec::new();
        };
        let Some(table) = self.tables.first() else {
            return Vec::new();
        };

        let columns: Vec<&str> = columns.as_str().split(',').map(str::trim).collect();
        let values: Vec<&str> = values.as_str().split(',').map(str::trim).collect();
        if columns.len() != values.len() {
            tracing::debug!(
                columns = columns.len(),
                values = values.len(),
                "INSERT column/value arity differs, skipping type check"
            );
            return Vec::new();
        }

        columns
            .iter()
            .zip(&values)
            .filter_map(|(column, value)| {
                let def = self.column(table, column)?;
                let group = infer_literal_type(value)?;
                mismatch(def, value, group)
            })
            .collect()
    }

    fn column(&self, table: &str, column: &str) -> Option<&'a ColumnDef> {
        self.schema.get_table(table)?.get_column(column)
    }
}

fn mismatch(column: &ColumnDef, literal: &str, group: TypeGroup) -> Option<ValidationIssue> {
    if is_compatible(&column.data_type, group) {
        return None;
    }
    let expected = normalize_column_type(&column.data_type);
    let message = match TypeGroup::of_type(&expected) {
        Some(expected_group) => format!(
            "Column '{}' expects {} ({}) but literal {} looks like {}",
            column.name, expected, expected_group, literal, group
        ),
        None => format!(
            "Column '{}' expects {} but literal {} looks like {}",
            column.name, expected, literal, group
        ),
    };
    Some(ValidationIssue::warning(
        IssueKind::TypeMismatch,
        column.name.clone(),
        message,
    ))
}
