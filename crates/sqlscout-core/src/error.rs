//! Error and issue types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Errors raised at the library boundary (loading inputs, tokenizing)
///
/// Validation itself never fails; these only surface while reading the
/// schema document, the configuration or source files.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum Error {
    #[error("failed to read '{}'", .path.display())]
    #[diagnostic(code(sqlscout::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid schema document: {0}")]
    #[diagnostic(
        code(sqlscout::schema),
        help("expected a JSON object keyed by table name, each holding a \"columns\" array")
    )]
    SchemaParse(#[from] serde_json::Error),

    #[error("failed to tokenize SQL: {0}")]
    #[diagnostic(code(sqlscout::tokenize))]
    Tokenize(String),

    #[error("invalid configuration: {0}")]
    #[diagnostic(code(sqlscout::config))]
    InvalidConfig(String),
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single finding produced by validating one embedded query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub file: Option<String>,
    pub line: Option<usize>,
    /// The table, column or literal the issue is about
    pub offending: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn error(
        kind: IssueKind,
        offending: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            file: None,
            line: None,
            offending: offending.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn warning(
        kind: IssueKind,
        offending: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            file: None,
            line: None,
            offending: offending.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Attach a suggestion. A suggestion equal to the offending text is dropped.
    pub fn with_suggestion(mut self, suggestion: Option<String>) -> Self {
        self.suggestion = suggestion.filter(|s| *s != self.offending);
        self
    }

    pub fn at(mut self, file: Option<&str>, line: Option<usize>) -> Self {
        self.file = file.map(str::to_string);
        self.line = line;
        self
    }

    /// Get the issue code string (e.g., "E0001")
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

/// Types of issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    /// E0001: Table not found
    TableNotFound,
    /// E0002: Column not found
    ColumnNotFound,
    /// E0003: Literal type does not match the column type
    TypeMismatch,
}

impl IssueKind {
    pub fn code(&self) -> &'static str {
        match self {
            IssueKind::TableNotFound => "E0001",
            IssueKind::ColumnNotFound => "E0002",
            IssueKind::TypeMismatch => "E0003",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IssueKind::TableNotFound => "table-not-found",
            IssueKind::ColumnNotFound => "column-not-found",
            IssueKind::TypeMismatch => "type-mismatch",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestion_equal_to_offending_is_dropped() {
        let issue = ValidationIssue::error(IssueKind::ColumnNotFound, "location", "msg")
            .with_suggestion(Some("location".to_string()));
        assert_eq!(issue.suggestion, None);

        let issue = ValidationIssue::error(IssueKind::ColumnNotFound, "locaton", "msg")
            .with_suggestion(Some("location".to_string()));
        assert_eq!(issue.suggestion.as_deref(), Some("location"));
    }

    #[test]
    fn test_issue_serializes_lowercase_severity() {
        let issue = ValidationIssue::warning(IssueKind::TypeMismatch, "id", "msg")
            .at(Some("app.py"), Some(3));
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["kind"], "type-mismatch");
        assert_eq!(json["file"], "app.py");
        assert_eq!(json["line"], 3);
    }
}
