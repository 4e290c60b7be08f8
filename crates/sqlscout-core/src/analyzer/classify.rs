//! Statement classification by leading keyword

use serde::Serialize;

use crate::tokens::TokenNode;

/// Statement shapes the extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatementKind {
    Select,
    Update,
    Insert,
    Delete,
    Drop,
    Truncate,
    Unknown,
}

impl StatementKind {
    fn from_keyword(keyword: &str) -> Self {
        match keyword.to_ascii_uppercase().as_str() {
            "SELECT" => StatementKind::Select,
            "UPDATE" => StatementKind::Update,
            "INSERT" => StatementKind::Insert,
            "DELETE" => StatementKind::Delete,
            "DROP" => StatementKind::Drop,
            "TRUNCATE" => StatementKind::Truncate,
            _ => StatementKind::Unknown,
        }
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StatementKind::Select => "SELECT",
            StatementKind::Update => "UPDATE",
            StatementKind::Insert => "INSERT",
            StatementKind::Delete => "DELETE",
            StatementKind::Drop => "DROP",
            StatementKind::Truncate => "TRUNCATE",
            StatementKind::Unknown => "UNKNOWN",
        };
        write!(f, "{}", name)
    }
}

/// The first keyword of any tag decides the kind; a statement that starts
/// with e.g. `WITH` is [`StatementKind::Unknown`].
pub fn classify(tokens: &[TokenNode]) -> StatementKind {
    tokens
        .iter()
        .find_map(TokenNode::keyword_text)
        .map_or(StatementKind::Unknown, StatementKind::from_keyword)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::SqlDialect;
    use crate::tokens::tokenize;

    fn kind(sql: &str) -> StatementKind {
        classify(&tokenize(sql, SqlDialect::PostgreSQL).unwrap())
    }

    #[test]
    fn test_classify_statement_kinds() {
        assert_eq!(kind("SELECT a FROM t"), StatementKind::Select);
        assert_eq!(kind("select a from t"), StatementKind::Select);
        assert_eq!(kind("UPDATE t SET a = 1"), StatementKind::Update);
        assert_eq!(kind("INSERT INTO t (a) VALUES (1)"), StatementKind::Insert);
        assert_eq!(kind("DELETE FROM t"), StatementKind::Delete);
        assert_eq!(kind("DROP TABLE t"), StatementKind::Drop);
        assert_eq!(kind("TRUNCATE TABLE t"), StatementKind::Truncate);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(kind("CREATE TABLE t (a int)"), StatementKind::Unknown);
        assert_eq!(
            kind("WITH x AS (SELECT 1) SELECT * FROM x"),
            StatementKind::Unknown
        );
        assert_eq!(kind(""), StatementKind::Unknown);
        assert_eq!(classify(&[]), StatementKind::Unknown);
    }

    #[test]
    fn test_first_keyword_of_any_tag_decides() {
        let tokens = vec![
            TokenNode::identifier("stray"),
            TokenNode::Keyword("delete".to_string()),
            TokenNode::DmlKeyword("SELECT".to_string()),
        ];
        assert_eq!(classify(&tokens), StatementKind::Delete);
    }
}
