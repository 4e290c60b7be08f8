//! Keyword tables used when tagging words

/// Data-manipulation statement keywords
const DML: &[&str] = &["SELECT", "INSERT", "UPDATE", "DELETE", "MERGE"];

/// Data-definition statement keywords
const DDL: &[&str] = &["CREATE", "DROP", "ALTER", "TRUNCATE"];

/// Clause and operator words that are never names.
///
/// Deliberately small: sqlparser knows hundreds of keywords (`name`,
/// `location`, `status` ...) that are ordinary column names in practice.
const CLAUSE: &[&str] = &[
    "ALL", "AND", "AS", "ASC", "BETWEEN", "BY", "CASCADE", "CASE", "CONFLICT", "CROSS",
    "DEFAULT", "DESC", "DISTINCT", "DO", "ELSE", "END", "EXCEPT", "EXISTS", "FETCH", "FROM",
    "FULL", "GROUP", "HAVING", "IF", "ILIKE", "IN", "INNER", "INTERSECT", "INTO", "IS", "JOIN",
    "LATERAL", "LEFT", "LIKE", "LIMIT", "NATURAL", "NOT", "NOTHING", "OFFSET", "ON", "ONLY",
    "OR", "ORDER", "OUTER", "RECURSIVE", "RESTRICT", "RETURNING", "RIGHT", "SET", "TABLE",
    "THEN", "UNION", "USING", "VALUES", "WHEN", "WHERE", "WITH",
];

/// Words that lex as keywords but are literal values
const LITERAL: &[&str] = &["TRUE", "FALSE", "NULL"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WordClass {
    Dml,
    Ddl,
    Clause,
    Literal,
    Name,
}

/// Classify an unquoted word
pub(crate) fn classify_word(word: &str) -> WordClass {
    let upper = word.to_ascii_uppercase();
    let upper = upper.as_str();
    if DML.contains(&upper) {
        WordClass::Dml
    } else if DDL.contains(&upper) {
        WordClass::Ddl
    } else if CLAUSE.contains(&upper) {
        WordClass::Clause
    } else if LITERAL.contains(&upper) {
        WordClass::Literal
    } else {
        WordClass::Name
    }
}

/// Whether `text` is a keyword of any kind (statement, clause or literal)
pub fn is_reserved(text: &str) -> bool {
    classify_word(text) != WordClass::Name
}

/// A bare identifier-shaped word: ASCII letter or `_` first, then letters,
/// digits or `_`
pub fn is_identifier_shaped(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_word_is_case_insensitive() {
        assert_eq!(classify_word("select"), WordClass::Dml);
        assert_eq!(classify_word("Truncate"), WordClass::Ddl);
        assert_eq!(classify_word("from"), WordClass::Clause);
        assert_eq!(classify_word("null"), WordClass::Literal);
        assert_eq!(classify_word("location"), WordClass::Name);
    }

    #[test]
    fn test_identifier_shape() {
        assert!(is_identifier_shaped("employee_id"));
        assert!(is_identifier_shaped("_tmp1"));
        assert!(!is_identifier_shaped("1abc"));
        assert!(!is_identifier_shaped("a.b"));
        assert!(!is_identifier_shaped(""));
    }
}
