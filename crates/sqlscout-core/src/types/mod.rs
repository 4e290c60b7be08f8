//! Coarse type groups for literal/column compatibility

use serde::{Deserialize, Serialize};

/// Coarse family a column type or literal belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeGroup {
    Numeric,
    String,
    Boolean,
}

impl TypeGroup {
    /// Normalized type names belonging to this group
    pub fn members(&self) -> &'static [&'static str] {
        match self {
            TypeGroup::Numeric => &[
                "integer", "bigint", "smallint", "decimal", "numeric", "real", "double",
            ],
            TypeGroup::String => &["varchar", "text", "char"],
            TypeGroup::Boolean => &["boolean"],
        }
    }

    /// Group of a normalized column type, if it belongs to one
    pub fn of_type(normalized: &str) -> Option<TypeGroup> {
        [TypeGroup::Numeric, TypeGroup::String, TypeGroup::Boolean]
            .into_iter()
            .find(|group| group.members().contains(&normalized))
    }
}

impl std::fmt::Display for TypeGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeGroup::Numeric => write!(f, "numeric"),
            TypeGroup::String => write!(f, "string"),
            TypeGroup::Boolean => write!(f, "boolean"),
        }
    }
}

/// Guess the group of a literal as it appears in SQL text.
///
/// `None` means "unknown" and is never reported.
pub fn infer_literal_type(text: &str) -> Option<TypeGroup> {
    let text = text.trim();
    if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
        Some(TypeGroup::String)
    } else if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        Some(TypeGroup::Numeric)
    } else if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false") {
        Some(TypeGroup::Boolean)
    } else {
        None
    }
}

/// Map a raw database type name onto the names used in the group table.
///
/// `character varying(20)` -> `varchar`, `int4` -> `integer`,
/// `double precision` -> `double`; anything else is only lowercased.
pub fn normalize_column_type(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    let mapped = if lower.starts_with("character") || lower.starts_with("varchar") {
        "varchar"
    } else if lower.starts_with("int") {
        "integer"
    } else if lower.starts_with("bool") {
        "boolean"
    } else if lower.starts_with("double") {
        "double"
    } else {
        return lower;
    };
    mapped.to_string()
}

/// Whether a literal of `literal` group may be compared with or assigned to
/// a column of type `column_type`. Types outside every group are accepted.
pub fn is_compatible(column_type: &str, literal: TypeGroup) -> bool {
    match TypeGroup::of_type(&normalize_column_type(column_type)) {
        Some(group) => group == literal,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_literal_type() {
        assert_eq!(infer_literal_type("'hi'"), Some(TypeGroup::String));
        assert_eq!(infer_literal_type("''"), Some(TypeGroup::String));
        assert_eq!(infer_literal_type("'1'"), Some(TypeGroup::String));
        assert_eq!(infer_literal_type("123"), Some(TypeGroup::Numeric));
        assert_eq!(infer_literal_type("TRUE"), Some(TypeGroup::Boolean));
        assert_eq!(infer_literal_type("false"), Some(TypeGroup::Boolean));
        assert_eq!(infer_literal_type("1.5"), None);
        assert_eq!(infer_literal_type("other_col"), None);
        assert_eq!(infer_literal_type("'"), None);
        assert_eq!(infer_literal_type(""), None);
    }

    #[test]
    fn test_normalize_column_type() {
        assert_eq!(normalize_column_type("character varying"), "varchar");
        assert_eq!(normalize_column_type("VARCHAR(100)"), "varchar");
        assert_eq!(normalize_column_type("int4"), "integer");
        assert_eq!(normalize_column_type("integer"), "integer");
        assert_eq!(normalize_column_type("boolean"), "boolean");
        assert_eq!(normalize_column_type("double precision"), "double");
        assert_eq!(normalize_column_type("Text"), "text");
        assert_eq!(normalize_column_type("uuid"), "uuid");
    }

    #[test]
    fn test_type_group_lookup() {
        assert_eq!(TypeGroup::of_type("bigint"), Some(TypeGroup::Numeric));
        assert_eq!(TypeGroup::of_type("text"), Some(TypeGroup::String));
        assert_eq!(TypeGroup::of_type("boolean"), Some(TypeGroup::Boolean));
        assert_eq!(TypeGroup::of_type("jsonb"), None);
    }

    #[test]
    fn test_is_compatible() {
        assert!(is_compatible("integer", TypeGroup::Numeric));
        assert!(!is_compatible("integer", TypeGroup::String));
        assert!(!is_compatible("character varying", TypeGroup::Numeric));
        assert!(is_compatible("text", TypeGroup::String));
        assert!(!is_compatible("bool", TypeGroup::Numeric));
    }

    #[test]
    fn test_unknown_types_are_always_compatible() {
        for group in [TypeGroup::Numeric, TypeGroup::String, TypeGroup::Boolean] {
            assert!(is_compatible("uuid", group));
            assert!(is_compatible("timestamp with time zone", group));
            assert!(is_compatible("jsonb", group));
        }
    }
}
