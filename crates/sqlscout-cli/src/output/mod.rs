//! Output formatting

use miette::{IntoDiagnostic, Result};
use sqlscout_core::{Severity, ValidationIssue};

use crate::args::OutputFormat;

/// Output formatter for validation issues
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print issues in the configured format
    pub fn print_issues(&self, issues: &[ValidationIssue]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                for issue in issues {
                    println!("{}", render_human(issue));
                }
            }
            OutputFormat::Json => println!("{}", render_json(issues)?),
        }
        Ok(())
    }
}

/// `file:line → message (suggest: suggestion)`
pub fn render_human(issue: &ValidationIssue) -> String {
    let file = issue.file.as_deref().unwrap_or("<input>");
    let line = issue.line.map_or_else(|| "?".to_string(), |l| l.to_string());
    let severity = match issue.severity {
        Severity::Error => "",
        Severity::Warning => " [warning]",
    };

    let mut out = format!("{}:{}{} → {}", file, line, severity, issue.message);
    if let Some(suggestion) = &issue.suggestion {
        out.push_str(&format!(" (suggest: {})", suggestion));
    }
    out
}

pub fn render_json(issues: &[ValidationIssue]) -> Result<String> {
    let output = serde_json::json!({ "errors": issues });
    serde_json::to_string_pretty(&output).into_diagnostic()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqlscout_core::IssueKind;

    fn table_issue() -> ValidationIssue {
        ValidationIssue::error(
            IssueKind::TableNotFound,
            "employes".to_string(),
            "Table 'employes' not found".to_string(),
        )
        .with_suggestion(Some("employees".to_string()))
        .at(Some("app.py"), Some(5))
    }

    #[test]
    fn test_render_human_with_suggestion() {
        assert_eq!(
            render_human(&table_issue()),
            "app.py:5 → Table 'employes' not found (suggest: employees)"
        );
    }

    #[test]
    fn test_render_human_without_suggestion() {
        let issue = ValidationIssue::warning(
            IssueKind::TypeMismatch,
            "employee_id".to_string(),
            "Column 'employee_id' expects integer (numeric) but literal 'hi' looks like string"
                .to_string(),
        )
        .at(Some("app.py"), Some(9));
        assert_eq!(
            render_human(&issue),
            "app.py:9 [warning] → Column 'employee_id' expects integer (numeric) but literal 'hi' looks like string"
        );
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&[table_issue()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value["errors"][0];
        assert_eq!(first["file"], "app.py");
        assert_eq!(first["line"], 5);
        assert_eq!(first["offending"], "employes");
        assert_eq!(first["suggestion"], "employees");
        assert_eq!(first["severity"], "error");
    }
}
