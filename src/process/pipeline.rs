//! Per-file formatting pipeline.
//!
//! Extracts the regions of one file, rewrites every formattable region and
//! reassembles the file. The whole result is computed in memory; a file with a
//! syntax error in any region yields no text at all, so nothing partial can be
//! written.

use log::debug;

use crate::extract::{extract_regions, ContentKind};
use crate::format::format_text;
use crate::parser::SyntaxError;
use crate::profile::RuleProfile;

/// Result of formatting one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    /// Every formattable region was rewritten; holds the whole new content
    Formatted(String),
    /// The file holds no formattable region
    Skipped,
    /// A region failed to parse; line numbers are relative to the file
    Failed(SyntaxError),
    /// The file is not UTF-8 text; holds the reason
    NotText(String),
}

impl FormatOutcome {
    /// New content that differs from `original`, if any
    #[must_use]
    pub fn changed_content(&self, original: &str) -> Option<&str> {
        match self {
            Self::Formatted(text) if text != original => Some(text),
            _ => None,
        }
    }
}

/// Outcome for a file whose bytes are not UTF-8
#[must_use]
pub fn not_text(error: &std::string::FromUtf8Error) -> FormatOutcome {
    FormatOutcome::NotText(format!(
        "not UTF-8 text (invalid byte at offset {})",
        error.utf8_error().valid_up_to()
    ))
}

/// Format the content of one file
///
/// Opaque and prose regions are copied through byte for byte. Code in an
/// indented fence is formatted without the fence indentation, which is then
/// put back on every line.
#[must_use]
pub fn format_content(content: &str, kind: ContentKind, profile: &RuleProfile) -> FormatOutcome {
    let regions = extract_regions(content, kind);
    if !regions.iter().any(|region| region.is_formattable()) {
        return FormatOutcome::Skipped;
    }

    let mut output = String::with_capacity(content.len());
    for region in &regions {
        if !region.is_formattable() {
            output.push_str(region.text);
            continue;
        }
        match format_text(&region.dedented(), profile) {
            Ok(text) if region.indent > 0 => output.push_str(&region.reindent(&text)),
            Ok(text) => output.push_str(&text),
            Err(error) => {
                debug!(
                    "region at line {} failed at its line {}",
                    region.first_line, error.line
                );
                return FormatOutcome::Failed(error.relative_to_line(region.first_line));
            }
        }
    }
    FormatOutcome::Formatted(output)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn profile() -> RuleProfile {
        RuleProfile::builtin().unwrap()
    }

    #[test]
    fn test_sql_file() {
        let outcome = format_content("SELECT a,b FROM t;\n", ContentKind::GenericSql, &profile());
        assert_eq!(
            outcome,
            FormatOutcome::Formatted("select a,\n       b\n  from t;\n".to_string())
        );
    }

    #[test]
    fn test_markdown_only_sql_blocks_change() {
        let doc = "# Doc\n\n```sql\nSELECT a FROM t;\n```\n\n```\nSELECT a FROM t;\n```\n\n```js\nvar  x;\n```\n";
        let FormatOutcome::Formatted(text) = format_content(doc, ContentKind::Markdown, &profile())
        else {
            panic!("expected formatted markdown");
        };
        assert_eq!(
            text,
            "# Doc\n\n```sql\nselect a\n  from t;\n```\n\n```\nSELECT a FROM t;\n```\n\n```js\nvar  x;\n```\n"
        );
    }

    #[test]
    fn test_indented_fence_keeps_its_indent() {
        let doc = "- step\n\n  ```sql\n  SELECT a, b FROM t;\n  ```\n";
        let FormatOutcome::Formatted(text) = format_content(doc, ContentKind::Markdown, &profile())
        else {
            panic!("expected formatted markdown");
        };
        assert_eq!(
            text,
            "- step\n\n  ```sql\n  select a,\n         b\n    from t;\n  ```\n"
        );
        assert_eq!(
            format_content(&text, ContentKind::Markdown, &profile()),
            FormatOutcome::Formatted(text.clone())
        );
    }

    #[test]
    fn test_markdown_without_sql_is_skipped() {
        let doc = "# Doc\n\n```js\nvar x;\n```\n";
        assert_eq!(format_content(doc, ContentKind::Markdown, &profile()), FormatOutcome::Skipped);
        assert_eq!(format_content("", ContentKind::Markdown, &profile()), FormatOutcome::Skipped);
    }

    #[test]
    fn test_error_line_is_relative_to_file() {
        let doc = "# Doc\n\n```sql\nselect a\n  from;\n```\n";
        let FormatOutcome::Failed(error) = format_content(doc, ContentKind::Markdown, &profile())
        else {
            panic!("expected a syntax error");
        };
        assert_eq!(error.line, 5);
        assert_eq!(error.column, 7);
    }

    #[test]
    fn test_one_bad_block_fails_the_file() {
        let doc = "```sql\nselect 1 from dual;\n```\n\n```sql\nbegin\n```\n";
        assert!(matches!(
            format_content(doc, ContentKind::Markdown, &profile()),
            FormatOutcome::Failed(_)
        ));
    }

    #[test]
    fn test_changed_content() {
        let outcome = FormatOutcome::Formatted("select 1\n  from dual;\n".to_string());
        assert_eq!(outcome.changed_content("select 1\n  from dual;\n"), None);
        assert!(outcome.changed_content("SELECT 1 FROM dual;\n").is_some());
        assert_eq!(FormatOutcome::Skipped.changed_content(""), None);
    }
}
