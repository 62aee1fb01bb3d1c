//! Syntax error values and their rendered context snippet.

use std::fmt;

/// Maximum length of the rendered expected-symbol summary
const EXPECTED_SUMMARY_LEN: usize = 50;

/// A parse failure at one position of a code region
///
/// `line` and `column` are 1-based and count characters. `snippet` holds two
/// lines: the offending source line and a caret line with `column - 1`
/// leading spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    /// Symbols that would have been accepted, in the order they were tried
    pub expected: Vec<String>,
    /// Text of the offending token, empty at end of input
    pub found: String,
    pub snippet: String,
}

impl SyntaxError {
    /// Build an error for the token starting at byte `offset` of `source`
    pub(crate) fn at(
        source: &str,
        offset: usize,
        found: &str,
        expected: impl IntoIterator<Item = String>,
    ) -> Self {
        let offset = floor_char_boundary(source, offset.min(source.len()));
        let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line_end = source[offset..]
            .find('\n')
            .map_or(source.len(), |i| offset + i);
        let line_text = source[line_start..line_end].trim_end_matches('\r');
        let line = source[..line_start].matches('\n').count() + 1;
        let column = source[line_start..offset].chars().count() + 1;

        let remaining = line_text.chars().count().saturating_sub(column - 1);
        let carets = found.chars().take_while(|c| *c != '\n').count().min(remaining).max(1);
        let snippet = format!("{line_text}\n{}{}", " ".repeat(column - 1), "^".repeat(carets));

        let mut symbols: Vec<String> = Vec::new();
        for symbol in expected {
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }

        SyntaxError {
            line,
            column,
            expected: symbols,
            found: found.to_string(),
            snippet,
        }
    }

    /// Shift the line number for a region that starts at `first_line` of its file
    #[must_use]
    pub fn relative_to_line(mut self, first_line: usize) -> Self {
        self.line += first_line.saturating_sub(1);
        self
    }

    /// Expected symbols joined by commas, cut to a fixed length
    #[must_use]
    pub fn expected_summary(&self) -> String {
        self.expected
            .join(",")
            .chars()
            .take(EXPECTED_SUMMARY_LEN)
            .collect()
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Syntax Error at line {}, column {}\n\n{}\n\nExpected: {}",
            self.line,
            self.column,
            self.snippet,
            self.expected_summary()
        )
    }
}

impl std::error::Error for SyntaxError {}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}
