//! Progress report lines.
//!
//! Each file gets one entry, written in two steps so the prefix is visible
//! while the file is being processed:
//!
//! ```text
//! Formatting file 1 of 3: src/a.pkb... done.
//! Formatting file 2 of 3: src/b.md... skipped.
//! Formatting file 3 of 3: src/c.sql... Syntax Error at line 2, column 8
//!
//! <source line>
//!        ^
//!
//! Expected: ;... skipped.
//! ```

use std::io::{self, Write};
use std::path::Path;

use super::pipeline::FormatOutcome;

/// Writes the progress report of a run
pub struct Reporter<W: Write> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Reporter { out }
    }

    /// `Formatting file i of N: path... `
    pub fn start(&mut self, index: usize, total: usize, path: &Path) -> io::Result<()> {
        write!(
            self.out,
            "Formatting file {index} of {total}: {}... ",
            path.display()
        )?;
        self.out.flush()
    }

    /// The result that closes the entry started by [`Reporter::start`]
    pub fn finish(&mut self, outcome: &FormatOutcome) -> io::Result<()> {
        match outcome {
            FormatOutcome::Formatted(_) => writeln!(self.out, "done."),
            FormatOutcome::Skipped => writeln!(self.out, "skipped."),
            FormatOutcome::Failed(error) => writeln!(self.out, "{error}... skipped."),
            FormatOutcome::NotText(reason) => writeln!(self.out, "{reason}... skipped."),
        }?;
        self.out.flush()
    }

    /// Close an entry cut short by a fatal error
    pub fn abort(&mut self) -> io::Result<()> {
        writeln!(self.out, "failed.")?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::parser::SyntaxError;

    fn entry(outcome: &FormatOutcome) -> String {
        let mut reporter = Reporter::new(Vec::new());
        reporter.start(2, 3, Path::new("dir/b.sql")).unwrap();
        reporter.finish(outcome).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_done_and_skipped() {
        assert_eq!(
            entry(&FormatOutcome::Formatted(String::new())),
            "Formatting file 2 of 3: dir/b.sql... done.\n"
        );
        assert_eq!(
            entry(&FormatOutcome::Skipped),
            "Formatting file 2 of 3: dir/b.sql... skipped.\n"
        );
    }

    #[test]
    fn test_not_text_and_abort() {
        assert_eq!(
            entry(&FormatOutcome::NotText("not UTF-8 text (invalid byte at offset 4)".to_string())),
            "Formatting file 2 of 3: dir/b.sql... not UTF-8 text (invalid byte at offset 4)... skipped.\n"
        );
        let mut reporter = Reporter::new(Vec::new());
        reporter.start(1, 1, Path::new("a.sql")).unwrap();
        reporter.abort().unwrap();
        assert_eq!(
            String::from_utf8(reporter.into_inner()).unwrap(),
            "Formatting file 1 of 1: a.sql... failed.\n"
        );
    }

    #[test]
    fn test_syntax_error_block() {
        let error = SyntaxError {
            line: 2,
            column: 8,
            expected: vec![";".to_string(), "end".to_string()],
            found: "x".to_string(),
            snippet: "  null x\n       ^".to_string(),
        };
        assert_eq!(
            entry(&FormatOutcome::Failed(error)),
            "Formatting file 2 of 3: dir/b.sql... Syntax Error at line 2, column 8\n\n  null x\n       ^\n\nExpected: ;,end... skipped.\n"
        );
    }
}
