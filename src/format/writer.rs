//! Line-oriented output buffer with lazy line breaks.
//!
//! Breaks and indentation are requested, not written: a newline only lands in
//! the output when the next piece of text arrives, using the indentation that
//! is current at that moment. Repeated requests collapse, so "start a new line"
//! is safe to ask for at every construct boundary.

/// Text buffer that tracks the current column
#[derive(Debug, Default)]
pub struct Writer {
    out: String,
    /// Characters on the current output line
    column: usize,
    /// Absolute indentation used for the next line break
    indent: usize,
    /// 1 = line break, 2 = blank line
    pending_newlines: usize,
    suppress_space: bool,
    /// `\r\n` when the source uses it; empty means `\n`
    line_ending: &'static str,
}

impl Writer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer whose line breaks are `\r\n`; text written into it is left as is
    #[must_use]
    pub fn with_crlf() -> Self {
        Writer {
            line_ending: "\r\n",
            ..Self::default()
        }
    }

    #[must_use]
    pub fn line_ending(&self) -> &'static str {
        if self.line_ending.is_empty() {
            "\n"
        } else {
            self.line_ending
        }
    }

    #[must_use]
    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn set_indent(&mut self, indent: usize) {
        self.indent = indent;
    }

    /// Request a line break before the next text
    pub fn newline(&mut self) {
        if !self.out.is_empty() {
            self.pending_newlines = self.pending_newlines.max(1);
        }
    }

    /// Request an empty line before the next text
    pub fn blank_line(&mut self) {
        if !self.out.is_empty() {
            self.pending_newlines = 2;
        }
    }

    #[must_use]
    pub fn has_pending_newline(&self) -> bool {
        self.pending_newlines > 0
    }

    /// Write the next text directly after the previous one, even across a
    /// requested line break
    pub fn glue(&mut self) {
        self.pending_newlines = 0;
        self.suppress_space = true;
    }

    /// No separating space before the next text
    pub fn no_space(&mut self) {
        self.suppress_space = true;
    }

    /// Column of the end of the written text
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Column at which text written next with [`Writer::word`] would start
    #[must_use]
    pub fn next_column(&self) -> usize {
        if self.pending_newlines > 0 {
            self.indent
        } else if self.needs_space() {
            self.column + 1
        } else {
            self.column
        }
    }

    /// Write text separated from the previous text by a space
    pub fn word(&mut self, text: &str) {
        self.write(text, true);
    }

    /// Write text directly after the previous text
    pub fn attach(&mut self, text: &str) {
        self.write(text, false);
    }

    /// Fill with spaces up to `column`; the next word follows without another space
    pub fn pad_to(&mut self, column: usize) {
        self.flush_newlines();
        while self.column < column {
            self.out.push(' ');
            self.column += 1;
        }
    }

    /// Write a comment at the end of the current line, ahead of any pending break
    pub fn trailing(&mut self, text: &str) {
        let pending = std::mem::take(&mut self.pending_newlines);
        self.write(text, true);
        self.pending_newlines = self.pending_newlines.max(pending);
    }

    /// The finished text, without trailing whitespace
    #[must_use]
    pub fn finish(mut self) -> String {
        let trimmed = self.out.trim_end().len();
        self.out.truncate(trimmed);
        self.out
    }

    fn needs_space(&self) -> bool {
        !self.suppress_space && !self.out.is_empty() && !self.out.ends_with([' ', '\n'])
    }

    fn write(&mut self, text: &str, spaced: bool) {
        if self.pending_newlines > 0 {
            self.flush_newlines();
        } else if spaced && self.needs_space() {
            self.out.push(' ');
            self.column += 1;
        }
        self.suppress_space = false;
        self.out.push_str(text);
        match text.rfind('\n') {
            Some(i) => self.column = text[i + 1..].chars().count(),
            None => self.column += text.chars().count(),
        }
    }

    fn flush_newlines(&mut self) {
        if self.pending_newlines == 0 {
            return;
        }
        let trimmed = self.out.trim_end_matches(' ').len();
        self.out.truncate(trimmed);
        let line_ending = self.line_ending();
        for _ in 0..self.pending_newlines {
            self.out.push_str(line_ending);
        }
        self.out.extend(std::iter::repeat(' ').take(self.indent));
        self.column = self.indent;
        self.pending_newlines = 0;
        self.suppress_space = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_are_spaced() {
        let mut w = Writer::new();
        w.word("select");
        w.word("a");
        w.attach(",");
        w.word("b");
        assert_eq!(w.finish(), "select a, b");
    }

    #[test]
    fn test_newline_uses_indent_at_write_time() {
        let mut w = Writer::new();
        w.word("begin");
        w.newline();
        w.set_indent(3);
        w.word("null;");
        w.set_indent(0);
        w.newline();
        w.newline();
        w.word("end;");
        assert_eq!(w.finish(), "begin\n   null;\nend;");
    }

    #[test]
    fn test_blank_line_has_no_trailing_spaces() {
        let mut w = Writer::new();
        w.set_indent(4);
        w.word("a");
        w.blank_line();
        w.word("b");
        assert_eq!(w.finish(), "a\n\n    b");
    }

    #[test]
    fn test_crlf_breaks_leave_text_alone() {
        let mut w = Writer::with_crlf();
        w.word("x :=");
        w.word("'a\nb';");
        w.newline();
        w.word("y;");
        assert_eq!(w.finish(), "x := 'a\nb';\r\ny;");
    }

    #[test]
    fn test_no_leading_newline() {
        let mut w = Writer::new();
        w.newline();
        w.blank_line();
        w.word("x");
        assert_eq!(w.finish(), "x");
    }

    #[test]
    fn test_pad_to_column() {
        let mut w = Writer::new();
        w.word("l_x");
        w.pad_to(8);
        w.word("integer;");
        assert_eq!(w.finish(), "l_x     integer;");
    }

    #[test]
    fn test_trailing_comment_precedes_pending_break() {
        let mut w = Writer::new();
        w.word("a;");
        w.newline();
        w.trailing("-- note");
        w.word("b;");
        assert_eq!(w.finish(), "a; -- note\nb;");
    }

    #[test]
    fn test_glue_cancels_break() {
        let mut w = Writer::new();
        w.word("end loop;");
        w.newline();
        w.glue();
        w.word("return;");
        assert_eq!(w.finish(), "end loop;return;");
    }

    #[test]
    fn test_next_column() {
        let mut w = Writer::new();
        w.word("select");
        assert_eq!(w.next_column(), 7);
        w.set_indent(2);
        w.newline();
        assert_eq!(w.next_column(), 2);
        w.no_space();
        assert_eq!(w.next_column(), 2);
    }

    #[test]
    fn test_multiline_text_resets_column() {
        let mut w = Writer::new();
        w.word("/* a\n   bc */");
        assert_eq!(w.column(), 8);
    }
}
