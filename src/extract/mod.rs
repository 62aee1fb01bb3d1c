//! Code region extraction.
//!
//! Splits a file's text into an ordered list of [`CodeRegion`]s that tile the
//! whole file. SQL files are one formattable region. Markdown files alternate
//! between prose (including the fence lines themselves) and fenced block
//! contents; only blocks tagged with a recognized language marker are
//! formattable, every other block is opaque.
//!
//! Concatenating the regions' text always reproduces the input exactly.

pub mod fence;

use std::borrow::Cow;
use std::ops::Range;

pub use fence::{find_fenced_blocks, FencedBlock};

/// Fenced block language markers treated as formattable code
pub const CODE_LANGUAGES: &[&str] = &["sql", "plsql"];

/// Content kind of a candidate file, inferred from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    GenericSql,
    PackageBody,
    Markdown,
    Other,
}

/// Role of a region in the reassembled file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// Parsed and rewritten
    Code,
    /// Code in a block without a recognized language; copied through
    Opaque,
    /// Document text and fence lines; copied through
    Prose,
}

/// A contiguous slice of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRegion<'a> {
    /// Byte range in the file
    pub range: Range<usize>,
    /// 1-based line of the region's first byte
    pub first_line: usize,
    pub text: &'a str,
    pub kind: RegionKind,
    /// Indentation of the enclosing fence, shared by every content line
    pub indent: usize,
}

impl CodeRegion<'_> {
    #[must_use]
    pub fn is_formattable(&self) -> bool {
        self.kind == RegionKind::Code
    }

    /// The region text with up to `indent` leading spaces removed from each line
    #[must_use]
    pub fn dedented(&self) -> Cow<'_, str> {
        if self.indent == 0 {
            return Cow::Borrowed(self.text);
        }
        Cow::Owned(
            self.text
                .split_inclusive('\n')
                .map(|line| {
                    let spaces = line.len() - line.trim_start_matches(' ').len();
                    &line[spaces.min(self.indent)..]
                })
                .collect(),
        )
    }

    /// Put the fence indentation back in front of every non-empty line of `text`
    #[must_use]
    pub fn reindent(&self, text: &str) -> String {
        let prefix = " ".repeat(self.indent);
        let mut out = String::with_capacity(text.len());
        for line in text.split_inclusive('\n') {
            if !line.trim_end_matches(['\n', '\r']).is_empty() {
                out.push_str(&prefix);
            }
            out.push_str(line);
        }
        out
    }
}

/// Whether a fenced block marker names formattable code
#[must_use]
pub fn is_code_marker(marker: &str) -> bool {
    let marker = marker.trim();
    CODE_LANGUAGES
        .iter()
        .any(|lang| marker.eq_ignore_ascii_case(lang))
}

/// Split `content` into regions according to its kind
///
/// `Other` content yields no regions at all.
#[must_use]
pub fn extract_regions(content: &str, kind: ContentKind) -> Vec<CodeRegion<'_>> {
    match kind {
        ContentKind::GenericSql | ContentKind::PackageBody => vec![CodeRegion {
            range: 0..content.len(),
            first_line: 1,
            text: content,
            kind: RegionKind::Code,
            indent: 0,
        }],
        ContentKind::Markdown => markdown_regions(content),
        ContentKind::Other => Vec::new(),
    }
}

fn markdown_regions(content: &str) -> Vec<CodeRegion<'_>> {
    let mut regions = Vec::new();
    let mut cursor = 0;

    for block in find_fenced_blocks(content) {
        push_region(&mut regions, content, cursor..block.content_start, RegionKind::Prose, 0);
        let kind = if is_code_marker(&block.language()) {
            RegionKind::Code
        } else {
            RegionKind::Opaque
        };
        push_region(
            &mut regions,
            content,
            block.content_start..block.content_end,
            kind,
            block.indent,
        );
        cursor = block.content_end;
    }
    push_region(&mut regions, content, cursor..content.len(), RegionKind::Prose, 0);

    regions
}

fn push_region<'a>(
    regions: &mut Vec<CodeRegion<'a>>,
    content: &'a str,
    range: Range<usize>,
    kind: RegionKind,
    indent: usize,
) {
    // empty prose between adjacent fences carries nothing
    if range.is_empty() && kind == RegionKind::Prose {
        return;
    }
    let first_line = content[..range.start].matches('\n').count() + 1;
    regions.push(CodeRegion {
        text: &content[range.clone()],
        range,
        first_line,
        kind,
        indent,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# Title\n\n```sql\nselect 1 from dual;\n```\n\n```\nraw\n```\n\n``` js\nvar a;\n```\n";

    #[test]
    fn test_sql_file_is_one_region() {
        let regions = extract_regions("select 1;\n", ContentKind::PackageBody);
        assert_eq!(regions.len(), 1);
        assert!(regions[0].is_formattable());
        assert_eq!(regions[0].text, "select 1;\n");
    }

    #[test]
    fn test_other_yields_nothing() {
        assert!(extract_regions("whatever", ContentKind::Other).is_empty());
    }

    #[test]
    fn test_markdown_regions_tile_the_document() {
        let regions = extract_regions(DOC, ContentKind::Markdown);
        let joined: String = regions.iter().map(|r| r.text).collect();
        assert_eq!(joined, DOC);
        for pair in regions.windows(2) {
            assert_eq!(pair[0].range.end, pair[1].range.start);
        }
    }

    #[test]
    fn test_markdown_region_kinds() {
        let regions = extract_regions(DOC, ContentKind::Markdown);
        let kinds: Vec<RegionKind> = regions.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RegionKind::Prose,
                RegionKind::Code,
                RegionKind::Prose,
                RegionKind::Opaque,
                RegionKind::Prose,
                RegionKind::Opaque,
                RegionKind::Prose,
            ]
        );
        assert_eq!(regions[1].text, "select 1 from dual;\n");
        assert_eq!(regions[1].first_line, 4);
    }

    #[test]
    fn test_indented_block_is_dedented_and_reindented() {
        let doc = "1. step\n\n   ```sql\n   select a\n\n     from t;\n   ```\n";
        let regions = extract_regions(doc, ContentKind::Markdown);
        let code = &regions[1];
        assert!(code.is_formattable());
        assert_eq!(code.indent, 3);
        assert_eq!(code.dedented(), "select a\n\n  from t;\n");
        assert_eq!(code.reindent("select a\n\n  from t;\n"), code.text);
    }

    #[test]
    fn test_markdown_without_blocks() {
        let regions = extract_regions("just prose\n", ContentKind::Markdown);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].kind, RegionKind::Prose);
    }

    #[test]
    fn test_empty_markdown() {
        assert!(extract_regions("", ContentKind::Markdown).is_empty());
    }

    #[test]
    fn test_code_markers() {
        assert!(is_code_marker("sql"));
        assert!(is_code_marker("  SQL "));
        assert!(is_code_marker("PlSql"));
        assert!(!is_code_marker(""));
        assert!(!is_code_marker("js"));
        assert!(!is_code_marker("sqlite"));
    }
}
