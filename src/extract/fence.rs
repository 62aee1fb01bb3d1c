//! Fenced code block scanner for Markdown documents.
//!
//! Works line by line on the raw text so that every byte outside a block's
//! content is reproduced exactly: fence lines, info strings, line endings and
//! surrounding prose are never touched.

use std::sync::LazyLock;

use regex::Regex;

/// Opening or closing fence: up to three spaces, then three or more backticks or tildes
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^( {0,3})(`{3,}|~{3,})(.*)$").unwrap());

/// A fenced block found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock {
    /// Byte offset of the first content line
    pub content_start: usize,
    /// Byte offset just past the last content line (start of the closing fence)
    pub content_end: usize,
    /// 1-based line number of the opening fence
    pub fence_line: usize,
    /// Info string after the opening fence, untrimmed
    pub info: String,
    /// Spaces before the opening fence
    pub indent: usize,
}

impl FencedBlock {
    /// Language marker: first word of the info string, lower-cased
    #[must_use]
    pub fn language(&self) -> String {
        self.info
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_ascii_lowercase()
    }
}

struct OpenFence {
    fence_char: char,
    fence_len: usize,
    content_start: usize,
    fence_line: usize,
    info: String,
    indent: usize,
}

/// Find all closed fenced blocks in `content`
///
/// A fence left open at the end of the document does not produce a block, so
/// its text stays with the surrounding prose.
#[must_use]
pub fn find_fenced_blocks(content: &str) -> Vec<FencedBlock> {
    let mut blocks = Vec::new();
    let mut open: Option<OpenFence> = None;
    let mut offset = 0;

    for (index, raw_line) in content.split_inclusive('\n').enumerate() {
        let line_start = offset;
        offset += raw_line.len();
        let line = raw_line.trim_end_matches(['\n', '\r']);

        let Some(caps) = FENCE_RE.captures(line) else {
            continue;
        };
        let fence = &caps[2];
        let rest = &caps[3];
        let fence_char = fence.chars().next().unwrap_or('`');

        match &open {
            None => {
                // backtick info strings may not contain backticks
                if fence_char == '`' && rest.contains('`') {
                    continue;
                }
                open = Some(OpenFence {
                    fence_char,
                    fence_len: fence.len(),
                    content_start: offset,
                    fence_line: index + 1,
                    info: rest.to_string(),
                    indent: caps[1].len(),
                });
            }
            Some(current) => {
                let closes = fence_char == current.fence_char
                    && fence.len() >= current.fence_len
                    && rest.trim().is_empty();
                if closes {
                    if let Some(current) = open.take() {
                        blocks.push(FencedBlock {
                            content_start: current.content_start,
                            content_end: line_start,
                            fence_line: current.fence_line,
                            info: current.info,
                            indent: current.indent,
                        });
                    }
                }
            }
        }
    }

    blocks
}
