//! Candidate file selection.
//!
//! Walks the root recursively in path order and keeps regular files whose
//! extension is one of the selected SQL or Markdown extensions. The content
//! kind of a candidate is inferred from its extension alone.

use std::io;
use std::path::{Component, Path, PathBuf};

use glob::Pattern;
use log::debug;
use walkdir::WalkDir;

use crate::error::FormatError;
use crate::extract::ContentKind;

/// Every SQL extension recognized by default
///
/// DDL script extensions (`tab`, `seq`, `syn`, `grt`, ...) are left out: their
/// statements are not formattable. Naming one with `--ext` still selects it.
pub const SQL_EXTENSIONS: &[&str] = &[
    "sql", "prc", "fnc", "pks", "pkb", "trg", "vw", "tps", "tpb", "tbp", "plb", "pls", "rcv", "spc",
    "typ", "aqt", "aqp", "collt", "sp", "spb", "sps", "pck",
];

/// SQL extensions whose files hold package bodies
pub const PACKAGE_BODY_EXTENSIONS: &[&str] = &["pkb", "tpb", "plb", "spb", "pck"];

/// Markdown extensions whose fenced SQL blocks are formatted
pub const MARKDOWN_EXTENSIONS: &[&str] = &["markdown", "mdown", "mkdn", "md"];

/// Keyword of an extension list that stands for every SQL extension
pub const ALL_KEYWORD: &str = "all";

/// A file selected for formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub kind: ContentKind,
}

/// Which files of the root take part in a run
#[derive(Debug, Clone)]
pub struct FileSelection {
    /// Lower-case SQL extensions without the leading dot
    pub sql_extensions: Vec<String>,
    /// Lower-case Markdown extensions; empty disables Markdown files
    pub markdown_extensions: Vec<String>,
    pub exclude: Vec<Pattern>,
}

impl Default for FileSelection {
    fn default() -> Self {
        FileSelection {
            sql_extensions: owned(SQL_EXTENSIONS),
            markdown_extensions: owned(MARKDOWN_EXTENSIONS),
            exclude: Vec::new(),
        }
    }
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|ext| (*ext).to_string()).collect()
}

/// Normalize a list of SQL extensions; `all` expands to [`SQL_EXTENSIONS`]
#[must_use]
pub fn sql_extensions<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    let items = normalize_extensions(items);
    if items.iter().any(|ext| ext == ALL_KEYWORD) {
        return owned(SQL_EXTENSIONS);
    }
    items
}

/// Lower-case, drop leading dots and blanks, split comma separated items
#[must_use]
pub fn normalize_extensions<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    let mut extensions: Vec<String> = Vec::new();
    for item in items {
        for ext in item.as_ref().split(',') {
            let ext = ext.trim();
            let ext = ext.strip_prefix('.').unwrap_or(ext).to_ascii_lowercase();
            if !ext.is_empty() && !extensions.contains(&ext) {
                extensions.push(ext);
            }
        }
    }
    extensions
}

impl FileSelection {
    /// Content kind of `path` under this selection
    #[must_use]
    pub fn content_kind(&self, path: &Path) -> ContentKind {
        let Some(ext) = extension(path) else {
            return ContentKind::Other;
        };
        if self.markdown_extensions.contains(&ext) {
            ContentKind::Markdown
        } else if self.sql_extensions.contains(&ext) {
            sql_kind(&ext)
        } else {
            ContentKind::Other
        }
    }

    /// Whether `path` matches an exclude pattern
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }
        let path_str = path.to_string_lossy();
        self.exclude.iter().any(|pattern| {
            pattern.matches(&path_str)
                || path.components().any(|component| match component {
                    Component::Normal(name) => pattern.matches(&name.to_string_lossy()),
                    _ => false,
                })
        })
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

fn sql_kind(ext: &str) -> ContentKind {
    if PACKAGE_BODY_EXTENSIONS.contains(&ext) {
        ContentKind::PackageBody
    } else {
        ContentKind::GenericSql
    }
}

/// Select the candidates under `root`, ordered by path
///
/// A root that is a regular file is the only candidate; its kind follows its
/// extension and an unknown extension counts as generic SQL. Any entry that
/// cannot be read aborts the selection.
pub fn select_files(root: &Path, selection: &FileSelection) -> Result<Vec<CandidateFile>, FormatError> {
    let metadata = std::fs::metadata(root).map_err(|e| FormatError::io(root, e))?;
    if metadata.is_file() {
        if selection.is_excluded(root) {
            return Ok(Vec::new());
        }
        let kind = match extension(root) {
            Some(ext) if selection.markdown_extensions.contains(&ext) => ContentKind::Markdown,
            Some(ext) => sql_kind(&ext),
            None => ContentKind::GenericSql,
        };
        return Ok(vec![CandidateFile {
            path: root.to_path_buf(),
            kind,
        }]);
    }

    let mut candidates = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            let source = e
                .into_io_error()
                .unwrap_or_else(|| io::Error::other("file system loop"));
            FormatError::io(path, source)
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let kind = selection.content_kind(path);
        if kind == ContentKind::Other {
            continue;
        }
        if selection.is_excluded(path) {
            debug!("excluded {}", path.display());
            continue;
        }
        candidates.push(CandidateFile {
            path: path.to_path_buf(),
            kind,
        });
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn touch(dir: &Path, name: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "select 1 from dual;\n").unwrap();
    }

    fn names(candidates: &[CandidateFile], root: &Path) -> Vec<String> {
        candidates
            .iter()
            .map(|c| {
                c.path
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_extension_lists() {
        assert_eq!(normalize_extensions(&[".PKB, sql", "", "sql"]), vec!["pkb", "sql"]);
        assert_eq!(sql_extensions(&["ALL"]).len(), SQL_EXTENSIONS.len());
        assert!(sql_extensions::<&str>(&[]).is_empty());
        assert!(sql_extensions(&[""]).is_empty());
    }

    #[test]
    fn test_content_kind() {
        let selection = FileSelection::default();
        assert_eq!(selection.content_kind(Path::new("a/b.PKB")), ContentKind::PackageBody);
        assert_eq!(selection.content_kind(Path::new("q.sql")), ContentKind::GenericSql);
        assert_eq!(selection.content_kind(Path::new("README.md")), ContentKind::Markdown);
        assert_eq!(selection.content_kind(Path::new("main.rs")), ContentKind::Other);
        assert_eq!(selection.content_kind(Path::new("Makefile")), ContentKind::Other);
    }

    #[test]
    fn test_walk_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.sql", "a.pkb", "notes.txt", "sub/c.md", "sub/a.sql"] {
            touch(dir.path(), name);
        }
        let candidates = select_files(dir.path(), &FileSelection::default()).unwrap();
        assert_eq!(
            names(&candidates, dir.path()),
            vec!["a.pkb", "b.sql", "sub/a.sql", "sub/c.md"]
        );
        assert_eq!(candidates[0].kind, ContentKind::PackageBody);
        assert_eq!(candidates[3].kind, ContentKind::Markdown);
    }

    #[test]
    fn test_package_body_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.sql", "a.pkb", "c.md"] {
            touch(dir.path(), name);
        }
        let selection = FileSelection {
            sql_extensions: sql_extensions(&["pkb"]),
            markdown_extensions: Vec::new(),
            exclude: Vec::new(),
        };
        let candidates = select_files(dir.path(), &selection).unwrap();
        assert_eq!(names(&candidates, dir.path()), vec!["a.pkb"]);
    }

    #[test]
    fn test_exclude_patterns() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["keep.sql", "skip_me.sql", "vendor/x.sql"] {
            touch(dir.path(), name);
        }
        let selection = FileSelection {
            exclude: vec![Pattern::new("skip_*").unwrap(), Pattern::new("vendor").unwrap()],
            ..FileSelection::default()
        };
        let candidates = select_files(dir.path(), &selection).unwrap();
        assert_eq!(names(&candidates, dir.path()), vec!["keep.sql"]);
    }

    #[test]
    fn test_single_file_root() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "script.txt");
        let root = dir.path().join("script.txt");
        let candidates = select_files(&root, &FileSelection::default()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].kind, ContentKind::GenericSql);
    }

    #[test]
    fn test_single_markdown_root_follows_markdown_extensions() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "notes.md");
        let root = dir.path().join("notes.md");

        let candidates = select_files(&root, &FileSelection::default()).unwrap();
        assert_eq!(candidates[0].kind, ContentKind::Markdown);

        let selection = FileSelection {
            markdown_extensions: Vec::new(),
            ..FileSelection::default()
        };
        let candidates = select_files(&root, &selection).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].kind, ContentKind::GenericSql);
    }

    #[test]
    fn test_ddl_extensions_only_when_named() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.tab", "b.trg", "c.vw", "d.grt"] {
            touch(dir.path(), name);
        }
        let candidates = select_files(dir.path(), &FileSelection::default()).unwrap();
        assert_eq!(names(&candidates, dir.path()), vec!["b.trg", "c.vw"]);

        let selection = FileSelection {
            sql_extensions: sql_extensions(&["tab"]),
            ..FileSelection::default()
        };
        assert_eq!(selection.content_kind(Path::new("a.tab")), ContentKind::GenericSql);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = select_files(&dir.path().join("nope"), &FileSelection::default()).unwrap_err();
        assert!(matches!(err, FormatError::Io { .. }));
    }
}
