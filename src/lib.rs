//! plsqlfmt - Batch formatter for PL/SQL and SQL sources
//!
//! Formats whole directories of SQL files and the SQL blocks embedded in
//! Markdown documents. A file that fails to parse is reported and left
//! untouched.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod format;
pub mod parser;
pub mod process;
pub mod profile;

// Re-export commonly used types
pub use cli::{build_cli, parse_args, parse_args_from, CliArgs};
pub use config::Config;
pub use error::{FormatError, Result};
pub use format::format_text;
pub use parser::{parse, SyntaxError};
pub use process::{format_content, FormatOutcome, FormatRun, RunSummary};
pub use profile::{resolve, GrammarSource, RuleProfile, StyleSource};
