//! Error types and result aliases for plsqlfmt.
//!
//! This module defines the error handling infrastructure:
//! - [`Result<T>`]: Type alias for `anyhow::Result<T>` used on every fatal path
//! - [`FormatError`]: The fatal taxonomy (configuration and I/O) that aborts a run
//!
//! Syntax errors are not part of this taxonomy. They are per-file outcomes, see
//! [`crate::parser::SyntaxError`].

use std::path::PathBuf;

use anyhow::Result as AnyhowResult;
use thiserror::Error;

pub type Result<T> = AnyhowResult<T>;

/// Fatal errors. Either one stops the run before the next file is touched.
#[derive(Debug, Error)]
pub enum FormatError {
    /// A grammar, style or run configuration source is missing or invalid.
    #[error("configuration error in {source_name}: {message}")]
    Configuration { source_name: String, message: String },

    /// The root directory cannot be walked, or a selected file cannot be read or written.
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FormatError {
    pub fn configuration(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_message() {
        let err = FormatError::configuration("style.toml", "indent must be at least 1");
        assert_eq!(
            err.to_string(),
            "configuration error in style.toml: indent must be at least 1"
        );
    }

    #[test]
    fn test_io_message_names_path() {
        let err = FormatError::io(
            "/tmp/missing",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(err.to_string(), "I/O error on /tmp/missing");
    }

    #[test]
    fn test_io_cause_is_printed_once() {
        let err: anyhow::Error = FormatError::io(
            "/tmp/missing",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        )
        .into();
        let rendered = format!("{err:#}");
        assert_eq!(rendered.matches("not found").count(), 1);
        assert_eq!(rendered, "I/O error on /tmp/missing: not found");
    }
}
