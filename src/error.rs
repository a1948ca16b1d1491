//! Application error types.
//!
//! Provides unified error handling with actionable context for debugging.

use thiserror::Error;

/// Application result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types with specific context for actionable debugging
#[derive(Debug, Error)]
pub enum Error {
    /// IO error with path context
    #[error("IO error at {path:?}: {source}")]
    Io {
        /// The underlying IO error.
        source: std::io::Error,
        /// File path where the error occurred, if known.
        path: Option<std::path::PathBuf>,
    },

    /// Bible data file could not be decoded or encoded
    #[error("JSON error in {path:?}: {source}")]
    Json {
        /// The underlying serde error.
        source: serde_json::Error,
        /// Data file involved, if known.
        path: Option<std::path::PathBuf>,
    },

    /// Configuration error with guidance
    #[error("Configuration error: {message}. {hint}")]
    Config {
        /// Description of the configuration problem.
        message: String,
        /// Actionable guidance for fixing the issue.
        hint: &'static str,
    },

    /// Text parsing error (code block headers, option lists)
    #[error("Parse error in {file:?}: {message}")]
    Parse {
        /// File that failed to parse, if known.
        file: Option<std::path::PathBuf>,
        /// Description of the parse failure.
        message: String,
    },

    /// Scripture reference rejected by the parser
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// Translation bookkeeping error (duplicates, unknown ids)
    #[error("Translation error: {0}")]
    Translation(String),

    /// Scripture lookup error
    #[error("Scripture lookup failed: {message}")]
    Scripture {
        /// Description of what could not be found.
        message: String,
        /// Closest known book name, when the book itself was unknown.
        suggestion: Option<String>,
    },

    /// Generic message error (escape hatch)
    #[error("{0}")]
    Msg(String),
}

/// Rejection of a typed scripture reference.
///
/// Terminal for the single reference being parsed; the caller decides whether
/// to abort or skip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    /// The input matches none of the supported shapes.
    #[error("Invalid reference format: {input}")]
    InvalidFormat {
        /// The rejected input, trimmed.
        input: String,
    },

    /// A cross-chapter reference names two different books.
    #[error("Cross-book references are not supported: {start_book} .. {end_book}")]
    CrossBookUnsupported {
        /// Book on the left of the dash.
        start_book: String,
        /// Book on the right of the dash.
        end_book: String,
    },

    /// The end of the range precedes its start.
    #[error("Invalid range: {end_chapter}:{end_verse} comes before {start_chapter}:{start_verse}")]
    InvalidRange {
        /// Chapter the range starts in.
        start_chapter: u32,
        /// Verse the range starts at.
        start_verse: u32,
        /// Chapter the range ends in.
        end_chapter: u32,
        /// Verse the range ends at.
        end_verse: u32,
    },
}

/// A processing rule whose pattern failed to compile.
///
/// Never fatal: the rule is skipped and the remaining rules still run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid regex in processing rule for {translation}: {pattern} ({message})")]
pub struct InvalidPatternWarning {
    /// Translation the rule belongs to.
    pub translation: String,
    /// The offending pattern source.
    pub pattern: String,
    /// Compiler diagnostic.
    pub message: String,
}

impl Error {
    /// Create an IO error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<std::path::PathBuf>>) -> Self {
        Self::Io { source, path: path.into() }
    }

    /// Create a JSON error with path context
    pub fn json(source: serde_json::Error, path: impl Into<Option<std::path::PathBuf>>) -> Self {
        Self::Json { source, path: path.into() }
    }

    /// Create a config error with actionable hint
    pub fn config(message: impl Into<String>, hint: &'static str) -> Self {
        Self::Config { message: message.into(), hint }
    }

    /// Create a parse error with file context
    pub fn parse(message: impl Into<String>, file: impl Into<Option<std::path::PathBuf>>) -> Self {
        Self::Parse { file: file.into(), message: message.into() }
    }

    /// Create a scripture lookup error without a suggestion
    pub fn scripture(message: impl Into<String>) -> Self {
        Self::Scripture { message: message.into(), suggestion: None }
    }
}

// Convenience conversions
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io { source: e, path: None }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Msg(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Msg(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn reference_error_converts_and_displays() {
        let err: Error = ReferenceError::CrossBookUnsupported {
            start_book: "1 Corinthians".into(),
            end_book: "2 Timothy".into(),
        }
        .into();
        let text = err.to_string();
        assert!(text.contains("1 Corinthians"));
        assert!(text.contains("2 Timothy"));
    }

    #[test]
    fn invalid_range_reports_numbers() {
        let err = ReferenceError::InvalidRange {
            start_chapter: 5,
            start_verse: 10,
            end_chapter: 5,
            end_verse: 2,
        };
        assert_eq!(err.to_string(), "Invalid range: 5:2 comes before 5:10");
    }

    #[test]
    fn config_error_includes_hint() {
        let err = Error::config("bad output type", "Use text, link or codeblock");
        match &err {
            Error::Config { hint, .. } => assert!(hint.contains("codeblock")),
            _ => panic!("Expected Config error"),
        }
        assert!(err.to_string().contains("bad output type"));
    }
}
