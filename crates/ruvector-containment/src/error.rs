//! Error types for ruvector-containment
//!
//! Sample-level problems (an input record that cannot be normalized) are
//! not errors; they are reported as [`crate::normalizer::SkippedRecord`]s.
//! This enum covers run-level failures only.

use thiserror::Error;

/// Result type alias for containment analysis operations
pub type Result<T> = std::result::Result<T, ContainmentError>;

/// Main error type for containment analysis
#[derive(Error, Debug)]
pub enum ContainmentError {
    /// No usable records remained after normalization
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A lexicon entry failed to compile into a pattern
    #[error("Lexicon error: {0}")]
    Lexicon(String),

    /// Input file is not a JSON array of result records
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// CSV export errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ContainmentError {
    fn from(err: serde_json::Error) -> Self {
        ContainmentError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for ContainmentError {
    fn from(err: csv::Error) -> Self {
        ContainmentError::Csv(err.to_string())
    }
}

impl From<regex::Error> for ContainmentError {
    fn from(err: regex::Error) -> Self {
        ContainmentError::Lexicon(err.to_string())
    }
}

impl From<toml::de::Error> for ContainmentError {
    fn from(err: toml::de::Error) -> Self {
        ContainmentError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = ContainmentError::EmptyInput("no baseline or trigger records".into());
        assert_eq!(e.to_string(), "Empty input: no baseline or trigger records");

        let e = ContainmentError::Config("threshold must be > 0".into());
        assert!(e.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_regex_error_maps_to_lexicon() {
        let err = regex::Regex::new("(unclosed").unwrap_err();
        let e: ContainmentError = err.into();
        assert!(matches!(e, ContainmentError::Lexicon(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let e: ContainmentError = io.into();
        assert!(e.to_string().contains("missing.json"));
    }
}
