//! Error types for ferro-myvariant
//!
//! This module provides the crate-wide error enum together with numeric
//! error codes for programmatic handling:
//! - `E1xxx` variant codec errors
//! - `E2xxx` input errors
//! - `E3xxx` service errors (transport, lookup, pagination)
//! - `E9xxx` configuration and I/O errors

use std::fmt;
use thiserror::Error;

/// Error codes for categorizing errors
///
/// These codes can be used for programmatic error handling
/// and for documentation lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // Codec errors (E1xxx)
    /// Allele pair cannot be classified
    InvalidAlleles = 1001,
    /// Reference and alternate alleles are identical
    NoVariant = 1002,
    /// Position is zero or malformed
    InvalidPosition = 1003,
    /// Chromosome is empty
    InvalidChromosome = 1004,

    // Input errors (E2xxx)
    /// Empty id/term collection
    EmptyInput = 2001,
    /// Malformed input record
    MalformedInput = 2002,

    // Service errors (E3xxx)
    /// Network or HTTP failure
    TransportFailed = 3001,
    /// Single-item lookup found nothing
    NotFound = 3002,
    /// Pagination stopped on a server error
    ScrollFailed = 3003,

    // Configuration and IO errors (E9xxx)
    /// Invalid configuration
    ConfigError = 9000,
    /// File IO error
    IoError = 9001,
    /// JSON parsing error
    JsonError = 9002,
}

impl ErrorCode {
    /// Get the error code as a string (e.g., "E1001")
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }

    /// Get a brief description of this error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::InvalidAlleles => "allele pair cannot be converted",
            ErrorCode::NoVariant => "reference and alternate alleles are identical",
            ErrorCode::InvalidPosition => "invalid position",
            ErrorCode::InvalidChromosome => "invalid chromosome",
            ErrorCode::EmptyInput => "empty input collection",
            ErrorCode::MalformedInput => "malformed input record",
            ErrorCode::TransportFailed => "request to the annotation service failed",
            ErrorCode::NotFound => "no record found",
            ErrorCode::ScrollFailed => "paginated query stopped on a server error",
            ErrorCode::ConfigError => "invalid configuration",
            ErrorCode::IoError => "file I/O error",
            ErrorCode::JsonError => "JSON parsing error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for ferro-myvariant operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FerroError {
    /// The codec cannot classify or normalize an allele pair
    #[error("Invalid variant {chrom}:{pos} {reference}>{alternate}: {msg}")]
    InvalidVariant {
        chrom: String,
        pos: u64,
        reference: String,
        alternate: String,
        msg: String,
        code: ErrorCode,
    },

    /// Malformed or empty term/id collection
    #[error("Invalid input: {msg}")]
    InvalidInput { msg: String, code: ErrorCode },

    /// Network or HTTP failure; never retried
    #[error("Transport error{}: {msg}", status_suffix(.status))]
    Transport { msg: String, status: Option<u16> },

    /// A single-item lookup returned nothing
    #[error("Not found: {id}")]
    NotFound { id: String },

    /// A paginated query ended on a server-side error
    #[error("Scroll error: {msg}")]
    Scroll { msg: String },

    /// Invalid session configuration
    #[error("Configuration error: {msg}")]
    Config { msg: String },

    /// IO error (for file operations)
    #[error("IO error: {msg}")]
    Io { msg: String },

    /// JSON parsing error
    #[error("JSON error: {msg}")]
    Json { msg: String },
}

impl FerroError {
    /// Create an invalid-variant error for the given locus
    pub fn invalid_variant(
        chrom: &str,
        pos: u64,
        reference: &str,
        alternate: &str,
        code: ErrorCode,
        msg: impl Into<String>,
    ) -> Self {
        FerroError::InvalidVariant {
            chrom: chrom.to_string(),
            pos,
            reference: reference.to_string(),
            alternate: alternate.to_string(),
            msg: msg.into(),
            code,
        }
    }

    /// Create an error for an empty input collection
    pub fn empty_input(what: &str) -> Self {
        FerroError::InvalidInput {
            msg: format!("input {} must be a non-empty collection", what),
            code: ErrorCode::EmptyInput,
        }
    }

    /// Create an error for a malformed input record
    pub fn malformed(msg: impl Into<String>) -> Self {
        FerroError::InvalidInput {
            msg: msg.into(),
            code: ErrorCode::MalformedInput,
        }
    }

    /// Create a transport error, optionally carrying the HTTP status
    pub fn transport(msg: impl Into<String>, status: Option<u16>) -> Self {
        FerroError::Transport {
            msg: msg.into(),
            status,
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            FerroError::InvalidVariant { code, .. } => *code,
            FerroError::InvalidInput { code, .. } => *code,
            FerroError::Transport { .. } => ErrorCode::TransportFailed,
            FerroError::NotFound { .. } => ErrorCode::NotFound,
            FerroError::Scroll { .. } => ErrorCode::ScrollFailed,
            FerroError::Config { .. } => ErrorCode::ConfigError,
            FerroError::Io { .. } => ErrorCode::IoError,
            FerroError::Json { .. } => ErrorCode::JsonError,
        }
    }

    /// HTTP status carried by a transport error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            FerroError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Get the message prefixed with its error code (e.g. "[E3001] ...")
    pub fn detailed_message(&self) -> String {
        format!("[{}] {}", self.code(), self)
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|s| format!(" (HTTP {})", s))
        .unwrap_or_default()
}

impl From<std::io::Error> for FerroError {
    fn from(err: std::io::Error) -> Self {
        FerroError::Io {
            msg: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FerroError {
    fn from(err: serde_json::Error) -> Self {
        FerroError::Json {
            msg: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for FerroError {
    fn from(err: toml::de::Error) -> Self {
        FerroError::Config {
            msg: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for FerroError {
    fn from(err: toml::ser::Error) -> Self {
        FerroError::Config {
            msg: err.to_string(),
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for FerroError {
    fn from(err: reqwest::Error) -> Self {
        FerroError::Transport {
            msg: err.to_string(),
            status: err.status().map(|s| s.as_u16()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::InvalidAlleles.as_str(), "E1001");
        assert_eq!(ErrorCode::EmptyInput.as_str(), "E2001");
        assert_eq!(ErrorCode::TransportFailed.as_str(), "E3001");
        assert_eq!(ErrorCode::ConfigError.as_str(), "E9000");
        assert_eq!(ErrorCode::JsonError.as_str(), "E9002");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(
            ErrorCode::NoVariant.description(),
            "reference and alternate alleles are identical"
        );
        assert_eq!(ErrorCode::NotFound.description(), "no record found");
    }

    #[test]
    fn test_invalid_variant_display() {
        let err = FerroError::invalid_variant(
            "1",
            100,
            "A",
            "A",
            ErrorCode::NoVariant,
            "alleles are identical",
        );
        assert_eq!(
            err.to_string(),
            "Invalid variant 1:100 A>A: alleles are identical"
        );
        assert_eq!(err.code(), ErrorCode::NoVariant);
    }

    #[test]
    fn test_transport_display_with_status() {
        let err = FerroError::transport("bad gateway", Some(502));
        assert_eq!(err.to_string(), "Transport error (HTTP 502): bad gateway");
        assert_eq!(err.status(), Some(502));

        let err = FerroError::transport("connection refused", None);
        assert_eq!(err.to_string(), "Transport error: connection refused");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_detailed_message() {
        let err = FerroError::empty_input("ids");
        assert_eq!(
            err.detailed_message(),
            "[E2001] Invalid input: input ids must be a non-empty collection"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.vcf");
        let err: FerroError = io.into();
        assert!(matches!(err, FerroError::Io { .. }));
        assert_eq!(err.code(), ErrorCode::IoError);
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: FerroError = json_err.into();
        assert!(matches!(err, FerroError::Json { .. }));
    }
}
