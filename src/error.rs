//! Error types for the skills library.

use std::io;
use thiserror::Error;

/// Result type alias for skill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while running a skill.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// Error reading or writing PDF structure.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Replacement text has characters the page font cannot show.
    #[error("Cannot encode '{text}' in font {font}")]
    Unencodable { text: String, font: String },

    /// Page index is out of range (zero-based index, page count).
    #[error("Page {0} out of range (0-{max})", max = .1.saturating_sub(1))]
    PageOutOfRange(u32, u32),

    /// Page specifier is neither a number nor "all".
    #[error("Invalid page number: {0}")]
    InvalidPageSpec(String),

    /// Invalid page range specification (e.g. "1-5,7").
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Missing or invalid configuration (API keys, credentials).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote API returned a non-success status.
    #[error("{service} API failed ({status}): {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Remote API returned a payload without the expected fields.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Voice call id is unknown to the provider.
    #[error("Call {0} not found")]
    CallNotFound(String),

    /// Error building or sending an email.
    #[error("Email error: {0}")]
    Email(String),

    /// External tool failed or is unavailable.
    #[error("External tool error: {0}")]
    External(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 payload could not be decoded.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::Pdf(err.to_string()),
        }
    }
}

impl From<lettre::error::Error> for Error {
    fn from(err: lettre::error::Error) -> Self {
        Error::Email(err.to_string())
    }
}

impl From<lettre::address::AddressError> for Error {
    fn from(err: lettre::address::AddressError) -> Self {
        Error::Email(format!("invalid address: {}", err))
    }
}

impl From<lettre::transport::smtp::Error> for Error {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        Error::Email(err.to_string())
    }
}

impl Error {
    /// Whether this error stems from missing configuration (API keys, credentials).
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(err.to_string(), "Page 10 out of range (0-4)");

        let err = Error::InvalidPageSpec("two".to_string());
        assert_eq!(err.to_string(), "Invalid page number: two");
    }

    #[test]
    fn test_api_error_display() {
        let err = Error::Api {
            service: "OpenAI Images",
            status: 401,
            body: "bad key".to_string(),
        };
        assert_eq!(err.to_string(), "OpenAI Images API failed (401): bad key");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_is_config() {
        assert!(Error::Config("OPENAI_API_KEY not set".into()).is_config());
        assert!(!Error::UnknownFormat.is_config());
    }
}
