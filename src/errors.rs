/*!
 * Error types for the lyricsync library.
 *
 * This module contains custom error types for the different layers of the
 * lyrics pipeline, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a lyrics or overlay provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making a request fails
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing a provider response fails
    #[error("Failed to parse provider response: {0}")]
    ParseError(String),

    /// Error returned by the remote service itself
    #[error("Provider responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the service
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The transport gave up waiting for a response
    #[error("Request timed out: {0}")]
    Timeout(String),
}

/// Errors that can occur while producing lyrics for display
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LyricsError {
    /// The base or overlay transport failed
    #[error("Transport failure: {0}")]
    Transport(#[from] ProviderError),

    /// The base fetch succeeded but found no lyrics for the song
    #[error("No lyrics found: {0}")]
    NotFound(String),

    /// A response arrived for a request that a newer one replaced
    #[error("Request superseded (generation {generation})")]
    Superseded {
        /// Generation token the stale request carried
        generation: u64,
    },

    /// A document violates the timing or shape invariants
    #[error("Malformed lyrics document: {0}")]
    MalformedDocument(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the lyrics pipeline
    #[error("Lyrics error: {0}")]
    Lyrics(#[from] LyricsError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
