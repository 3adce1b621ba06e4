//! Request handling and server error types.

use std::fmt;

/// Errors raised while serving HTTP.
///
/// None of these are fatal to the process. A failure inside a request
/// handler becomes a 500 response; a failure in the accept loop stops the
/// server.
#[derive(Debug)]
pub enum Error {
    /// Building an HTTP response failed.
    Http(http::Error),

    /// Serializing a JSON body failed.
    Json(serde_json::Error),

    /// I/O error (bind, accept).
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(e) => write!(f, "HTTP error: {}", e),
            Error::Json(e) => write!(f, "JSON error: {}", e),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            Error::Json(e) => Some(e),
            Error::Io(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<http::Error> for Error {
    fn from(e: http::Error) -> Self {
        Error::Http(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, Error>;
