//! Error types for the motor twin crate.

use std::fmt;

/// Result type for motor twin operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while feeding the twin.
#[derive(Debug)]
pub enum Error {
    /// Payload was not valid JSON.
    Payload {
        /// The decoder's message.
        message: String,
    },
    /// Payload was valid JSON but not an object.
    NotAnObject {
        /// The JSON type that was found instead.
        found: &'static str,
    },
    /// The message bus connection failed.
    Transport {
        /// The broker endpoint.
        endpoint: String,
        /// The error message.
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Payload { message } => write!(f, "failed to decode sensor payload: {message}"),
            Error::NotAnObject { found } => {
                write!(f, "sensor payload must be a JSON object, got {found}")
            }
            Error::Transport { endpoint, message } => {
                write!(f, "message bus at {endpoint} failed: {message}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Payload {
            message: e.to_string(),
        }
    }
}
