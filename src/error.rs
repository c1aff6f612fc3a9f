//! Error types for reply-normalizer operations.
//!
//! This module provides the error hierarchy using `thiserror`. Exchange
//! failures carry enough structure to produce a human-facing message for
//! each class of failure; parse problems inside the normalizer are never
//! errors and do not appear here.

use thiserror::Error;

/// Result type alias for reply-normalizer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Request/response exchange errors.
    #[error("exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    /// I/O errors (file and stdin operations).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

impl Error {
    /// Returns the message to show an end user for this error.
    ///
    /// Exchange errors are mapped to their class-specific wording; other
    /// errors fall back to their display form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Exchange(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

/// Failures of a single request/response exchange.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// Transport-level failure before any response arrived (DNS, TLS, refused).
    #[error("connection failed: {reason}")]
    Connectivity {
        /// Underlying transport error.
        reason: String,
    },

    /// The endpoint answered with a non-2xx status.
    #[error("endpoint responded with HTTP {status}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, if any could be read.
        body: String,
    },

    /// Failure while reading an in-progress response stream.
    #[error("stream read failed: {reason}")]
    StreamRead {
        /// Underlying read error.
        reason: String,
    },

    /// The caller aborted the exchange before the stream ended.
    #[error("exchange cancelled")]
    Cancelled,
}

/// Classification of non-2xx HTTP statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 429 Too Many Requests.
    RateLimited,
    /// 502 Bad Gateway or 503 Service Unavailable.
    Unavailable,
    /// Any other 5xx.
    ServerError,
    /// Any other non-2xx status.
    Rejected,
}

impl StatusClass {
    /// Classifies a non-2xx HTTP status code.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited,
            502 | 503 => Self::Unavailable,
            500..=599 => Self::ServerError,
            _ => Self::Rejected,
        }
    }
}

impl ExchangeError {
    /// Returns the status class for [`ExchangeError::HttpStatus`] errors.
    #[must_use]
    pub const fn status_class(&self) -> Option<StatusClass> {
        match self {
            Self::HttpStatus { status, .. } => Some(StatusClass::from_status(*status)),
            _ => None,
        }
    }

    /// Returns the human-facing message for this failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Connectivity { .. } => {
                "Unable to reach the assistant. Please check your network connection and try again."
                    .to_string()
            }
            Self::HttpStatus { status, .. } => match StatusClass::from_status(*status) {
                StatusClass::RateLimited => {
                    "The assistant is rate limited right now. Please wait a moment before asking again."
                        .to_string()
                }
                StatusClass::Unavailable => {
                    "The assistant is temporarily unavailable. Please try again shortly.".to_string()
                }
                StatusClass::ServerError => {
                    format!("The assistant ran into a server error (HTTP {status}).")
                }
                StatusClass::Rejected => format!("The request failed with HTTP status {status}."),
            },
            Self::StreamRead { .. } => {
                "The connection was lost while the answer was arriving.".to_string()
            }
            Self::Cancelled => "The request was cancelled.".to_string(),
        }
    }
}

/// I/O-specific errors for reading captured response bodies.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_body() || err.is_decode() {
            Self::StreamRead {
                reason: err.to_string(),
            }
        } else {
            Self::Connectivity {
                reason: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Exchange(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(429, StatusClass::RateLimited ; "too many requests")]
    #[test_case(502, StatusClass::Unavailable ; "bad gateway")]
    #[test_case(503, StatusClass::Unavailable ; "service unavailable")]
    #[test_case(500, StatusClass::ServerError ; "internal error")]
    #[test_case(504, StatusClass::ServerError ; "gateway timeout")]
    #[test_case(404, StatusClass::Rejected ; "not found")]
    #[test_case(401, StatusClass::Rejected ; "unauthorized")]
    fn test_status_class(status: u16, expected: StatusClass) {
        assert_eq!(StatusClass::from_status(status), expected);
    }

    #[test]
    fn test_rate_limited_message() {
        let err = ExchangeError::HttpStatus {
            status: 429,
            body: String::new(),
        };
        assert!(err.user_message().contains("rate limited"));
        assert_eq!(err.status_class(), Some(StatusClass::RateLimited));
    }

    #[test]
    fn test_unavailable_message() {
        let err = ExchangeError::HttpStatus {
            status: 503,
            body: "maintenance".to_string(),
        };
        assert!(err.user_message().contains("temporarily unavailable"));
    }

    #[test]
    fn test_server_and_generic_status_messages() {
        let err = ExchangeError::HttpStatus {
            status: 500,
            body: String::new(),
        };
        assert!(err.user_message().contains("server error"));
        assert!(err.user_message().contains("500"));

        let err = ExchangeError::HttpStatus {
            status: 404,
            body: String::new(),
        };
        assert!(err.user_message().contains("404"));
        assert!(!err.user_message().contains("server error"));
    }

    #[test]
    fn test_connectivity_and_stream_messages() {
        let err = ExchangeError::Connectivity {
            reason: "dns".to_string(),
        };
        assert!(err.user_message().contains("network connection"));
        assert_eq!(err.status_class(), None);

        let err = ExchangeError::StreamRead {
            reason: "reset".to_string(),
        };
        assert!(err.user_message().contains("connection was lost"));
    }

    #[test]
    fn test_error_display() {
        let err = Error::Config {
            message: "bad endpoint".to_string(),
        };
        assert_eq!(err.to_string(), "configuration error: bad endpoint");

        let err: Error = ExchangeError::Cancelled.into();
        assert_eq!(err.to_string(), "exchange error: exchange cancelled");
    }

    #[test]
    fn test_error_user_message_delegates() {
        let err: Error = ExchangeError::HttpStatus {
            status: 502,
            body: String::new(),
        }
        .into();
        assert!(err.user_message().contains("temporarily unavailable"));

        let err: Error = CommandError::InvalidArgument("--tick-ms".to_string()).into();
        assert_eq!(
            err.user_message(),
            "command error: invalid argument: --tick-ms"
        );
    }

    #[test]
    fn test_io_error_variants() {
        let err = IoError::FileNotFound {
            path: "/tmp/body.txt".to_string(),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/body.txt");

        let err = IoError::ReadFailed {
            path: "/tmp/body.txt".to_string(),
            reason: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(IoError::Generic(_))));
    }
}
