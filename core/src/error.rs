//! Error types for outbound HTTP calls.
//!
//! # Design
//! Timeouts get dedicated variants because callers frequently distinguish
//! "the upstream is slow" from "the upstream rejected us." Non-2xx responses
//! land in `Status` with the raw status code and body for debugging, and
//! application-level failures extracted from an HTML error marker surface as
//! `Application` with the embedded message.

use std::fmt;

/// Errors returned by the `client` operations.
#[derive(Debug)]
pub enum FetchError {
    /// DNS resolution or connection establishment timed out.
    ConnectTimeout,

    /// Reading the response headers or body timed out.
    ReadTimeout,

    /// The server returned a non-2xx status. `body` carries the response
    /// body when one was readable, otherwise the status line.
    Status { status: u16, body: String },

    /// A business error message embedded in an otherwise-successful HTML
    /// response (see the error marker handling in `response`).
    Application(String),

    /// The request payload could not be serialized to JSON.
    Serialization(String),

    /// Connection failures, unresolvable hosts, and any other
    /// transport-level error.
    Transport(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::ConnectTimeout => write!(f, "connect timed out"),
            FetchError::ReadTimeout => write!(f, "read timed out"),
            FetchError::Status { status, body } => {
                write!(f, "HTTP {status}: {body}")
            }
            FetchError::Application(message) => {
                write!(f, "upstream reported: {message}")
            }
            FetchError::Serialization(msg) => {
                write!(f, "serialization failed: {msg}")
            }
            FetchError::Transport(msg) => {
                write!(f, "transport failed: {msg}")
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// Map a `ureq::Error` onto the crate's error contract.
///
/// Timeout reasons split into connect vs read; everything else is a
/// transport failure. `ureq::Error::StatusCode` never reaches this point
/// because agents are built with `http_status_as_error(false)`.
pub(crate) fn classify(err: ureq::Error) -> FetchError {
    match err {
        ureq::Error::Timeout(reason) => match reason {
            ureq::Timeout::Resolve | ureq::Timeout::Connect => FetchError::ConnectTimeout,
            _ => FetchError::ReadTimeout,
        },
        ureq::Error::ConnectionFailed => FetchError::Transport("connection failed".to_string()),
        ureq::Error::HostNotFound => FetchError::Transport("host not found".to_string()),
        ureq::Error::Io(e) => FetchError::Transport(e.to_string()),
        other => FetchError::Transport(other.to_string()),
    }
}
