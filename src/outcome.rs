//! The terminal result of one `submit` call.

use serde::Serialize;

use crate::Error;

/// Exactly one of these is produced per submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestOutcome {
    /// The answer was fully received.
    Success {
        /// The assembled answer with the termination marker removed.
        text: String,
    },
    /// No body was read: the backend returned a failure status, or the
    /// request could not be issued at all.
    TransportError {
        /// The HTTP status, when the backend answered.
        status: Option<u16>,
        /// Human-readable message.
        message: String,
    },
    /// A fault while sending the request or consuming the stream.
    StreamError {
        /// Human-readable message.  Never empty.
        message: String,
    },
}

impl RequestOutcome {
    /// Creates a success outcome.
    pub fn success(text: impl Into<String>) -> Self {
        RequestOutcome::Success { text: text.into() }
    }

    /// Classifies an error into the outcome it terminates with.
    pub fn from_error(err: &Error) -> Self {
        let mut message = err.to_string();
        if message.is_empty() {
            message = "unknown error".to_string();
        }
        if err.is_transport() {
            RequestOutcome::TransportError {
                status: err.status_code(),
                message,
            }
        } else {
            RequestOutcome::StreamError { message }
        }
    }

    /// Returns true for the success outcome.
    pub fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success { .. })
    }

    /// Returns true for a transport error.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, RequestOutcome::TransportError { .. })
    }

    /// Returns true for a stream error.
    pub fn is_stream_error(&self) -> bool {
        matches!(self, RequestOutcome::StreamError { .. })
    }

    /// The final text on success.
    pub fn text(&self) -> Option<&str> {
        match self {
            RequestOutcome::Success { text } => Some(text),
            _ => None,
        }
    }

    /// The error message for either error outcome.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            RequestOutcome::Success { .. } => None,
            RequestOutcome::TransportError { message, .. }
            | RequestOutcome::StreamError { message } => Some(message),
        }
    }
}
