//! Error types for the exchange core.
//!
//! The taxonomy separates expected termination from failure:
//! [`HttpError::Disconnect`] is the graceful, non-error end of an exchange,
//! while protocol violations, transport failures and handler failures are
//! fatal to the exchange (and only to that exchange).

use thiserror::Error;

/// Result alias for exchange-level operations.
pub type HttpResult<T> = Result<T, HttpError>;

/// A failure reported by a transport implementation.
#[derive(Debug, Error)]
#[error("transport failure: {message}")]
pub struct TransportError {
    /// Human-readable description.
    message: String,
    /// The underlying cause, if any.
    #[source]
    source: Option<anyhow::Error>,
}

impl TransportError {
    /// Creates a transport error with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a transport error wrapping an underlying cause.
    pub fn with_source(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors arising while driving a single HTTP exchange.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The transport delivered a message kind that is not valid in the
    /// current exchange state.
    #[error("protocol violation: received '{kind}' while expecting '{expected}'")]
    Protocol {
        /// The message kind that arrived.
        kind: &'static str,
        /// The message kind the state machine was waiting for.
        expected: &'static str,
    },

    /// The client disconnected. Expected termination, not a failure:
    /// in-flight sends are cancelled and nothing is reported as an error.
    #[error("client disconnected")]
    Disconnect,

    /// The transport itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request body was not valid UTF-8 (raised by the text helper).
    #[error("request body is not valid utf-8")]
    InvalidText(#[from] std::string::FromUtf8Error),

    /// The application handler failed.
    #[error("handler failure: {0}")]
    Handler(#[source] anyhow::Error),
}

impl HttpError {
    /// Wraps an application failure.
    pub fn handler(error: impl Into<anyhow::Error>) -> Self {
        Self::Handler(error.into())
    }

    /// True for the graceful disconnect signal, which callers must not
    /// report as an error.
    #[must_use]
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Disconnect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        let error = TransportError::new("socket closed");
        assert_eq!(error.to_string(), "transport failure: socket closed");
        assert_eq!(error.message(), "socket closed");
    }

    #[test]
    fn test_transport_error_with_source() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let error = TransportError::with_source("write failed", io);
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_protocol_violation_display() {
        let error = HttpError::Protocol {
            kind: "http.disconnect",
            expected: "http.request",
        };
        assert_eq!(
            error.to_string(),
            "protocol violation: received 'http.disconnect' while expecting 'http.request'"
        );
        assert!(!error.is_disconnect());
    }

    #[test]
    fn test_disconnect_is_not_a_failure() {
        assert!(HttpError::Disconnect.is_disconnect());
    }

    #[test]
    fn test_handler_error_wraps_source() {
        let error = HttpError::handler(anyhow::anyhow!("boom"));
        assert!(error.to_string().contains("boom"));
    }
}
