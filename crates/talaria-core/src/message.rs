//! The transport message protocol.
//!
//! These enums are the typed form of the messages exchanged with the
//! surrounding server. Their [`kind`](ClientMessage::kind) strings are the
//! on-the-wire message type names and must stay bit-exact for
//! interoperability with existing transports, as must the `more_body`
//! continuation semantics on request and response body messages.

use bytes::Bytes;
use http::StatusCode;

/// An ASGI-style header: a `(name, value)` byte pair.
pub type Header = (Bytes, Bytes);

/// A message delivered by the transport to this core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// A request body chunk. The first `Request` of a connection starts the
    /// exchange; `more_body` announces whether further chunks follow.
    Request {
        /// The body chunk, possibly empty.
        body: Bytes,
        /// True when more body chunks follow.
        more_body: bool,
    },
    /// The client went away, mid-request or mid-response.
    Disconnect,
    /// The enclosing process is starting up (lifespan protocol).
    LifespanStartup,
    /// The enclosing process is shutting down (lifespan protocol).
    LifespanShutdown,
}

impl ClientMessage {
    /// Returns the wire-level message type name.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Request { .. } => "http.request",
            Self::Disconnect => "http.disconnect",
            Self::LifespanStartup => "lifespan.startup",
            Self::LifespanShutdown => "lifespan.shutdown",
        }
    }
}

/// A message sent by this core to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Starts the response. Sent exactly once per exchange, before any
    /// push or body message.
    ResponseStart {
        /// The response status code.
        status: StatusCode,
        /// The response headers.
        headers: Vec<Header>,
    },
    /// An early resource hint. Only sent when the transport advertises
    /// push support and the request protocol version allows it.
    ResponsePush {
        /// The path of the pushed resource.
        path: String,
        /// Headers for the push request.
        headers: Vec<Header>,
    },
    /// A response body chunk; `more_body` is set on every chunk except
    /// the last.
    ResponseBody {
        /// The body chunk, possibly empty.
        body: Bytes,
        /// True when more body chunks follow.
        more_body: bool,
    },
    /// Startup hooks finished successfully (lifespan protocol).
    StartupComplete,
    /// A startup hook failed (lifespan protocol).
    StartupFailed {
        /// The hook error message.
        message: String,
    },
    /// Shutdown hooks finished successfully (lifespan protocol).
    ShutdownComplete,
    /// A shutdown hook failed (lifespan protocol).
    ShutdownFailed {
        /// The hook error message.
        message: String,
    },
}

impl ServerMessage {
    /// Returns the wire-level message type name.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ResponseStart { .. } => "http.response.start",
            Self::ResponsePush { .. } => "http.response.push",
            Self::ResponseBody { .. } => "http.response.body",
            Self::StartupComplete => "lifespan.startup.complete",
            Self::StartupFailed { .. } => "lifespan.startup.failed",
            Self::ShutdownComplete => "lifespan.shutdown.complete",
            Self::ShutdownFailed { .. } => "lifespan.shutdown.failed",
        }
    }
}
