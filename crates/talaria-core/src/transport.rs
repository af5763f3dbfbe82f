//! Transport traits at the boundary with the surrounding server.
//!
//! A connection's transport is split into two halves, mirroring the
//! receive/send callable pair of the underlying protocol: the exchange
//! state machine needs to await both concurrently during the disconnect
//! race, which a single combined trait could not express.

use futures_util::future::BoxFuture;

use crate::error::TransportError;
use crate::message::{ClientMessage, ServerMessage};

/// The receiving half of a connection's transport.
///
/// `receive` futures are raced against the response send and may be dropped
/// before completion; implementations must be cancellation-safe so a
/// dropped future never loses a message.
pub trait Receive: Send {
    /// Waits for the next message from the transport.
    fn receive(&mut self) -> BoxFuture<'_, Result<ClientMessage, TransportError>>;
}

/// The sending half of a connection's transport.
pub trait Transmit: Send {
    /// Delivers a message to the transport, suspending until the transport
    /// accepts it.
    fn send(&mut self, message: ServerMessage) -> BoxFuture<'_, Result<(), TransportError>>;
}
