//! Channel-backed transports for tests and in-process embedding.
//!
//! A pair of tokio mpsc channels stands in for a real transport: tests push
//! [`ClientMessage`]s into the inbound sender and read [`ServerMessage`]s
//! from the outbound receiver while an exchange runs against the other
//! ends. `tokio::sync::mpsc::Receiver::recv` is cancellation-safe, which
//! the [`Receive`] contract requires.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::message::{ClientMessage, ServerMessage};
use crate::transport::{Receive, Transmit};

/// A [`Receive`] implementation fed from an in-process channel.
#[derive(Debug)]
pub struct ChannelReceive {
    rx: mpsc::Receiver<ClientMessage>,
}

impl Receive for ChannelReceive {
    fn receive(&mut self) -> BoxFuture<'_, Result<ClientMessage, TransportError>> {
        async move {
            self.rx
                .recv()
                .await
                .ok_or_else(|| TransportError::new("inbound channel closed"))
        }
        .boxed()
    }
}

/// A [`Transmit`] implementation writing to an in-process channel.
#[derive(Debug)]
pub struct ChannelTransmit {
    tx: mpsc::Sender<ServerMessage>,
}

impl Transmit for ChannelTransmit {
    fn send(&mut self, message: ServerMessage) -> BoxFuture<'_, Result<(), TransportError>> {
        async move {
            self.tx
                .send(message)
                .await
                .map_err(|_| TransportError::new("outbound channel closed"))
        }
        .boxed()
    }
}

/// Creates the inbound half: a sender for the test to drive and the
/// [`Receive`] end for the exchange.
#[must_use]
pub fn inbound(capacity: usize) -> (mpsc::Sender<ClientMessage>, ChannelReceive) {
    let (tx, rx) = mpsc::channel(capacity);
    (tx, ChannelReceive { rx })
}

/// Creates the outbound half: the [`Transmit`] end for the exchange and a
/// receiver for the test to inspect.
#[must_use]
pub fn outbound(capacity: usize) -> (ChannelTransmit, mpsc::Receiver<ServerMessage>) {
    let (tx, rx) = mpsc::channel(capacity);
    (ChannelTransmit { tx }, rx)
}
