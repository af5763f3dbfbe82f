//! The lazy request body and response body writers.

use bytes::{Bytes, BytesMut};
use futures_util::stream::{self, StreamExt};

use crate::error::HttpError;
use crate::handler::BodyStream;
use crate::message::ClientMessage;
use crate::transport::Receive;

/// The request body as a lazy, pull-based sequence of chunks.
///
/// The first chunk comes from the request message that opened the exchange;
/// while that message announced `more_body`, each further [`next`] suspends
/// on the transport for the following chunk. The sequence is not
/// restartable and is never pre-buffered: a handler that does not pull
/// simply leaves transport messages unconsumed.
///
/// A disconnect arriving mid-body ends the sequence with
/// [`HttpError::Disconnect`], the expected non-fatal termination, while
/// any other message kind is a protocol violation.
///
/// [`next`]: Content::next
pub struct Content<'a> {
    receiver: &'a mut dyn Receive,
    pending: Option<Bytes>,
    more_body: bool,
}

impl<'a> Content<'a> {
    /// Wraps the first chunk and its continuation flag around the
    /// connection's receiver.
    #[must_use]
    pub fn new(receiver: &'a mut dyn Receive, first: Bytes, more_body: bool) -> Self {
        Self {
            receiver,
            pending: Some(first),
            more_body,
        }
    }

    /// Pulls the next body chunk, or `None` once the body is exhausted.
    pub async fn next(&mut self) -> Result<Option<Bytes>, HttpError> {
        if let Some(chunk) = self.pending.take() {
            return Ok(Some(chunk));
        }
        if !self.more_body {
            return Ok(None);
        }

        let message = self.receiver.receive().await?;
        tracing::debug!(kind = message.kind(), "received message");
        match message {
            ClientMessage::Request { body, more_body } => {
                self.more_body = more_body;
                Ok(Some(body))
            }
            ClientMessage::Disconnect => {
                self.more_body = false;
                Err(HttpError::Disconnect)
            }
            other => {
                self.more_body = false;
                Err(HttpError::Protocol {
                    kind: other.kind(),
                    expected: "http.request",
                })
            }
        }
    }

    /// Pulls the remaining chunks into one buffer.
    pub async fn read_to_end(&mut self) -> Result<Bytes, HttpError> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = self.next().await? {
            buffer.extend_from_slice(&chunk);
        }
        Ok(buffer.freeze())
    }

    /// Pulls the remaining chunks and decodes them as UTF-8.
    pub async fn text(&mut self) -> Result<String, HttpError> {
        let bytes = self.read_to_end().await?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

impl std::fmt::Debug for Content<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Content")
            .field("pending", &self.pending.as_ref().map(Bytes::len))
            .field("more_body", &self.more_body)
            .finish_non_exhaustive()
    }
}

/// Builds a single-chunk response body from text.
pub fn text_writer(text: impl Into<String>) -> BodyStream {
    let chunk = Bytes::from(text.into());
    stream::once(async move { chunk }).boxed()
}

/// Builds a response body from a buffer, split into `chunk_size` pieces
/// when a size is given, or yielded whole otherwise.
pub fn bytes_writer(buffer: Bytes, chunk_size: Option<usize>) -> BodyStream {
    match chunk_size {
        None | Some(0) => stream::once(async move { buffer }).boxed(),
        Some(size) => stream::unfold(buffer, move |mut remaining| async move {
            if remaining.is_empty() {
                None
            } else {
                let chunk = remaining.split_to(size.min(remaining.len()));
                Some((chunk, remaining))
            }
        })
        .boxed(),
    }
}
