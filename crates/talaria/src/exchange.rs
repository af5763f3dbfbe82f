//! The HTTP exchange state machine.
//!
//! An exchange drives one request/response cycle over a single connection:
//!
//! ```text
//! AwaitingRequest → Dispatching → StreamingResponse → Completed
//!                                                   | Disconnected
//!                                                   | Failed
//! ```
//!
//! `AwaitingRequest` blocks on the message that starts the request.
//! `Dispatching` hands the handler a lazy body over the same receiver and
//! waits for its response descriptor. `StreamingResponse` races two
//! operations on the connection: the send task emitting the response
//! messages, and the receive task waiting for the client's disconnect
//! notification. A disconnect that wins the race cancels the send task;
//! a send task that finishes first leaves the exchange waiting for the
//! disconnect before completing.
//!
//! Failure (`Err` from [`HttpExchange::run`]) is terminal for the exchange
//! only: it is logged with its context here and the caller's process keeps
//! serving other connections.

use bytes::Bytes;
use futures_util::StreamExt;

use talaria_core::{
    ArcHttpHandler, ClientMessage, Content, HttpError, HttpRequest, HttpResponse, HttpScope,
    Info, Receive, ServerMessage, Transmit,
};
use talaria_router::RouteMatches;

/// How a finished exchange ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The response was sent in full and the client's disconnect followed.
    Completed,
    /// The client disconnected first; unsent response messages were
    /// abandoned.
    Disconnected,
}

/// One request/response cycle for a single connection.
///
/// Owned exclusively by the connection-handling task and never shared
/// across connections; all state is released when `run` returns.
pub struct HttpExchange {
    scope: HttpScope,
    info: Info,
    handler: ArcHttpHandler,
    matches: RouteMatches,
}

impl HttpExchange {
    /// Creates an exchange for a resolved handler and its matched
    /// parameters.
    #[must_use]
    pub fn new(
        scope: HttpScope,
        info: Info,
        handler: ArcHttpHandler,
        matches: RouteMatches,
    ) -> Self {
        Self {
            scope,
            info,
            handler,
            matches,
        }
    }

    /// The request scope this exchange serves.
    #[must_use]
    pub fn scope(&self) -> &HttpScope {
        &self.scope
    }

    /// Drives the exchange to a terminal state.
    ///
    /// `Ok` carries the graceful outcomes; a disconnect surfacing from the
    /// request body mid-dispatch also resolves to
    /// [`Disposition::Disconnected`] rather than an error. `Err` is the
    /// failed terminal state (protocol violations, transport failures and
    /// handler failures), logged here with the exchange context. No
    /// response is guaranteed to have been fully sent in that case and the
    /// connection is presumed unusable.
    pub async fn run(
        self,
        receiver: &mut dyn Receive,
        transmitter: &mut dyn Transmit,
    ) -> Result<Disposition, HttpError> {
        let mut state = "awaiting-request";
        match self.drive(receiver, transmitter, &mut state).await {
            Ok(disposition) => {
                tracing::debug!(?disposition, "exchange finished");
                Ok(disposition)
            }
            Err(error) if error.is_disconnect() => {
                tracing::debug!("client disconnected during dispatch");
                Ok(Disposition::Disconnected)
            }
            Err(error) => {
                tracing::error!(
                    method = %self.scope.method(),
                    path = self.scope.path(),
                    state,
                    error = %error,
                    "exchange failed"
                );
                Err(error)
            }
        }
    }

    async fn drive(
        &self,
        receiver: &mut dyn Receive,
        transmitter: &mut dyn Transmit,
        state: &mut &'static str,
    ) -> Result<Disposition, HttpError> {
        // AwaitingRequest: only the message kind that starts a request is
        // valid here.
        let message = receiver.receive().await?;
        tracing::debug!(kind = message.kind(), "received message");
        let kind = message.kind();
        let ClientMessage::Request { body, more_body } = message else {
            return Err(HttpError::Protocol {
                kind,
                expected: "http.request",
            });
        };

        // Dispatching: one handler invocation, with the body as a lazy pull
        // sequence over this connection's receiver.
        *state = "dispatching";
        let response = {
            let request = HttpRequest {
                scope: &self.scope,
                info: &self.info,
                matches: &self.matches,
                content: Content::new(receiver, body, more_body),
            };
            self.handler.handle(request).await?
        };

        *state = "streaming-response";
        stream_response(receiver, transmitter, response, self.scope.supports_push()).await
    }
}

/// Races the response send against the disconnect notification.
///
/// The send future is pinned locally so that returning on a disconnect
/// drops, and thereby cancels, it without emitting further messages.
/// Once the send has finished the cancellation path is gone and the race
/// degenerates to waiting for the disconnect alone.
async fn stream_response(
    receiver: &mut dyn Receive,
    transmitter: &mut dyn Transmit,
    response: HttpResponse,
    push_allowed: bool,
) -> Result<Disposition, HttpError> {
    let send = send_response(transmitter, response, push_allowed);
    tokio::pin!(send);
    let mut send_finished = false;

    loop {
        tokio::select! {
            result = &mut send, if !send_finished => {
                result?;
                send_finished = true;
            }
            message = receiver.receive() => {
                let message = message?;
                tracing::debug!(kind = message.kind(), "received message");
                return match message {
                    ClientMessage::Disconnect if send_finished => Ok(Disposition::Completed),
                    ClientMessage::Disconnect => Ok(Disposition::Disconnected),
                    other => Err(HttpError::Protocol {
                        kind: other.kind(),
                        expected: "http.disconnect",
                    }),
                };
            }
        }
    }
}

/// Emits the response messages in wire order: one start, then pushes when
/// allowed, then the body chunks with a one-chunk lookahead driving the
/// `more_body` flag, the last chunk carrying `false`. A body that yields
/// nothing (or no body at all) becomes a single empty terminal message.
async fn send_response(
    transmitter: &mut dyn Transmit,
    response: HttpResponse,
    push_allowed: bool,
) -> Result<(), HttpError> {
    let HttpResponse {
        status,
        headers,
        body,
        pushes,
    } = response;

    tracing::debug!(%status, "sending response start");
    transmitter
        .send(ServerMessage::ResponseStart {
            status,
            headers: headers.unwrap_or_default(),
        })
        .await?;

    if push_allowed {
        for push in pushes.unwrap_or_default() {
            tracing::debug!(path = push.path.as_str(), "sending push");
            transmitter
                .send(ServerMessage::ResponsePush {
                    path: push.path,
                    headers: push.headers,
                })
                .await?;
        }
    }

    let Some(mut body) = body else {
        return send_terminal(transmitter).await;
    };
    let Some(mut current) = body.next().await else {
        return send_terminal(transmitter).await;
    };

    loop {
        match body.next().await {
            Some(next) => {
                transmitter
                    .send(ServerMessage::ResponseBody {
                        body: current,
                        more_body: true,
                    })
                    .await?;
                current = next;
            }
            None => {
                transmitter
                    .send(ServerMessage::ResponseBody {
                        body: current,
                        more_body: false,
                    })
                    .await?;
                return Ok(());
            }
        }
    }
}

/// Sends the empty terminal body message.
async fn send_terminal(transmitter: &mut dyn Transmit) -> Result<(), HttpError> {
    transmitter
        .send(ServerMessage::ResponseBody {
            body: Bytes::new(),
            more_body: false,
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures_util::future::BoxFuture;
    use http::StatusCode;
    use std::sync::Arc;
    use talaria_core::fixtures;

    fn ok_handler(
        _request: HttpRequest<'_>,
    ) -> BoxFuture<'_, Result<HttpResponse, HttpError>> {
        Box::pin(async move { Ok(HttpResponse::new(StatusCode::OK)) })
    }

    fn exchange_for(handler: ArcHttpHandler) -> HttpExchange {
        HttpExchange::new(
            HttpScope::builder().build(),
            Info::default(),
            handler,
            RouteMatches::new(),
        )
    }

    #[tokio::test]
    async fn test_first_message_must_start_a_request() {
        let (tx, mut receiver) = fixtures::inbound(4);
        let (mut transmitter, _rx) = fixtures::outbound(4);
        tx.send(ClientMessage::Disconnect).await.unwrap();

        let error = exchange_for(Arc::new(ok_handler))
            .run(&mut receiver, &mut transmitter)
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            HttpError::Protocol {
                kind: "http.disconnect",
                expected: "http.request",
            }
        ));
    }

    #[tokio::test]
    async fn test_status_only_response_sends_empty_terminal_body() {
        let (tx, mut receiver) = fixtures::inbound(4);
        let (mut transmitter, mut rx) = fixtures::outbound(4);

        tx.send(ClientMessage::Request {
            body: Bytes::new(),
            more_body: false,
        })
        .await
        .unwrap();

        let task = tokio::spawn(async move {
            exchange_for(Arc::new(ok_handler))
                .run(&mut receiver, &mut transmitter)
                .await
        });

        assert_eq!(
            rx.recv().await.unwrap(),
            ServerMessage::ResponseStart {
                status: StatusCode::OK,
                headers: Vec::new(),
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            ServerMessage::ResponseBody {
                body: Bytes::new(),
                more_body: false,
            }
        );

        tx.send(ClientMessage::Disconnect).await.unwrap();
        let disposition = task.await.unwrap().unwrap();
        assert_eq!(disposition, Disposition::Completed);
    }

    #[tokio::test]
    async fn test_handler_failure_fails_the_exchange() {
        struct Failing;

        impl talaria_core::HttpHandler for Failing {
            fn handle<'a>(
                &'a self,
                _request: HttpRequest<'a>,
            ) -> BoxFuture<'a, Result<HttpResponse, HttpError>> {
                Box::pin(async move { Err(HttpError::handler(anyhow::anyhow!("boom"))) })
            }
        }

        let (tx, mut receiver) = fixtures::inbound(4);
        let (mut transmitter, mut rx) = fixtures::outbound(4);
        tx.send(ClientMessage::Request {
            body: Bytes::new(),
            more_body: false,
        })
        .await
        .unwrap();

        let result = exchange_for(Arc::new(Failing))
            .run(&mut receiver, &mut transmitter)
            .await;

        assert!(matches!(result, Err(HttpError::Handler(_))));
        // Nothing was sent: the failure happened before streaming began.
        assert!(rx.try_recv().is_err());
    }
}
