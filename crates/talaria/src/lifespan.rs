//! The lifespan exchange: process startup/shutdown over the transport.
//!
//! The lifespan connection exists for the lifetime of the serving process.
//! Each startup or shutdown message runs the registered hooks in order and
//! is answered with a `*.complete` reply, or `*.failed` carrying the first
//! hook error's message. The exchange ends after shutdown is acknowledged.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use talaria_core::{ClientMessage, HttpError, Info, Receive, ServerMessage, Transmit};

/// A startup or shutdown hook. Receives the shared application info.
pub type LifespanHook =
    Arc<dyn Fn(Info) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Drains the lifespan protocol for one process lifetime.
pub struct LifespanExchange {
    info: Info,
    startup: Vec<LifespanHook>,
    shutdown: Vec<LifespanHook>,
}

impl LifespanExchange {
    /// Creates a lifespan exchange over the given hooks.
    #[must_use]
    pub fn new(info: Info, startup: Vec<LifespanHook>, shutdown: Vec<LifespanHook>) -> Self {
        Self {
            info,
            startup,
            shutdown,
        }
    }

    /// Serves lifespan messages until shutdown is acknowledged.
    ///
    /// HTTP-scope messages arriving here are protocol violations.
    pub async fn run(
        self,
        receiver: &mut dyn Receive,
        transmitter: &mut dyn Transmit,
    ) -> Result<(), HttpError> {
        loop {
            let message = receiver.receive().await?;
            tracing::debug!(kind = message.kind(), "received message");

            match message {
                ClientMessage::LifespanStartup => {
                    let reply = match run_hooks(&self.startup, &self.info).await {
                        Ok(()) => ServerMessage::StartupComplete,
                        Err(error) => {
                            tracing::error!(error = %error, "startup hook failed");
                            ServerMessage::StartupFailed {
                                message: error.to_string(),
                            }
                        }
                    };
                    transmitter.send(reply).await?;
                }
                ClientMessage::LifespanShutdown => {
                    let reply = match run_hooks(&self.shutdown, &self.info).await {
                        Ok(()) => ServerMessage::ShutdownComplete,
                        Err(error) => {
                            tracing::error!(error = %error, "shutdown hook failed");
                            ServerMessage::ShutdownFailed {
                                message: error.to_string(),
                            }
                        }
                    };
                    transmitter.send(reply).await?;
                    return Ok(());
                }
                other => {
                    return Err(HttpError::Protocol {
                        kind: other.kind(),
                        expected: "lifespan.startup",
                    })
                }
            }
        }
    }
}

/// Runs hooks in registration order, stopping at the first failure.
async fn run_hooks(hooks: &[LifespanHook], info: &Info) -> anyhow::Result<()> {
    for hook in hooks {
        hook(Arc::clone(info)).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use talaria_core::fixtures;

    fn counting_hook(counter: Arc<AtomicUsize>) -> LifespanHook {
        Arc::new(move |_info: Info| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            .boxed()
        })
    }

    fn failing_hook(message: &'static str) -> LifespanHook {
        Arc::new(move |_info: Info| async move { anyhow::bail!(message) }.boxed())
    }

    #[tokio::test]
    async fn test_startup_then_shutdown() {
        let (tx, mut receiver) = fixtures::inbound(4);
        let (mut transmitter, mut rx) = fixtures::outbound(4);

        let startup_count = Arc::new(AtomicUsize::new(0));
        let shutdown_count = Arc::new(AtomicUsize::new(0));
        let exchange = LifespanExchange::new(
            Info::default(),
            vec![counting_hook(Arc::clone(&startup_count))],
            vec![counting_hook(Arc::clone(&shutdown_count))],
        );

        tx.send(ClientMessage::LifespanStartup).await.unwrap();
        tx.send(ClientMessage::LifespanShutdown).await.unwrap();

        exchange.run(&mut receiver, &mut transmitter).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), ServerMessage::StartupComplete);
        assert_eq!(rx.recv().await.unwrap(), ServerMessage::ShutdownComplete);
        assert_eq!(startup_count.load(Ordering::SeqCst), 1);
        assert_eq!(shutdown_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failing_startup_hook_reports_failure() {
        let (tx, mut receiver) = fixtures::inbound(4);
        let (mut transmitter, mut rx) = fixtures::outbound(4);

        let ran_after_failure = Arc::new(AtomicUsize::new(0));
        let exchange = LifespanExchange::new(
            Info::default(),
            vec![
                failing_hook("database unreachable"),
                counting_hook(Arc::clone(&ran_after_failure)),
            ],
            Vec::new(),
        );

        tx.send(ClientMessage::LifespanStartup).await.unwrap();
        tx.send(ClientMessage::LifespanShutdown).await.unwrap();

        exchange.run(&mut receiver, &mut transmitter).await.unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            ServerMessage::StartupFailed {
                message: "database unreachable".to_string(),
            }
        );
        // Hooks after the failing one are skipped.
        assert_eq!(ran_after_failure.load(Ordering::SeqCst), 0);
        assert_eq!(rx.recv().await.unwrap(), ServerMessage::ShutdownComplete);
    }

    #[tokio::test]
    async fn test_http_message_is_a_protocol_violation() {
        let (tx, mut receiver) = fixtures::inbound(4);
        let (mut transmitter, _rx) = fixtures::outbound(4);

        tx.send(ClientMessage::Disconnect).await.unwrap();

        let error = LifespanExchange::new(Info::default(), Vec::new(), Vec::new())
            .run(&mut receiver, &mut transmitter)
            .await
            .unwrap_err();

        assert!(matches!(error, HttpError::Protocol { .. }));
    }
}
