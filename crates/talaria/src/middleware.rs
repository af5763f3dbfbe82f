//! Middleware composition for HTTP handlers.
//!
//! A middleware sees the request before the handler and the response
//! descriptor after it, and may short-circuit by not calling [`Next`].
//! Chains are composed at exchange creation, so the handler is still
//! invoked at most once per exchange.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use talaria_core::{ArcHttpHandler, HttpError, HttpHandler, HttpRequest, HttpResponse};

/// An HTTP middleware stage.
///
/// Implementations receive the request and a [`Next`] that continues into
/// the rest of the chain and finally the handler. Calling `next` at most
/// once is the caller's contract; dropping it short-circuits.
pub trait HttpMiddleware: Send + Sync {
    /// Processes one request through this stage.
    fn process<'a>(
        &'a self,
        request: HttpRequest<'a>,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<HttpResponse, HttpError>>;
}

impl<F> HttpMiddleware for F
where
    F: for<'a> Fn(HttpRequest<'a>, Next<'a>) -> BoxFuture<'a, Result<HttpResponse, HttpError>>
        + Send
        + Sync,
{
    fn process<'a>(
        &'a self,
        request: HttpRequest<'a>,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<HttpResponse, HttpError>> {
        self(request, next)
    }
}

/// The remainder of a middleware chain, ending at the handler.
///
/// Consumed by [`run`](Next::run) so it can be invoked at most once.
pub struct Next<'a> {
    handler: &'a dyn HttpHandler,
    chain: &'a [Arc<dyn HttpMiddleware>],
}

impl<'a> Next<'a> {
    /// Invokes the next stage in the chain, or the handler when the chain
    /// is exhausted.
    pub async fn run(self, request: HttpRequest<'a>) -> Result<HttpResponse, HttpError> {
        match self.chain.split_first() {
            Some((stage, rest)) => {
                stage
                    .process(
                        request,
                        Next {
                            handler: self.handler,
                            chain: rest,
                        },
                    )
                    .await
            }
            None => self.handler.handle(request).await,
        }
    }
}

/// A handler wrapped in its middleware chain.
struct Wrapped {
    handler: ArcHttpHandler,
    chain: Arc<[Arc<dyn HttpMiddleware>]>,
}

impl HttpHandler for Wrapped {
    fn handle<'a>(
        &'a self,
        request: HttpRequest<'a>,
    ) -> BoxFuture<'a, Result<HttpResponse, HttpError>> {
        Box::pin(async move {
            Next {
                handler: self.handler.as_ref(),
                chain: &self.chain,
            }
            .run(request)
            .await
        })
    }
}

/// Wraps `handler` in `chain`, outermost stage first. An empty chain
/// returns the handler unchanged.
#[must_use]
pub fn wrap(handler: ArcHttpHandler, chain: Arc<[Arc<dyn HttpMiddleware>]>) -> ArcHttpHandler {
    if chain.is_empty() {
        handler
    } else {
        Arc::new(Wrapped { handler, chain })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use talaria_core::{fixtures, Content, HttpScope, Info};
    use talaria_router::RouteMatches;

    fn ok_handler(
        _request: HttpRequest<'_>,
    ) -> BoxFuture<'_, Result<HttpResponse, HttpError>> {
        Box::pin(async move { Ok(HttpResponse::new(StatusCode::OK)) })
    }

    /// Appends a header naming this stage; evidence of ordering.
    struct Tagging {
        name: &'static str,
    }

    impl HttpMiddleware for Tagging {
        fn process<'a>(
            &'a self,
            request: HttpRequest<'a>,
            next: Next<'a>,
        ) -> BoxFuture<'a, Result<HttpResponse, HttpError>> {
            Box::pin(async move {
                let response = next.run(request).await?;
                let mut headers = response.headers.unwrap_or_default();
                headers.push((
                    Bytes::from_static(b"x-stage"),
                    Bytes::copy_from_slice(self.name.as_bytes()),
                ));
                Ok(HttpResponse {
                    headers: Some(headers),
                    ..response
                })
            })
        }
    }

    /// Answers without calling the handler.
    struct ShortCircuit;

    impl HttpMiddleware for ShortCircuit {
        fn process<'a>(
            &'a self,
            _request: HttpRequest<'a>,
            _next: Next<'a>,
        ) -> BoxFuture<'a, Result<HttpResponse, HttpError>> {
            Box::pin(async move { Ok(HttpResponse::new(StatusCode::FORBIDDEN)) })
        }
    }

    async fn invoke(handler: &ArcHttpHandler) -> HttpResponse {
        let scope = HttpScope::builder().build();
        let info = Info::default();
        let matches = RouteMatches::new();
        let (_tx, mut receiver) = fixtures::inbound(1);
        let request = HttpRequest {
            scope: &scope,
            info: &info,
            matches: &matches,
            content: Content::new(&mut receiver, Bytes::new(), false),
        };
        handler.handle(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_empty_chain_is_identity() {
        let handler = wrap(Arc::new(ok_handler), Vec::new().into());
        let response = invoke(&handler).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.headers.is_none());
    }

    #[tokio::test]
    async fn test_stages_run_outermost_first() {
        let chain: Vec<Arc<dyn HttpMiddleware>> = vec![
            Arc::new(Tagging { name: "outer" }),
            Arc::new(Tagging { name: "inner" }),
        ];
        let handler = wrap(Arc::new(ok_handler), chain.into());
        let response = invoke(&handler).await;

        // Post-processing unwinds inner → outer.
        let stages: Vec<_> = response
            .headers
            .unwrap()
            .into_iter()
            .map(|(_, value)| value)
            .collect();
        assert_eq!(
            stages,
            vec![Bytes::from_static(b"inner"), Bytes::from_static(b"outer")]
        );
    }

    #[tokio::test]
    async fn test_short_circuit_skips_the_handler() {
        let chain: Vec<Arc<dyn HttpMiddleware>> = vec![
            Arc::new(ShortCircuit),
            Arc::new(Tagging { name: "never" }),
        ];
        let handler = wrap(Arc::new(ok_handler), chain.into());
        let response = invoke(&handler).await;

        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert!(response.headers.is_none());
    }
}
