//! The handler contract and response descriptor.

use std::sync::Arc;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;
use http::StatusCode;
use talaria_router::RouteMatches;

use crate::content::{text_writer, Content};
use crate::error::HttpError;
use crate::message::Header;
use crate::scope::{HttpScope, Info};

/// A streaming response body: a finite, non-restartable sequence of chunks.
pub type BodyStream = BoxStream<'static, Bytes>;

/// A shared, type-erased handler as stored in route tables.
pub type ArcHttpHandler = Arc<dyn HttpHandler>;

/// Everything a handler receives for one exchange.
pub struct HttpRequest<'a> {
    /// The immutable request scope.
    pub scope: &'a HttpScope,
    /// Shared application context.
    pub info: &'a Info,
    /// Parameters extracted by the matched route template.
    pub matches: &'a RouteMatches,
    /// The lazy request body. Consumed at the handler's own pace; never
    /// pre-buffered.
    pub content: Content<'a>,
}

impl std::fmt::Debug for HttpRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", self.scope.method())
            .field("path", &self.scope.path())
            .field("matches", self.matches)
            .finish_non_exhaustive()
    }
}

/// An early resource hint, sent before the response body when the
/// transport supports push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushDirective {
    /// The path of the resource being announced.
    pub path: String,
    /// Headers for the push request.
    pub headers: Vec<Header>,
}

impl PushDirective {
    /// Creates a push directive for a path with no extra headers.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            headers: Vec::new(),
        }
    }

    /// Adds headers to the push request.
    #[must_use]
    pub fn with_headers(mut self, headers: Vec<Header>) -> Self {
        self.headers = headers;
        self
    }
}

/// The response descriptor a handler returns: status, optional headers,
/// optional streaming body and optional push directives. The exchange
/// state machine turns this into wire messages.
pub struct HttpResponse {
    /// The response status code.
    pub status: StatusCode,
    /// Response headers, if any.
    pub headers: Option<Vec<Header>>,
    /// The response body as a lazy chunk sequence, if any.
    pub body: Option<BodyStream>,
    /// Early resource hints, if any.
    pub pushes: Option<Vec<PushDirective>>,
}

impl HttpResponse {
    /// A bare response with only a status code.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: None,
            body: None,
            pushes: None,
        }
    }

    /// A `text/plain` response.
    #[must_use]
    pub fn text(status: StatusCode, text: impl Into<String>) -> Self {
        Self::new(status)
            .with_headers(vec![(
                Bytes::from_static(b"content-type"),
                Bytes::from_static(b"text/plain"),
            )])
            .with_body(text_writer(text))
    }

    /// Sets the response headers.
    #[must_use]
    pub fn with_headers(mut self, headers: Vec<Header>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Sets the response body.
    #[must_use]
    pub fn with_body(mut self, body: BodyStream) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the push directives.
    #[must_use]
    pub fn with_pushes(mut self, pushes: Vec<PushDirective>) -> Self {
        self.pushes = Some(pushes);
        self
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("has_body", &self.body.is_some())
            .field("pushes", &self.pushes)
            .finish()
    }
}

/// A request handler.
///
/// Invoked exactly once per exchange with the scope, shared info, matched
/// parameters and the lazy request body; returns the response descriptor.
/// Errors propagate to the exchange boundary: a
/// [`Disconnect`](HttpError::Disconnect) surfacing from the body sequence
/// ends the exchange gracefully, anything else fails it.
///
/// Any function of the right shape is a handler:
///
/// ```rust
/// use futures_util::future::BoxFuture;
/// use http::StatusCode;
/// use talaria_core::{HttpError, HttpRequest, HttpResponse};
///
/// fn hello(_request: HttpRequest<'_>) -> BoxFuture<'_, Result<HttpResponse, HttpError>> {
///     Box::pin(async move { Ok(HttpResponse::text(StatusCode::OK, "hello")) })
/// }
///
/// let handler: talaria_core::ArcHttpHandler = std::sync::Arc::new(hello);
/// ```
pub trait HttpHandler: Send + Sync {
    /// Handles one request, returning the response descriptor.
    fn handle<'a>(
        &'a self,
        request: HttpRequest<'a>,
    ) -> BoxFuture<'a, Result<HttpResponse, HttpError>>;
}

impl<F> HttpHandler for F
where
    F: for<'a> Fn(HttpRequest<'a>) -> BoxFuture<'a, Result<HttpResponse, HttpError>>
        + Send
        + Sync,
{
    fn handle<'a>(
        &'a self,
        request: HttpRequest<'a>,
    ) -> BoxFuture<'a, Result<HttpResponse, HttpError>> {
        self(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use futures_util::StreamExt;

    #[test]
    fn test_response_builders() {
        let response = HttpResponse::new(StatusCode::NO_CONTENT);
        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert!(response.headers.is_none());
        assert!(response.body.is_none());
        assert!(response.pushes.is_none());

        let response = HttpResponse::text(StatusCode::OK, "hi");
        assert_eq!(
            response.headers.as_deref(),
            Some(
                &[(
                    Bytes::from_static(b"content-type"),
                    Bytes::from_static(b"text/plain"),
                )][..]
            )
        );
        assert!(response.body.is_some());
    }

    #[tokio::test]
    async fn test_text_response_body_contents() {
        let response = HttpResponse::text(StatusCode::OK, "payload");
        let mut body = response.body.unwrap();
        assert_eq!(body.next().await, Some(Bytes::from_static(b"payload")));
        assert_eq!(body.next().await, None);
    }

    #[test]
    fn test_push_directive() {
        let push = PushDirective::new("/style.css")
            .with_headers(vec![(Bytes::from_static(b"accept"), Bytes::from_static(b"*/*"))]);
        assert_eq!(push.path, "/style.css");
        assert_eq!(push.headers.len(), 1);
    }

    #[tokio::test]
    async fn test_fn_handler_blanket_impl() {
        fn echo_status(
            _request: HttpRequest<'_>,
        ) -> BoxFuture<'_, Result<HttpResponse, HttpError>> {
            Box::pin(async move { Ok(HttpResponse::new(StatusCode::ACCEPTED)) })
        }

        let handler: ArcHttpHandler = Arc::new(echo_status);

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

        let response = handler.handle(request).await.unwrap();
        assert_eq!(response.status, StatusCode::ACCEPTED);
    }
}
