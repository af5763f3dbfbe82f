//! # Talaria
//!
//! A minimal web-server-gateway adapter: Talaria binds an ASGI-style
//! message transport to user-registered route handlers. The surrounding
//! server owns sockets and protocol parsing and talks to Talaria through
//! the [`Receive`]/[`Transmit`] message traits; application code registers
//! handlers against path templates and gets a streamed request/response
//! cycle per connection.
//!
//! The two load-bearing pieces:
//!
//! - [`talaria_router`] compiles path templates with typed parameters
//!   (`/users/{id:int}`, `/files/{rest:path}`) and resolves requests in
//!   registration order, falling back to a configurable not-found handler.
//! - [`HttpExchange`] is the per-connection state machine: it reads the
//!   request, exposes the body to the handler as a lazy pull sequence,
//!   then races the response send against the client's disconnect
//!   notification, cancelling unsent chunks when the client goes away.
//!
//! ## Quick start
//!
//! ```rust
//! use futures_util::future::BoxFuture;
//! use http::{Method, StatusCode};
//! use std::sync::Arc;
//! use talaria::{Application, HttpError, HttpRequest, HttpResponse};
//!
//! fn hello(_request: HttpRequest<'_>) -> BoxFuture<'_, Result<HttpResponse, HttpError>> {
//!     Box::pin(async move { Ok(HttpResponse::text(StatusCode::OK, "hello")) })
//! }
//!
//! let mut app = Application::new();
//! app.add_route([Method::GET], "/hello", Arc::new(hello)).unwrap();
//! let gateway = app.build();
//!
//! // For each incoming connection the embedding server does:
//! //   gateway.http(scope).run(&mut receiver, &mut transmitter).await
//! # let _ = gateway;
//! ```

#![doc(html_root_url = "https://docs.rs/talaria/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod exchange;
mod lifespan;
mod middleware;

pub use app::{Application, Gateway};
pub use exchange::{Disposition, HttpExchange};
pub use lifespan::{LifespanExchange, LifespanHook};
pub use middleware::{wrap, HttpMiddleware, Next};

// Re-export the core and router crates.
pub use talaria_core as core;
pub use talaria_router as router;

// The types handlers and embedding servers touch on every request, at the
// crate root.
pub use talaria_core::{
    bytes_writer, text_writer, ArcHttpHandler, BodyStream, ClientMessage, Content, Header,
    HttpError, HttpHandler, HttpRequest, HttpResponse, HttpResult, HttpScope, Info,
    PushDirective, Receive, ServerMessage, Transmit, TransportError,
};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use talaria::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Application, Disposition, Gateway, HttpExchange, HttpMiddleware, Next};
    pub use talaria_core::{
        bytes_writer, text_writer, ArcHttpHandler, BodyStream, ClientMessage, Content, Header,
        HttpError, HttpHandler, HttpRequest, HttpResponse, HttpResult, HttpScope, Info,
        PushDirective, Receive, ServerMessage, Transmit, TransportError,
    };
    pub use talaria_router::{ParamValue, PathRouter, RouteError, RouteMatches};
}
