//! Application wiring: the build phase and the frozen serve phase.
//!
//! Registration happens on an [`Application`] (routes, middleware,
//! lifespan hooks, shared info) and fails fast on malformed templates.
//! [`Application::build`] freezes everything into an immutable [`Gateway`]
//! from which per-connection exchanges are created. The split enforces the
//! build-then-serve lifecycle: no registration can race resolution, so the
//! route table needs no locking while serving.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use http::{Method, StatusCode};

use talaria_core::{
    bytes_writer, ArcHttpHandler, Header, HttpError, HttpHandler, HttpRequest, HttpResponse,
    HttpScope, Info,
};
use talaria_router::{PathRouter, RouteError};

use crate::exchange::HttpExchange;
use crate::lifespan::{LifespanExchange, LifespanHook};
use crate::middleware::{wrap, HttpMiddleware};

/// Serves a fixed response for paths no route claims.
struct NotFoundHandler {
    status: StatusCode,
    headers: Vec<Header>,
    body: Bytes,
}

impl HttpHandler for NotFoundHandler {
    fn handle<'a>(
        &'a self,
        _request: HttpRequest<'a>,
    ) -> BoxFuture<'a, Result<HttpResponse, HttpError>> {
        Box::pin(async move {
            Ok(HttpResponse::new(self.status)
                .with_headers(self.headers.clone())
                .with_body(bytes_writer(self.body.clone(), None)))
        })
    }
}

fn default_not_found() -> ArcHttpHandler {
    Arc::new(NotFoundHandler {
        status: StatusCode::NOT_FOUND,
        headers: vec![(
            Bytes::from_static(b"content-type"),
            Bytes::from_static(b"text/plain"),
        )],
        body: Bytes::from_static(b"Not Found"),
    })
}

/// The registration-phase application.
///
/// # Example
///
/// ```rust
/// use futures_util::future::BoxFuture;
/// use http::{Method, StatusCode};
/// use std::sync::Arc;
/// use talaria::{Application, HttpError, HttpRequest, HttpResponse};
///
/// fn get_user(request: HttpRequest<'_>) -> BoxFuture<'_, Result<HttpResponse, HttpError>> {
///     Box::pin(async move {
///         let id = request.matches.get("id").and_then(|v| v.as_int());
///         Ok(HttpResponse::text(StatusCode::OK, format!("user {}", id.unwrap_or(0))))
///     })
/// }
///
/// let mut app = Application::new();
/// app.add_route([Method::GET], "/users/{id:int}", Arc::new(get_user)).unwrap();
/// let gateway = app.build();
/// ```
pub struct Application {
    router: PathRouter<ArcHttpHandler>,
    middlewares: Vec<Arc<dyn HttpMiddleware>>,
    info: HashMap<String, serde_json::Value>,
    startup: Vec<LifespanHook>,
    shutdown: Vec<LifespanHook>,
}

impl Application {
    /// Creates an application with the default `404 Not Found` fallback.
    #[must_use]
    pub fn new() -> Self {
        Self {
            router: PathRouter::new(default_not_found()),
            middlewares: Vec::new(),
            info: HashMap::new(),
            startup: Vec::new(),
            shutdown: Vec::new(),
        }
    }

    /// Registers `handler` for `pattern` under every listed method.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] when the template is malformed: a
    /// configuration-time failure, raised synchronously.
    pub fn add_route<M>(
        &mut self,
        methods: M,
        pattern: &str,
        handler: ArcHttpHandler,
    ) -> Result<(), RouteError>
    where
        M: IntoIterator<Item = Method>,
    {
        self.router.add(methods, pattern, handler)
    }

    /// Appends a middleware stage. Stages run in registration order,
    /// outermost first.
    pub fn middleware(&mut self, middleware: Arc<dyn HttpMiddleware>) {
        self.middlewares.push(middleware);
    }

    /// Registers a startup hook for the lifespan exchange.
    pub fn on_startup(&mut self, hook: LifespanHook) {
        self.startup.push(hook);
    }

    /// Registers a shutdown hook for the lifespan exchange.
    pub fn on_shutdown(&mut self, hook: LifespanHook) {
        self.shutdown.push(hook);
    }

    /// Stores a value in the shared application info.
    pub fn insert_info(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.info.insert(key.into(), value);
    }

    /// Replaces the not-found response served when no route matches.
    pub fn not_found_response(
        &mut self,
        status: StatusCode,
        headers: Vec<Header>,
        body: impl Into<Bytes>,
    ) {
        self.router.set_not_found(Arc::new(NotFoundHandler {
            status,
            headers,
            body: body.into(),
        }));
    }

    /// Freezes the application into an immutable [`Gateway`].
    #[must_use]
    pub fn build(self) -> Gateway {
        Gateway {
            router: self.router,
            middlewares: self.middlewares.into(),
            info: Arc::new(self.info),
            startup: self.startup,
            shutdown: self.shutdown,
        }
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

/// The frozen, serve-phase application.
///
/// Read-only and cheap to share across connection tasks; every exchange it
/// creates resolves against the same immutable route table.
pub struct Gateway {
    router: PathRouter<ArcHttpHandler>,
    middlewares: Arc<[Arc<dyn HttpMiddleware>]>,
    info: Info,
    startup: Vec<LifespanHook>,
    shutdown: Vec<LifespanHook>,
}

impl Gateway {
    /// Creates the HTTP exchange for a newly arrived connection scope:
    /// resolves the route, wraps the handler in the middleware chain and
    /// hands both to the state machine.
    #[must_use]
    pub fn http(&self, scope: HttpScope) -> HttpExchange {
        let resolution = self.router.resolve(scope.method(), scope.path());
        let (handler, matches) = resolution.into_parts();
        let handler = wrap(Arc::clone(handler), Arc::clone(&self.middlewares));
        HttpExchange::new(scope, Arc::clone(&self.info), handler, matches)
    }

    /// Creates the lifespan exchange for the process lifetime.
    #[must_use]
    pub fn lifespan(&self) -> LifespanExchange {
        LifespanExchange::new(
            Arc::clone(&self.info),
            self.startup.clone(),
            self.shutdown.clone(),
        )
    }

    /// The shared application info.
    #[must_use]
    pub fn info(&self) -> &Info {
        &self.info
    }

    /// The number of registered route entries.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.router.route_count()
    }
}
