//! The HTTP connection scope and shared application info.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::Method;

use crate::message::Header;

/// The transport extension name advertising server push support.
const PUSH_EXTENSION: &str = "http.response.push";

/// Shared, read-only application context handed to every handler.
///
/// Values are schema-free JSON so applications can stash whatever
/// configuration or wiring they need at build time.
pub type Info = Arc<HashMap<String, serde_json::Value>>;

/// The immutable per-request scope: method, path, headers and protocol
/// metadata as delivered by the transport when the connection opened.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use talaria_core::HttpScope;
///
/// let scope = HttpScope::builder()
///     .method(Method::POST)
///     .path("/orders")
///     .http_version("1.1")
///     .build();
///
/// assert_eq!(scope.method(), &Method::POST);
/// assert_eq!(scope.path(), "/orders");
/// assert!(!scope.supports_push());
/// ```
#[derive(Debug, Clone)]
pub struct HttpScope {
    method: Method,
    path: String,
    query_string: Bytes,
    headers: Vec<Header>,
    http_version: String,
    scheme: String,
    client: Option<SocketAddr>,
    server: Option<SocketAddr>,
    extensions: Vec<String>,
}

impl HttpScope {
    /// Creates a scope builder with GET `/` over HTTP/1.1 defaults.
    #[must_use]
    pub fn builder() -> HttpScopeBuilder {
        HttpScopeBuilder::default()
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw query string (without the leading `?`).
    #[must_use]
    pub fn query_string(&self) -> &Bytes {
        &self.query_string
    }

    /// The request headers as byte pairs, in arrival order.
    #[must_use]
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// The first header value with the given name, compared
    /// case-insensitively.
    #[must_use]
    pub fn header(&self, name: &[u8]) -> Option<&Bytes> {
        self.headers
            .iter()
            .find(|(header_name, _)| header_name.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// The HTTP protocol version, e.g. `"1.1"` or `"2"`.
    #[must_use]
    pub fn http_version(&self) -> &str {
        &self.http_version
    }

    /// The URL scheme, e.g. `"http"` or `"https"`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The client address, when the transport knows it.
    #[must_use]
    pub fn client(&self) -> Option<SocketAddr> {
        self.client
    }

    /// The server address, when the transport knows it.
    #[must_use]
    pub fn server(&self) -> Option<SocketAddr> {
        self.server
    }

    /// The extension names advertised by the transport.
    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// True when push messages may be sent on this exchange: the transport
    /// must advertise the push extension and the request must be HTTP/2.
    #[must_use]
    pub fn supports_push(&self) -> bool {
        self.extensions.iter().any(|name| name == PUSH_EXTENSION)
            && matches!(self.http_version.as_str(), "2" | "2.0")
    }
}

/// Fluent builder for [`HttpScope`].
#[derive(Debug)]
pub struct HttpScopeBuilder {
    method: Method,
    path: String,
    query_string: Bytes,
    headers: Vec<Header>,
    http_version: String,
    scheme: String,
    client: Option<SocketAddr>,
    server: Option<SocketAddr>,
    extensions: Vec<String>,
}

impl Default for HttpScopeBuilder {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_string(),
            query_string: Bytes::new(),
            headers: Vec::new(),
            http_version: "1.1".to_string(),
            scheme: "http".to_string(),
            client: None,
            server: None,
            extensions: Vec::new(),
        }
    }
}

impl HttpScopeBuilder {
    /// Sets the request method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the request path.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the raw query string.
    #[must_use]
    pub fn query_string(mut self, query_string: impl Into<Bytes>) -> Self {
        self.query_string = query_string.into();
        self
    }

    /// Appends a request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the HTTP protocol version.
    #[must_use]
    pub fn http_version(mut self, version: impl Into<String>) -> Self {
        self.http_version = version.into();
        self
    }

    /// Sets the URL scheme.
    #[must_use]
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Sets the client address.
    #[must_use]
    pub fn client(mut self, client: SocketAddr) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the server address.
    #[must_use]
    pub fn server(mut self, server: SocketAddr) -> Self {
        self.server = Some(server);
        self
    }

    /// Records a transport-advertised extension.
    #[must_use]
    pub fn extension(mut self, name: impl Into<String>) -> Self {
        self.extensions.push(name.into());
        self
    }

    /// Builds the scope.
    #[must_use]
    pub fn build(self) -> HttpScope {
        HttpScope {
            method: self.method,
            path: self.path,
            query_string: self.query_string,
            headers: self.headers,
            http_version: self.http_version,
            scheme: self.scheme,
            client: self.client,
            server: self.server,
            extensions: self.extensions,
        }
    }
}
