//! Path-template routing for the Talaria gateway adapter.
//!
//! This crate compiles declarative route patterns into [`PathTemplate`]s and
//! resolves incoming `(method, path)` pairs against them. Templates are plain
//! strings with `{name}`, `{name:type}` or `{name:type:format}` parameter
//! segments:
//!
//! - `str` (the default) matches any single path component,
//! - `int` and `float` match components that convert to the numeric type,
//! - `datetime` matches components parsing under a caller-supplied format,
//! - `path` is a catch-all consuming the remainder of the path, slashes and
//!   all, and must be the final segment.
//!
//! Routes are kept per HTTP method in registration order, and the first
//! entry whose segments and conversions all succeed wins. Resolution never
//! fails: when nothing matches, the router hands back its configured
//! not-found target with empty matches.
//!
//! # Example
//!
//! ```rust
//! use http::Method;
//! use talaria_router::{ParamValue, PathRouter};
//!
//! let mut router = PathRouter::new("not-found");
//! router.add([Method::GET], "/users/{id:int}", "get-user").unwrap();
//! router.add([Method::GET], "/files/{rest:path}", "serve-file").unwrap();
//!
//! let resolution = router.resolve(&Method::GET, "/users/42");
//! assert_eq!(*resolution.target(), "get-user");
//! assert_eq!(resolution.matches().get("id"), Some(&ParamValue::Int(42)));
//!
//! let resolution = router.resolve(&Method::GET, "/files/css/site.css");
//! assert_eq!(
//!     resolution.matches().get("rest"),
//!     Some(&ParamValue::Str("css/site.css".to_string()))
//! );
//! ```
//!
//! The route table is built once during a registration phase and treated as
//! read-only afterwards, so concurrent resolution needs no locking.

mod converter;
mod params;
mod router;
mod template;

pub use converter::{Converter, ParamValue};
pub use params::RouteMatches;
pub use router::{PathRouter, RouteResolution};
pub use template::PathTemplate;

use thiserror::Error;

/// Errors raised while compiling a route template at registration time.
///
/// These are configuration failures: they propagate to the registering
/// caller and are never produced during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The template names a converter type that does not exist.
    #[error("unknown converter '{name}' in route template '{pattern}'")]
    UnknownConverter {
        /// The unrecognized converter name.
        name: String,
        /// The offending template.
        pattern: String,
    },

    /// A catch-all parameter appears before the final segment.
    #[error("catch-all parameter must be the final segment of '{pattern}'")]
    CatchAllNotFinal {
        /// The offending template.
        pattern: String,
    },

    /// A converter that needs a format string was given none.
    #[error("converter '{converter}' requires a format in route template '{pattern}'")]
    MissingFormat {
        /// The converter name.
        converter: String,
        /// The offending template.
        pattern: String,
    },

    /// A format string was supplied to a converter that takes none.
    #[error("converter '{converter}' does not take a format in route template '{pattern}'")]
    UnexpectedFormat {
        /// The converter name.
        converter: String,
        /// The offending template.
        pattern: String,
    },
}
