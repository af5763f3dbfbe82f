//! # Talaria Core
//!
//! Core types for the Talaria gateway adapter: the transport message
//! protocol, the connection scope, the lazy request body, the handler
//! contract and the exchange error taxonomy.
//!
//! The surrounding server talks to this crate through the [`Receive`] /
//! [`Transmit`] trait pair; application code talks to it through
//! [`HttpHandler`] and [`HttpResponse`]. The exchange state machine that
//! binds the two lives in the `talaria` facade crate.

#![doc(html_root_url = "https://docs.rs/talaria-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod content;
mod error;
pub mod fixtures;
mod handler;
mod message;
mod scope;
mod transport;

pub use content::{bytes_writer, text_writer, Content};
pub use error::{HttpError, HttpResult, TransportError};
pub use handler::{
    ArcHttpHandler, BodyStream, HttpHandler, HttpRequest, HttpResponse, PushDirective,
};
pub use message::{ClientMessage, Header, ServerMessage};
pub use scope::{HttpScope, HttpScopeBuilder, Info};
pub use transport::{Receive, Transmit};
