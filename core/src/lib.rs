//! Render HTTP requests as reproducible curl commands.
//!
//! # Overview
//! `CurlBuilder` collects a request's method, URL, body, headers and form
//! fields and renders them as a single shell command line. Nothing is sent:
//! the output is meant for logs and for replaying a request by hand.
//!
//! # Design
//! - Rendering is deterministic. Headers and form fields are sorted by name
//!   and structured bodies are encoded as JSON with sorted keys.
//! - Every user-controlled token is single-quoted (`'` becomes `'\''`).
//! - Values of fields marked with `set_secret` are masked with `*`, keeping
//!   their length.
//! - Rendering is best-effort: unreadable bodies degrade to no body. The
//!   only error is an odd-length key/value list handed to a setter.
//! - `LoggingTransport` decorates any `Transport` to print each outbound
//!   request before sending it.

pub mod body;
pub mod builder;
pub mod error;
pub mod escape;
pub mod form;
pub mod http;
pub mod request;
pub mod transport;

pub use body::Body;
pub use builder::CurlBuilder;
pub use error::CurlError;
pub use escape::escape;
pub use form::FormType;
pub use crate::http::{HttpRequest, HttpResponse};
pub use transport::{drain_body, LoggingTransport, Printer, TracingPrinter, Transport};
